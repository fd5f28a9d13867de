//! # Search
//!
//! Query box above a result table. Enter in the box runs the search and
//! moves focus to the results; Enter on a result opens it in Documents.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::widgets::{Cell, Row};

use crate::core::action::Action;
use crate::core::state::App;
use crate::tui::Command;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::table::{
    Columns, TableCursor, placeholder, render_rows, section_block,
};
use crate::tui::components::text_input::{InputEvent, TextInput};
use crate::tui::event::TuiEvent;

pub const HELP: &str = "Enter search/open  Tab switch focus  ↑↓ select  Esc back";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Query,
    Results,
}

/// Persistent search state, lives in `TuiState`.
pub struct SearchState {
    query: TextInput,
    focus: Focus,
    cursor: TableCursor,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            query: TextInput::new("Query"),
            focus: Focus::Query,
            cursor: TableCursor::default(),
        }
    }
}

impl SearchState {
    /// Whether keystrokes go to the query box rather than global shortcuts.
    pub fn is_typing(&self) -> bool {
        self.focus == Focus::Query
    }

    /// Back to an empty query, e.g. when the section is re-entered.
    pub fn reset(&mut self) {
        self.query.clear();
        self.focus = Focus::Query;
        self.cursor.reset();
    }

    pub fn handle_event(&mut self, event: &TuiEvent, app: &App) -> Option<Command> {
        if matches!(event, TuiEvent::Tab | TuiEvent::BackTab) {
            self.focus = match self.focus {
                Focus::Query => Focus::Results,
                Focus::Results => Focus::Query,
            };
            return None;
        }
        match self.focus {
            Focus::Query => match self.query.handle_event(event)? {
                InputEvent::Submit => {
                    let text = self.query.value().trim().to_string();
                    if text.is_empty() {
                        return None;
                    }
                    self.focus = Focus::Results;
                    self.cursor.reset();
                    Some(Command::Core(Action::Search(text)))
                }
                InputEvent::Changed => None,
            },
            Focus::Results => {
                let hits = app.search.items();
                if self.cursor.navigate(event, hits.len()) {
                    return None;
                }
                match event {
                    TuiEvent::Submit => {
                        let hit = hits.get(self.cursor.selected())?;
                        Some(Command::Core(Action::OpenSearchHit(hit.id.clone())))
                    }
                    TuiEvent::InputChar('/') => {
                        self.focus = Focus::Query;
                        None
                    }
                    TuiEvent::InputChar('r') => Some(Command::Core(Action::Refresh)),
                    _ => None,
                }
            }
        }
    }
}

pub struct SearchView<'a> {
    state: &'a mut SearchState,
    app: &'a App,
}

impl<'a> SearchView<'a> {
    pub fn new(state: &'a mut SearchState, app: &'a App) -> Self {
        Self { state, app }
    }
}

impl Component for SearchView<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [query, results] =
            Layout::vertical([Constraint::Length(3), Constraint::Min(3)]).areas(area);
        self.state.query.focused = self.state.focus == Focus::Query;
        self.state.query.render(frame, query);

        let app = self.app;
        let title = if app.search_query.is_empty() {
            "Results".to_string()
        } else {
            format!("Results for \"{}\"", app.search_query)
        };
        let block = section_block(title, HELP);
        if app.search_query.is_empty() && !app.search.is_loaded() {
            placeholder(frame, results, block, "Type a query and press Enter");
            return;
        }
        let rows = app.search.is_loaded().then(|| {
            app.search
                .items()
                .iter()
                .map(|hit| {
                    Row::new(vec![
                        Cell::from(hit.title.clone()),
                        Cell::from(hit.category.clone()),
                        Cell::from(hit.snippet.replace('\n', " ")),
                    ])
                })
                .collect()
        });
        render_rows(
            frame,
            results,
            block,
            &mut self.state.cursor,
            Columns {
                titles: &["Title", "Category", "Snippet"],
                widths: &[Constraint::Fill(2), Constraint::Fill(1), Constraint::Fill(4)],
            },
            rows,
            "No matches",
        );
    }
}
