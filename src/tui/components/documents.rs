//! # Documents
//!
//! One page of the document list in backend order. Enter opens the
//! selected document; `l` and `s` start an upload from disk or over SSH.

use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::widgets::{Cell, Row};

use crate::core::action::Action;
use crate::core::state::App;
use crate::tui::Command;
use crate::tui::component::Component;
use crate::tui::components::table::{
    Columns, TableCursor, format_timestamp, render_rows, section_block,
};
use crate::tui::event::TuiEvent;

pub const HELP: &str =
    "↑↓ select  Enter open  l upload  s upload via ssh  PgUp/PgDn page  r refresh";

pub fn handle_event(cursor: &mut TableCursor, event: &TuiEvent, app: &App) -> Option<Command> {
    let items = app.documents.items();
    if cursor.navigate(event, items.len()) {
        return None;
    }
    let action = match event {
        TuiEvent::Submit => {
            let doc = items.get(cursor.selected())?;
            Action::OpenDocument(doc.id.clone())
        }
        TuiEvent::PageDown => Action::NextPage,
        TuiEvent::PageUp => Action::PrevPage,
        TuiEvent::InputChar('r') => Action::Refresh,
        TuiEvent::InputChar('l') => return Some(Command::PickLocalFile),
        TuiEvent::InputChar('s') => return Some(Command::BrowseSsh),
        _ => return None,
    };
    Some(Command::Core(action))
}

fn title(app: &App) -> String {
    let page = app.documents_query.page;
    match app.documents_total {
        Some(total) => format!("Documents · page {page} · {total} total"),
        None => format!("Documents · page {page}"),
    }
}

pub struct DocumentList<'a> {
    app: &'a App,
    cursor: &'a mut TableCursor,
}

impl<'a> DocumentList<'a> {
    pub fn new(app: &'a App, cursor: &'a mut TableCursor) -> Self {
        Self { app, cursor }
    }
}

impl Component for DocumentList<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let app = self.app;
        let rows = app.documents.is_loaded().then(|| {
            app.documents
                .items()
                .iter()
                .map(|d| {
                    Row::new(vec![
                        Cell::from(d.title.clone()),
                        Cell::from(d.category.clone()),
                        Cell::from(d.tags.join(", ")),
                        Cell::from(app.folder_name(d.folder_id.as_deref())),
                        Cell::from(format_timestamp(&d.updated_at)),
                    ])
                })
                .collect()
        });
        render_rows(
            frame,
            area,
            section_block(title(app), HELP),
            self.cursor,
            Columns {
                titles: &["Title", "Category", "Tags", "Folder", "Updated"],
                widths: &[
                    Constraint::Fill(3),
                    Constraint::Fill(1),
                    Constraint::Fill(2),
                    Constraint::Fill(1),
                    Constraint::Length(16),
                ],
            },
            rows,
            "No documents yet. Press l to upload one.",
        );
    }
}
