//! Server settings as key/value rows. `t` flips open registration.

use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Cell, Row};

use crate::core::action::Action;
use crate::core::state::App;
use crate::tui::Command;
use crate::tui::component::Component;
use crate::tui::components::table::{Columns, TableCursor, render_rows, section_block};
use crate::tui::event::TuiEvent;

pub const HELP: &str = "↑↓ select  t toggle registration  r refresh";

pub fn handle_event(cursor: &mut TableCursor, event: &TuiEvent, app: &App) -> Option<Command> {
    let len = app.settings.as_ref().map_or(0, |s| s.0.len());
    if cursor.navigate(event, len) {
        return None;
    }
    match event {
        TuiEvent::InputChar('t') => Some(Command::Core(Action::ToggleRegistration)),
        TuiEvent::InputChar('r') => Some(Command::Core(Action::Refresh)),
        _ => None,
    }
}

pub struct SettingsView<'a> {
    app: &'a App,
    cursor: &'a mut TableCursor,
}

impl<'a> SettingsView<'a> {
    pub fn new(app: &'a App, cursor: &'a mut TableCursor) -> Self {
        Self { app, cursor }
    }
}

impl Component for SettingsView<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let rows = self.app.settings.as_ref().map(|settings| {
            settings
                .entries()
                .into_iter()
                .map(|(key, value)| {
                    let style = match value.as_str() {
                        "true" => Style::default().fg(Color::Green),
                        "false" => Style::default().fg(Color::Red),
                        _ => Style::default(),
                    };
                    Row::new(vec![Cell::from(key), Cell::from(value).style(style)])
                })
                .collect()
        });
        render_rows(
            frame,
            area,
            section_block("Settings".to_string(), HELP),
            self.cursor,
            Columns {
                titles: &["Key", "Value"],
                widths: &[Constraint::Fill(1), Constraint::Fill(2)],
            },
            rows,
            "No settings",
        );
    }
}
