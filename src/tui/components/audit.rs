//! Audit log, newest first as the backend returns it, one page at a time.

use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::widgets::{Cell, Row};

use crate::core::action::Action;
use crate::core::state::App;
use crate::tui::Command;
use crate::tui::component::Component;
use crate::tui::components::table::{
    Columns, TableCursor, format_timestamp, prefix, render_rows, section_block,
};
use crate::tui::event::TuiEvent;

pub const HELP: &str = "↑↓ select  PgUp/PgDn page  r refresh";

pub fn handle_event(cursor: &mut TableCursor, event: &TuiEvent, app: &App) -> Option<Command> {
    if cursor.navigate(event, app.audit.len()) {
        return None;
    }
    let action = match event {
        TuiEvent::PageDown => Action::NextPage,
        TuiEvent::PageUp => Action::PrevPage,
        TuiEvent::InputChar('r') => Action::Refresh,
        _ => return None,
    };
    Some(Command::Core(action))
}

pub struct AuditLog<'a> {
    app: &'a App,
    cursor: &'a mut TableCursor,
}

impl<'a> AuditLog<'a> {
    pub fn new(app: &'a App, cursor: &'a mut TableCursor) -> Self {
        Self { app, cursor }
    }
}

impl Component for AuditLog<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let app = self.app;
        let page = app.audit_query.page;
        let title = match app.audit_total {
            Some(total) => format!("Audit Log · page {page} · {total} total"),
            None => format!("Audit Log · page {page}"),
        };
        let rows = app.audit.is_loaded().then(|| {
            app.audit
                .items()
                .iter()
                .map(|e| {
                    Row::new(vec![
                        Cell::from(format_timestamp(&e.created_at)),
                        Cell::from(format!("{}:{}", e.actor_type, e.actor_id)),
                        Cell::from(e.action.clone()),
                        Cell::from(e.resource_type.clone()),
                        Cell::from(prefix(&e.resource_id, 20)),
                    ])
                })
                .collect()
        });
        render_rows(
            frame,
            area,
            section_block(title, HELP),
            self.cursor,
            Columns {
                titles: &["Time", "Actor", "Action", "Resource", "Id"],
                widths: &[
                    Constraint::Length(16),
                    Constraint::Fill(2),
                    Constraint::Fill(2),
                    Constraint::Fill(1),
                    Constraint::Length(20),
                ],
            },
            rows,
            "No audit entries",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::AuditEntry;
    use crate::test_support::{logged_in_app, render_to_string};

    #[test]
    fn renders_entries_and_pages() {
        let mut app = logged_in_app();
        app.audit.replace(
            vec![AuditEntry {
                id: "a1".into(),
                created_at: "2024-05-01 10:00:00".into(),
                actor_type: "user".into(),
                actor_id: "ada".into(),
                action: "document.delete".into(),
                resource_type: "document".into(),
                resource_id: "d1".into(),
            }],
            1,
        );
        let mut cursor = TableCursor::default();
        let screen = render_to_string(100, 8, |f| {
            AuditLog::new(&app, &mut cursor).render(f, f.area())
        });
        assert!(screen.contains("user:ada"));
        assert!(screen.contains("document.delete"));
        assert!(matches!(
            handle_event(&mut cursor, &TuiEvent::PageDown, &app),
            Some(Command::Core(Action::NextPage))
        ));
    }
}
