//! Version history of one document. Enter asks to roll back to the
//! selected version.

use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::widgets::{Cell, Row, Table};

use super::{ConfirmState, Modal, ModalOutput, cancelled, centered_rect, frame_modal};
use crate::core::action::Step;
use crate::remote::Version;
use crate::tui::components::table::{
    TableCursor, format_timestamp, header, highlight, prefix,
};
use crate::tui::event::TuiEvent;

pub struct VersionsState {
    document_id: String,
    versions: Vec<Version>,
    cursor: TableCursor,
}

impl VersionsState {
    pub fn new(document_id: String, versions: Vec<Version>) -> Self {
        Self {
            document_id,
            versions,
            cursor: TableCursor::default(),
        }
    }

    pub fn handle_event(&mut self, event: &TuiEvent) -> ModalOutput {
        if self.cursor.navigate(event, self.versions.len()) {
            return ModalOutput::Stay;
        }
        match event {
            TuiEvent::Escape => cancelled(),
            TuiEvent::Submit => match self.versions.get(self.cursor.selected()) {
                Some(v) => ModalOutput::Replace(Modal::Confirm(ConfirmState::new(
                    "Roll back",
                    format!("Roll back to version {}?", v.version_number),
                    Step::Rollback {
                        id: self.document_id.clone(),
                        version: v.version_number,
                    },
                ))),
                None => ModalOutput::Stay,
            },
            _ => ModalOutput::Stay,
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let area = centered_rect(80, 70, area);
        let inner = frame_modal(frame, area, "Versions", "↑↓ select  Enter roll back  Esc close");
        self.cursor.clamp(self.versions.len());

        let rows = self.versions.iter().map(|v| {
            Row::new(vec![
                Cell::from(format!("v{}", v.version_number)),
                Cell::from(v.created_by.clone()),
                Cell::from(format_timestamp(&v.created_at)),
                Cell::from(v.change_note.clone()),
                Cell::from(prefix(&v.checksum, 12)),
            ])
        });
        let table = Table::new(
            rows,
            [
                Constraint::Length(6),
                Constraint::Length(12),
                Constraint::Length(17),
                Constraint::Fill(1),
                Constraint::Length(12),
            ],
        )
        .header(header(&["Ver", "By", "Date", "Note", "Checksum"]))
        .row_highlight_style(highlight());
        frame.render_stateful_widget(table, inner, self.cursor.state_mut());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::modals::test_helpers::{confirmed_step, draw, is_cancel};

    fn version(n: i64, note: &str) -> Version {
        Version {
            version_number: n,
            created_by: "ada".into(),
            created_at: "2024-05-01 10:00:00".into(),
            change_note: note.into(),
            checksum: "0123456789abcdef0123".into(),
        }
    }

    fn state() -> VersionsState {
        VersionsState::new("d1".into(), vec![version(3, "typo"), version(2, "draft")])
    }

    #[test]
    fn enter_chains_into_rollback_confirm() {
        let mut modal = state();
        modal.handle_event(&TuiEvent::CursorDown);
        let ModalOutput::Replace(mut next) = modal.handle_event(&TuiEvent::Submit) else {
            panic!("expected a confirm modal");
        };
        let step = confirmed_step(next.handle_event(&TuiEvent::InputChar('y')));
        assert_eq!(
            step,
            Some(Step::Rollback {
                id: "d1".into(),
                version: 2
            })
        );
    }

    #[test]
    fn renders_rows_with_short_checksum() {
        let mut modal = Modal::Versions(state());
        let screen = draw(&mut modal);
        assert!(screen.contains("v3"));
        assert!(screen.contains("draft"));
        assert!(screen.contains("0123456789ab"));
        assert!(!screen.contains("0123456789abc"));
    }

    #[test]
    fn escape_closes() {
        assert!(is_cancel(&state().handle_event(&TuiEvent::Escape)));
    }
}
