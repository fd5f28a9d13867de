//! Yes/no gate in front of destructive steps.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};

use super::{ModalOutput, cancelled, centered_fixed, confirmed, frame_modal};
use crate::core::action::Step;
use crate::tui::event::TuiEvent;

pub struct ConfirmState {
    title: String,
    message: String,
    step: Step,
}

impl ConfirmState {
    pub fn new(title: impl Into<String>, message: impl Into<String>, step: Step) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            step,
        }
    }

    pub fn handle_event(&mut self, event: &TuiEvent) -> ModalOutput {
        match event {
            TuiEvent::InputChar('y' | 'Y') | TuiEvent::Submit => confirmed(self.step.clone()),
            TuiEvent::InputChar('n' | 'N') | TuiEvent::Escape => cancelled(),
            _ => ModalOutput::Stay,
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let area = centered_fixed(50, 7, area);
        let inner = frame_modal(frame, area, &self.title, "y/Enter confirm  n/Esc cancel");
        let text = vec![
            Line::from(Span::styled(
                self.message.clone(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            )),
            Line::default(),
            Line::from(Span::styled("[y] Yes   [n] No", Style::default().fg(Color::Yellow))),
        ];
        frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }), inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::modals::test_helpers::{confirmed_step, is_cancel};

    fn confirm() -> ConfirmState {
        ConfirmState::new("Delete", "Delete it?", Step::DeleteFolder("f1".into()))
    }

    #[test]
    fn yes_confirms_step() {
        let step = confirmed_step(confirm().handle_event(&TuiEvent::InputChar('y')));
        assert_eq!(step, Some(Step::DeleteFolder("f1".into())));
        assert!(confirmed_step(confirm().handle_event(&TuiEvent::Submit)).is_some());
    }

    #[test]
    fn no_and_escape_cancel() {
        assert!(is_cancel(&confirm().handle_event(&TuiEvent::InputChar('n'))));
        assert!(is_cancel(&confirm().handle_event(&TuiEvent::Escape)));
        assert!(matches!(
            confirm().handle_event(&TuiEvent::InputChar('q')),
            ModalOutput::Stay
        ));
    }
}
