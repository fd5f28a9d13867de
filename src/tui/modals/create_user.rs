//! New account: username, password and a role chosen with ←/→.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::{ModalOutput, cancelled, centered_fixed, confirmed, frame_modal};
use crate::core::action::Step;
use crate::remote::{NewUser, Role};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::text_input::{InputEvent, TextInput};
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Username,
    Password,
    Role,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Username => Focus::Password,
            Focus::Password => Focus::Role,
            Focus::Role => Focus::Username,
        }
    }

    fn prev(self) -> Self {
        match self {
            Focus::Username => Focus::Role,
            Focus::Password => Focus::Username,
            Focus::Role => Focus::Password,
        }
    }
}

pub struct CreateUserState {
    username: TextInput,
    password: TextInput,
    role: Role,
    focus: Focus,
}

impl Default for CreateUserState {
    fn default() -> Self {
        Self::new()
    }
}

impl CreateUserState {
    pub fn new() -> Self {
        Self {
            username: TextInput::new("Username"),
            password: TextInput::password("Password"),
            role: Role::default(),
            focus: Focus::Username,
        }
    }

    fn submit(&self) -> ModalOutput {
        confirmed(Step::CreateUser(NewUser {
            username: self.username.value().trim().to_string(),
            password: self.password.value().to_string(),
            role: self.role,
        }))
    }

    fn shift_role(&mut self, forward: bool) {
        let n = Role::ALL.len();
        let i = Role::ALL.iter().position(|r| *r == self.role).unwrap_or(0);
        let i = if forward { (i + 1) % n } else { (i + n - 1) % n };
        self.role = Role::ALL[i];
    }

    pub fn handle_event(&mut self, event: &TuiEvent) -> ModalOutput {
        match event {
            TuiEvent::Escape => return cancelled(),
            TuiEvent::Save => return self.submit(),
            TuiEvent::Tab | TuiEvent::CursorDown => {
                self.focus = self.focus.next();
                return ModalOutput::Stay;
            }
            TuiEvent::BackTab | TuiEvent::CursorUp => {
                self.focus = self.focus.prev();
                return ModalOutput::Stay;
            }
            _ => {}
        }
        let field = match self.focus {
            Focus::Username => &mut self.username,
            Focus::Password => &mut self.password,
            Focus::Role => {
                match event {
                    TuiEvent::Submit => return self.submit(),
                    TuiEvent::CursorLeft => self.shift_role(false),
                    TuiEvent::CursorRight | TuiEvent::InputChar(' ') => self.shift_role(true),
                    _ => {}
                }
                return ModalOutput::Stay;
            }
        };
        if let Some(InputEvent::Submit) = field.handle_event(event) {
            self.focus = self.focus.next();
        }
        ModalOutput::Stay
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let area = centered_fixed(50, 10, area);
        let inner = frame_modal(frame, area, "New user", "Tab next  ←→ role  Ctrl+S create  Esc cancel");
        let [username, password, role] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .areas(inner);

        self.username.focused = self.focus == Focus::Username;
        self.password.focused = self.focus == Focus::Password;
        self.username.render(frame, username);
        self.password.render(frame, password);

        let label = if self.focus == Focus::Role {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let mut spans = vec![Span::styled(" Role  ", label)];
        for r in Role::ALL {
            let style = if r == self.role {
                Style::default().fg(Color::Black).bg(Color::Cyan)
            } else {
                Style::default().fg(Color::Gray)
            };
            spans.push(Span::styled(format!(" {r} "), style));
            spans.push(Span::raw(" "));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), role);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::modals::Modal;
    use crate::tui::modals::test_helpers::{confirmed_step, draw, type_str};

    #[test]
    fn enter_walks_fields_then_creates() {
        let mut modal = Modal::CreateUser(CreateUserState::new());
        type_str(&mut modal, "grace");
        modal.handle_event(&TuiEvent::Submit);
        type_str(&mut modal, "s3cret");
        modal.handle_event(&TuiEvent::Submit);
        modal.handle_event(&TuiEvent::CursorLeft);
        let step = confirmed_step(modal.handle_event(&TuiEvent::Submit));
        assert_eq!(
            step,
            Some(Step::CreateUser(NewUser {
                username: "grace".into(),
                password: "s3cret".into(),
                role: Role::Editor,
            }))
        );
    }

    #[test]
    fn password_is_masked() {
        let mut modal = Modal::CreateUser(CreateUserState::new());
        modal.handle_event(&TuiEvent::Tab);
        type_str(&mut modal, "hunter2");
        let screen = draw(&mut modal);
        assert!(!screen.contains("hunter2"));
        assert!(screen.contains("viewer"));
    }
}
