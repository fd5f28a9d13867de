//! Per-account actions: change role, reset password, delete.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::{ConfirmState, Modal, ModalOutput, cancelled, centered_fixed, confirmed, frame_modal};
use crate::core::action::Step;
use crate::remote::{Role, User, UserChange};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::text_input::{InputEvent, TextInput};
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Role,
    Password,
    Delete,
}

const ORDER: [Focus; 3] = [Focus::Role, Focus::Password, Focus::Delete];

pub struct UserActionsState {
    username: String,
    role: Role,
    password: TextInput,
    focus: Focus,
}

impl UserActionsState {
    pub fn new(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            role: Role::parse(&user.role).unwrap_or_default(),
            password: TextInput::password("New password"),
            focus: Focus::Role,
        }
    }

    fn step_focus(&mut self, forward: bool) {
        let i = ORDER.iter().position(|f| *f == self.focus).unwrap_or(0);
        let n = ORDER.len();
        self.focus = ORDER[if forward { (i + 1) % n } else { (i + n - 1) % n }];
    }

    fn shift_role(&mut self, forward: bool) {
        let n = Role::ALL.len();
        let i = Role::ALL.iter().position(|r| *r == self.role).unwrap_or(0);
        self.role = Role::ALL[if forward { (i + 1) % n } else { (i + n - 1) % n }];
    }

    fn update(&self, change: UserChange) -> ModalOutput {
        confirmed(Step::UpdateUser {
            username: self.username.clone(),
            change,
        })
    }

    pub fn handle_event(&mut self, event: &TuiEvent) -> ModalOutput {
        match event {
            TuiEvent::Escape => return cancelled(),
            TuiEvent::Tab | TuiEvent::CursorDown => {
                self.step_focus(true);
                return ModalOutput::Stay;
            }
            TuiEvent::BackTab | TuiEvent::CursorUp => {
                self.step_focus(false);
                return ModalOutput::Stay;
            }
            _ => {}
        }
        match self.focus {
            Focus::Role => match event {
                TuiEvent::Submit => return self.update(UserChange::Role(self.role)),
                TuiEvent::CursorLeft => self.shift_role(false),
                TuiEvent::CursorRight | TuiEvent::InputChar(' ') => self.shift_role(true),
                _ => {}
            },
            Focus::Password => {
                if let Some(InputEvent::Submit) = self.password.handle_event(event) {
                    let password = self.password.value().to_string();
                    return self.update(UserChange::Password(password));
                }
            }
            Focus::Delete => {
                if *event == TuiEvent::Submit {
                    return ModalOutput::Replace(Modal::Confirm(ConfirmState::new(
                        "Delete user",
                        format!("Delete user \"{}\"?", self.username),
                        Step::DeleteUser(self.username.clone()),
                    )));
                }
            }
        }
        ModalOutput::Stay
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let area = centered_fixed(50, 9, area);
        let title = format!("User {}", self.username);
        let inner = frame_modal(frame, area, &title, "↑↓ select  ←→ role  Enter apply  Esc close");
        let [role, password, delete] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .areas(inner);

        let focused = |f: Focus| {
            if self.focus == f {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            }
        };

        let mut spans = vec![Span::styled(" Role  ", focused(Focus::Role))];
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

        self.password.focused = self.focus == Focus::Password;
        self.password.render(frame, password);

        let delete_style = if self.focus == Focus::Delete {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        frame.render_widget(
            Paragraph::new(Span::styled(" [ Delete user ]", delete_style)),
            delete,
        );
    }
}
