//! # Login Screen
//!
//! Server URL (prefilled), username and password. Enter moves to the next
//! field and submits from the password field; Tab cycles focus. Errors from
//! the last attempt render inline below the form.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Clear, Paragraph, Wrap};

use crate::core::action::LoginForm;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::text_input::{InputEvent, TextInput};
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Server,
    Username,
    Password,
}

impl Field {
    fn next(self) -> Self {
        match self {
            Field::Server => Field::Username,
            Field::Username => Field::Password,
            Field::Password => Field::Server,
        }
    }

    fn prev(self) -> Self {
        self.next().next()
    }
}

/// Persistent login form state, lives in `TuiState`.
pub struct LoginState {
    server: TextInput,
    username: TextInput,
    password: TextInput,
    focus: Field,
}

impl LoginState {
    pub fn new(server_url: &str) -> Self {
        Self {
            server: TextInput::new("Server").with_value(server_url),
            username: TextInput::new("Username"),
            password: TextInput::password("Password"),
            focus: Field::Username,
        }
    }

    /// Clears the password after a session ends.
    pub fn reset_password(&mut self) {
        self.password.clear();
        self.focus = Field::Password;
    }

    fn field_mut(&mut self, field: Field) -> &mut TextInput {
        match field {
            Field::Server => &mut self.server,
            Field::Username => &mut self.username,
            Field::Password => &mut self.password,
        }
    }

    fn form(&self) -> LoginForm {
        LoginForm {
            server_url: self.server.value().to_string(),
            username: self.username.value().to_string(),
            password: self.password.value().to_string(),
        }
    }
}

impl EventHandler for LoginState {
    type Event = LoginForm;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<LoginForm> {
        match event {
            TuiEvent::Tab | TuiEvent::CursorDown => {
                self.focus = self.focus.next();
                None
            }
            TuiEvent::BackTab | TuiEvent::CursorUp => {
                self.focus = self.focus.prev();
                None
            }
            _ => {
                let focus = self.focus;
                match self.field_mut(focus).handle_event(event) {
                    Some(InputEvent::Submit) if focus == Field::Password => Some(self.form()),
                    Some(InputEvent::Submit) => {
                        self.focus = focus.next();
                        None
                    }
                    _ => None,
                }
            }
        }
    }
}

/// Transient render wrapper for the login screen.
pub struct LoginScreen<'a> {
    state: &'a mut LoginState,
    error: Option<&'a str>,
    pending: bool,
}

impl<'a> LoginScreen<'a> {
    pub fn new(state: &'a mut LoginState, error: Option<&'a str>, pending: bool) -> Self {
        Self {
            state,
            error,
            pending,
        }
    }
}

impl Component for LoginScreen<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let width = area.width.clamp(20, 60);
        let height = 17.min(area.height);
        let [_, column, _] = Layout::horizontal([
            Constraint::Fill(1),
            Constraint::Length(width),
            Constraint::Fill(1),
        ])
        .areas(area);
        let [_, panel, _] = Layout::vertical([
            Constraint::Fill(1),
            Constraint::Length(height),
            Constraint::Fill(1),
        ])
        .areas(column);

        frame.render_widget(Clear, panel);
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" mdbrowse · sign in ")
            .title_bottom(Line::from(" Tab next field  Enter sign in  Ctrl+C quit ").centered());
        let inner = block.inner(panel);
        frame.render_widget(block, panel);

        let [server, username, password, status] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .areas(inner);

        let focus = self.state.focus;
        for (field, area) in [
            (Field::Server, server),
            (Field::Username, username),
            (Field::Password, password),
        ] {
            let input = self.state.field_mut(field);
            input.focused = field == focus && !self.pending;
            input.render(frame, area);
        }

        let line = if self.pending {
            Line::from(Span::styled(
                "Signing in…",
                Style::default().fg(Color::Yellow),
            ))
        } else if let Some(error) = self.error {
            Line::from(Span::styled(
                error.to_string(),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ))
        } else {
            Line::default()
        };
        frame.render_widget(Paragraph::new(line).wrap(Wrap { trim: true }), status);
    }
}
