//! User accounts. Enter opens the per-user actions; `n` creates one.

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
use crate::tui::modals::{CreateUserState, Modal, UserActionsState};

pub const HELP: &str = "↑↓ select  Enter manage  n new  r refresh";

pub fn handle_event(cursor: &mut TableCursor, event: &TuiEvent, app: &App) -> Option<Command> {
    let users = app.users.items();
    if cursor.navigate(event, users.len()) {
        return None;
    }
    match event {
        TuiEvent::Submit => {
            let user = users.get(cursor.selected())?;
            Some(Command::Open(Modal::UserActions(UserActionsState::new(user))))
        }
        TuiEvent::InputChar('n') => Some(Command::Open(Modal::CreateUser(CreateUserState::new()))),
        TuiEvent::InputChar('r') => Some(Command::Core(Action::Refresh)),
        _ => None,
    }
}

pub struct UserList<'a> {
    app: &'a App,
    cursor: &'a mut TableCursor,
}

impl<'a> UserList<'a> {
    pub fn new(app: &'a App, cursor: &'a mut TableCursor) -> Self {
        Self { app, cursor }
    }
}

impl Component for UserList<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let app = self.app;
        let me = app.user.as_ref().map(|u| u.username.as_str());
        let rows = app.users.is_loaded().then(|| {
            app.users
                .items()
                .iter()
                .map(|u| {
                    let name = if Some(u.username.as_str()) == me {
                        format!("{} (you)", u.username)
                    } else {
                        u.username.clone()
                    };
                    Row::new(vec![
                        Cell::from(name),
                        Cell::from(u.role.clone()),
                        Cell::from(format_timestamp(&u.created_at)),
                    ])
                })
                .collect()
        });
        render_rows(
            frame,
            area,
            section_block("Users".to_string(), HELP),
            self.cursor,
            Columns {
                titles: &["Username", "Role", "Created"],
                widths: &[Constraint::Fill(2), Constraint::Length(8), Constraint::Length(16)],
            },
            rows,
            "No users",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::User;
    use crate::test_support::{logged_in_app, render_to_string};

    fn app() -> App {
        let mut app = logged_in_app();
        app.users.replace(
            vec![
                User {
                    username: "ada".into(),
                    role: "admin".into(),
                    created_at: String::new(),
                },
                User {
                    username: "grace".into(),
                    role: "editor".into(),
                    created_at: String::new(),
                },
            ],
            1,
        );
        app
    }

    #[test]
    fn enter_opens_actions_for_selected_user() {
        let app = app();
        let mut cursor = TableCursor::default();
        handle_event(&mut cursor, &TuiEvent::CursorEnd, &app);
        assert!(matches!(
            handle_event(&mut cursor, &TuiEvent::Submit, &app),
            Some(Command::Open(Modal::UserActions(_)))
        ));
    }

    #[test]
    fn marks_the_signed_in_user() {
        let app = app();
        let mut cursor = TableCursor::default();
        let screen = render_to_string(80, 8, |f| {
            UserList::new(&app, &mut cursor).render(f, f.area())
        });
        assert!(screen.contains("ada (you)"));
        assert!(screen.contains("editor"));
    }
}
