//! Frame layout: title bar, sidebar beside the active section, status bar,
//! and the open modal on top. Logged out, the whole frame is the login
//! screen.

use std::time::Instant;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout};

use crate::core::state::{App, Screen, Section};
use crate::tui::TuiState;
use crate::tui::component::Component;
use crate::tui::components::{
    AuditLog, DocumentList, DocumentView, FolderList, LoginScreen, SIDEBAR_WIDTH, SearchView,
    SettingsView, Sidebar, StatusBar, TitleBar, UserList, audit, document_view, documents,
    folders, search, settings, users,
};

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, spinner_frame: usize) {
    if app.screen == Screen::LoggedOut {
        let pending = app.pending_login.is_some();
        LoginScreen::new(&mut tui.login, app.login_error.as_deref(), pending)
            .render(frame, frame.area());
        return;
    }

    use Constraint::{Length, Min};
    let [title_area, body_area, status_area] =
        Layout::vertical([Length(1), Min(0), Length(1)]).areas(frame.area());
    let [sidebar_area, content_area] =
        Layout::horizontal([Length(SIDEBAR_WIDTH), Min(0)]).areas(body_area);

    TitleBar::new(&app.server_url, app.user.as_ref(), app.in_flight, spinner_frame)
        .render(frame, title_area);
    Sidebar {
        active: app.section,
    }
    .render(frame, sidebar_area);

    let help = if let Some(doc) = app.shown_document() {
        DocumentView::new(&mut tui.document_view, doc, app.detail_seq).render(frame, content_area);
        document_view::HELP
    } else {
        match app.section {
            Section::Documents => {
                DocumentList::new(app, &mut tui.documents).render(frame, content_area);
                documents::HELP
            }
            Section::Search => {
                SearchView::new(&mut tui.search, app).render(frame, content_area);
                search::HELP
            }
            Section::Folders => {
                FolderList::new(app, &mut tui.folders).render(frame, content_area);
                folders::HELP
            }
            Section::Users => {
                UserList::new(app, &mut tui.users).render(frame, content_area);
                users::HELP
            }
            Section::Settings => {
                SettingsView::new(app, &mut tui.settings).render(frame, content_area);
                settings::HELP
            }
            Section::Audit => {
                AuditLog::new(app, &mut tui.audit).render(frame, content_area);
                audit::HELP
            }
        }
    };
    let help = format!("{help}  ·  1-6 sections  q quit");
    StatusBar::new(app.visible_notice(Instant::now()), &help).render(frame, status_area);

    if let Some(modal) = tui.modal.as_mut() {
        modal.render(frame, frame.area());
    }
}
