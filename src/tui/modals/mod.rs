//! # Modals
//!
//! Every workflow that needs input from the user runs through one modal at a
//! time. A modal never talks to the backend; it answers with a
//! [`ModalOutput`] and the event loop turns that into core actions.
//!
//! ```text
//! key ─► Modal::handle_event ─► ModalOutput
//!                                 ├─ Stay
//!                                 ├─ Close(Some(Resolve(Cancelled | Confirmed(step))))
//!                                 ├─ Request(action)   modal stays open (ssh listing)
//!                                 ├─ Replace(modal)    chained step (confirm delete)
//!                                 └─ LaunchEditor      hand content to $EDITOR
//! ```
//!
//! Follows the persistent state pattern: each `*State` lives in
//! `TuiState::modal` and renders itself over the main layout.

mod confirm;
mod create_folder;
mod create_user;
mod edit_document;
mod local_picker;
mod rename_folder;
mod ssh_browser;
mod user_actions;
mod versions;

pub use confirm::ConfirmState;
pub use create_folder::CreateFolderState;
pub use create_user::CreateUserState;
pub use edit_document::EditDocumentState;
pub use local_picker::LocalPickerState;
pub use rename_folder::RenameFolderState;
pub use ssh_browser::SshBrowserState;
pub use user_actions::UserActionsState;
pub use versions::VersionsState;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Borders, Clear, Padding};

use crate::core::action::{Action, Step};
use crate::core::workflow::Decision;
use crate::tui::event::TuiEvent;

pub enum Modal {
    Confirm(ConfirmState),
    RenameFolder(RenameFolderState),
    EditDocument(EditDocumentState),
    CreateFolder(CreateFolderState),
    CreateUser(CreateUserState),
    UserActions(UserActionsState),
    Versions(VersionsState),
    LocalPicker(LocalPickerState),
    SshBrowser(SshBrowserState),
}

/// What the event loop should do after a modal handled a key.
pub enum ModalOutput {
    Stay,
    /// Tear the modal down, then apply the action if any.
    Close(Option<Action>),
    /// Apply the action and keep the modal open.
    Request(Action),
    /// Swap in a follow-up modal.
    Replace(Modal),
    /// Round-trip the focused text through the external editor.
    LaunchEditor,
}

impl Modal {
    pub fn handle_event(&mut self, event: &TuiEvent) -> ModalOutput {
        match self {
            Modal::Confirm(m) => m.handle_event(event),
            Modal::RenameFolder(m) => m.handle_event(event),
            Modal::EditDocument(m) => m.handle_event(event),
            Modal::CreateFolder(m) => m.handle_event(event),
            Modal::CreateUser(m) => m.handle_event(event),
            Modal::UserActions(m) => m.handle_event(event),
            Modal::Versions(m) => m.handle_event(event),
            Modal::LocalPicker(m) => m.handle_event(event),
            Modal::SshBrowser(m) => m.handle_event(event),
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        match self {
            Modal::Confirm(m) => m.render(frame, area),
            Modal::RenameFolder(m) => m.render(frame, area),
            Modal::EditDocument(m) => m.render(frame, area),
            Modal::CreateFolder(m) => m.render(frame, area),
            Modal::CreateUser(m) => m.render(frame, area),
            Modal::UserActions(m) => m.render(frame, area),
            Modal::Versions(m) => m.render(frame, area),
            Modal::LocalPicker(m) => m.render(frame, area),
            Modal::SshBrowser(m) => m.render(frame, area),
        }
    }
}

pub(crate) fn cancelled() -> ModalOutput {
    ModalOutput::Close(Some(Action::Resolve(Decision::Cancelled)))
}

pub(crate) fn confirmed(step: Step) -> ModalOutput {
    ModalOutput::Close(Some(Action::Resolve(Decision::Confirmed(step))))
}

/// Compute a centered rect using percentage of the outer rect.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, outer: Rect) -> Rect {
    let [_, middle, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(outer);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(middle);
    center
}

/// Centered rect of a fixed height, for short forms.
pub(crate) fn centered_fixed(percent_x: u16, height: u16, outer: Rect) -> Rect {
    let [_, middle, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(height.min(outer.height)),
        Constraint::Fill(1),
    ])
    .areas(outer);
    centered_rect(percent_x, 100, middle)
}

/// Clears `area` and draws the modal frame; returns the inner area.
pub(crate) fn frame_modal(frame: &mut Frame, area: Rect, title: &str, help: &str) -> Rect {
    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" {title} "))
        .title_bottom(Line::from(format!(" {help} ")).centered())
        .padding(Padding::horizontal(1));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    inner
}
