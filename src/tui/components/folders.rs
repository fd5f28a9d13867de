//! Folder list with create, rename and delete.

use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::widgets::{Cell, Row};

use crate::core::action::{Action, Step};
use crate::core::state::App;
use crate::tui::Command;
use crate::tui::component::Component;
use crate::tui::components::table::{
    Columns, TableCursor, format_timestamp, prefix, render_rows, section_block,
};
use crate::tui::event::TuiEvent;
use crate::tui::modals::{ConfirmState, CreateFolderState, Modal, RenameFolderState};

pub const HELP: &str = "↑↓ select  n new  e rename  x delete  r refresh";

pub fn handle_event(cursor: &mut TableCursor, event: &TuiEvent, app: &App) -> Option<Command> {
    let folders = app.folders.items();
    if cursor.navigate(event, folders.len()) {
        return None;
    }
    let selected = folders.get(cursor.selected());
    match event {
        TuiEvent::InputChar('n') => Some(Command::Open(Modal::CreateFolder(
            CreateFolderState::new(folders),
        ))),
        TuiEvent::InputChar('e') => {
            let folder = selected?;
            Some(Command::Open(Modal::RenameFolder(RenameFolderState::new(
                folder,
            ))))
        }
        TuiEvent::InputChar('x') => {
            let folder = selected?;
            Some(Command::Open(Modal::Confirm(ConfirmState::new(
                "Delete folder",
                format!("Delete folder \"{}\"?", folder.name),
                Step::DeleteFolder(folder.id.clone()),
            ))))
        }
        TuiEvent::InputChar('r') => Some(Command::Core(Action::Refresh)),
        _ => None,
    }
}

pub struct FolderList<'a> {
    app: &'a App,
    cursor: &'a mut TableCursor,
}

impl<'a> FolderList<'a> {
    pub fn new(app: &'a App, cursor: &'a mut TableCursor) -> Self {
        Self { app, cursor }
    }
}

impl Component for FolderList<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let app = self.app;
        let rows = app.folders.is_loaded().then(|| {
            app.folders
                .items()
                .iter()
                .map(|f| {
                    Row::new(vec![
                        Cell::from(f.name.clone()),
                        Cell::from(app.folder_name(f.parent_id.as_deref())),
                        Cell::from(format_timestamp(&f.created_at)),
                        Cell::from(prefix(&f.id, 12)),
                    ])
                })
                .collect()
        });
        render_rows(
            frame,
            area,
            section_block("Folders".to_string(), HELP),
            self.cursor,
            Columns {
                titles: &["Name", "Parent", "Created", "Id"],
                widths: &[
                    Constraint::Fill(2),
                    Constraint::Fill(2),
                    Constraint::Length(16),
                    Constraint::Length(12),
                ],
            },
            rows,
            "No folders. Press n to create one.",
        );
    }
}
