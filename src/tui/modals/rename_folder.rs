//! Single-field prompt for a folder's new name.

use ratatui::Frame;
use ratatui::layout::Rect;

use super::{ModalOutput, cancelled, centered_fixed, confirmed, frame_modal};
use crate::core::action::Step;
use crate::remote::Folder;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::text_input::{InputEvent, TextInput};
use crate::tui::event::TuiEvent;

pub struct RenameFolderState {
    id: String,
    name: TextInput,
}

impl RenameFolderState {
    pub fn new(folder: &Folder) -> Self {
        let mut name = TextInput::new("New name").with_value(folder.name.clone());
        name.focused = true;
        Self {
            id: folder.id.clone(),
            name,
        }
    }

    pub fn handle_event(&mut self, event: &TuiEvent) -> ModalOutput {
        match event {
            TuiEvent::Escape => cancelled(),
            TuiEvent::Save => self.submit(),
            _ => match self.name.handle_event(event) {
                Some(InputEvent::Submit) => self.submit(),
                _ => ModalOutput::Stay,
            },
        }
    }

    fn submit(&self) -> ModalOutput {
        confirmed(Step::RenameFolder {
            id: self.id.clone(),
            name: self.name.value().to_string(),
        })
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let area = centered_fixed(50, 5, area);
        let inner = frame_modal(frame, area, "Rename folder", "Enter save  Esc cancel");
        self.name.render(frame, inner);
    }
}
