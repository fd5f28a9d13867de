//! New folder: a name plus a parent picked from the loaded folder list.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, BorderType, List, ListItem, ListState};

use super::{ModalOutput, cancelled, centered_fixed, confirmed, frame_modal};
use crate::core::action::Step;
use crate::remote::{Folder, NewFolder};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::table::highlight;
use crate::tui::components::text_input::{InputEvent, TextInput};
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Name,
    Parent,
}

pub struct CreateFolderState {
    name: TextInput,
    /// `(id, name)`; index 0 is the root.
    parents: Vec<(Option<String>, String)>,
    parent: ListState,
    focus: Focus,
}

impl CreateFolderState {
    pub fn new(folders: &[Folder]) -> Self {
        let mut parents = vec![(None, "(root)".to_string())];
        parents.extend(folders.iter().map(|f| (Some(f.id.clone()), f.name.clone())));
        Self {
            name: TextInput::new("Name"),
            parents,
            parent: ListState::default().with_selected(Some(0)),
            focus: Focus::Name,
        }
    }

    fn submit(&self) -> ModalOutput {
        let parent_id = self
            .parent
            .selected()
            .and_then(|i| self.parents.get(i))
            .and_then(|(id, _)| id.clone());
        confirmed(Step::CreateFolder(NewFolder {
            name: self.name.value().trim().to_string(),
            parent_id,
        }))
    }

    fn toggle(&mut self) {
        self.focus = match self.focus {
            Focus::Name => Focus::Parent,
            Focus::Parent => Focus::Name,
        };
    }

    pub fn handle_event(&mut self, event: &TuiEvent) -> ModalOutput {
        match event {
            TuiEvent::Escape => return cancelled(),
            TuiEvent::Save => return self.submit(),
            TuiEvent::Tab | TuiEvent::BackTab => {
                self.toggle();
                return ModalOutput::Stay;
            }
            _ => {}
        }
        match self.focus {
            Focus::Name => {
                if let Some(InputEvent::Submit) = self.name.handle_event(event) {
                    self.focus = Focus::Parent;
                }
            }
            Focus::Parent => match event {
                TuiEvent::Submit => return self.submit(),
                TuiEvent::CursorUp => {
                    let prev = self.parent.selected().map_or(0, |i| i.saturating_sub(1));
                    self.parent.select(Some(prev));
                }
                TuiEvent::CursorDown => {
                    let last = self.parents.len() - 1;
                    let next = self.parent.selected().map_or(0, |i| (i + 1).min(last));
                    self.parent.select(Some(next));
                }
                _ => {}
            },
        }
        ModalOutput::Stay
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let height = (self.parents.len() as u16).saturating_add(7).min(20);
        let area = centered_fixed(50, height, area);
        let inner = frame_modal(frame, area, "New folder", "Tab switch  Enter next/create  Esc cancel");
        let [name, list] =
            Layout::vertical([Constraint::Length(3), Constraint::Min(3)]).areas(inner);

        self.name.focused = self.focus == Focus::Name;
        self.name.render(frame, name);

        let border = if self.focus == Focus::Parent {
            Color::Cyan
        } else {
            Color::DarkGray
        };
        let items: Vec<ListItem> = self
            .parents
            .iter()
            .map(|(_, name)| ListItem::new(name.clone()))
            .collect();
        let widget = List::new(items)
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(border))
                    .title(" Parent "),
            )
            .highlight_style(highlight())
            .highlight_symbol("▶ ");
        frame.render_stateful_widget(widget, list, &mut self.parent);
    }
}
