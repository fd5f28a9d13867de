//! # Edit Document
//!
//! Title, tags, category, the markdown body and a change note. Tab cycles
//! fields, `Ctrl+S` saves, `Ctrl+E` sends the body through `$EDITOR`.
//! Known categories and tags from the backend are shown as hints.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use super::{ModalOutput, cancelled, centered_rect, confirmed, frame_modal};
use crate::core::action::Step;
use crate::core::workflow::Vocabulary;
use crate::remote::{Document, DocumentUpdate, parse_tags};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::table::truncate;
use crate::tui::components::text_input::TextInput;
use crate::tui::event::TuiEvent;

const TITLE: usize = 0;
const TAGS: usize = 1;
const CATEGORY: usize = 2;
const CONTENT: usize = 3;
const NOTE: usize = 4;

pub struct EditDocumentState {
    id: String,
    fields: [TextInput; 5],
    focus: usize,
    hints: String,
}

impl EditDocumentState {
    pub fn new(doc: &Document, vocabulary: &Vocabulary) -> Self {
        let mut hints = Vec::new();
        if !vocabulary.categories.is_empty() {
            hints.push(format!("categories: {}", vocabulary.categories.join(", ")));
        }
        if !vocabulary.tags.is_empty() {
            hints.push(format!("tags: {}", vocabulary.tags.join(", ")));
        }
        Self {
            id: doc.id.clone(),
            fields: [
                TextInput::new("Title").with_value(doc.title.clone()),
                TextInput::new("Tags (comma separated)").with_value(doc.tags.join(", ")),
                TextInput::new("Category").with_value(doc.category.clone()),
                TextInput::multi_line("Content").with_value(doc.content_md.clone()),
                TextInput::new("Change note"),
            ],
            focus: TITLE,
            hints: hints.join("   "),
        }
    }

    pub fn content(&self) -> &str {
        self.fields[CONTENT].value()
    }

    /// Puts text back from the external editor.
    pub fn set_content(&mut self, text: String) {
        self.fields[CONTENT].set_value(text);
        self.focus = CONTENT;
    }

    fn update(&self) -> DocumentUpdate {
        let note = self.fields[NOTE].value().trim();
        DocumentUpdate {
            title: Some(self.fields[TITLE].value().trim().to_string()),
            tags: Some(parse_tags(self.fields[TAGS].value())),
            category: Some(self.fields[CATEGORY].value().trim().to_string()),
            content_md: Some(self.content().to_string()),
            change_note: (!note.is_empty()).then(|| note.to_string()),
        }
    }

    fn cycle(&mut self, forward: bool) {
        let n = self.fields.len();
        self.focus = if forward {
            (self.focus + 1) % n
        } else {
            (self.focus + n - 1) % n
        };
    }

    pub fn handle_event(&mut self, event: &TuiEvent) -> ModalOutput {
        let in_content = self.focus == CONTENT;
        match event {
            TuiEvent::Escape => cancelled(),
            TuiEvent::Save => confirmed(Step::EditDocument {
                id: self.id.clone(),
                update: self.update(),
            }),
            TuiEvent::OpenEditor => ModalOutput::LaunchEditor,
            TuiEvent::Tab => {
                self.cycle(true);
                ModalOutput::Stay
            }
            TuiEvent::BackTab => {
                self.cycle(false);
                ModalOutput::Stay
            }
            TuiEvent::CursorDown | TuiEvent::Submit if !in_content => {
                self.cycle(true);
                ModalOutput::Stay
            }
            TuiEvent::CursorUp if !in_content => {
                self.cycle(false);
                ModalOutput::Stay
            }
            _ => {
                self.fields[self.focus].handle_event(event);
                ModalOutput::Stay
            }
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let area = centered_rect(90, 90, area);
        let inner = frame_modal(
            frame,
            area,
            "Edit document",
            "Tab next  Ctrl+S save  Ctrl+E $EDITOR  Esc cancel",
        );
        let [title, meta, content, note, hints] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .areas(inner);
        let [tags, category] =
            Layout::horizontal([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(meta);

        for (i, field) in self.fields.iter_mut().enumerate() {
            field.focused = i == self.focus;
        }
        let [f_title, f_tags, f_category, f_content, f_note] = &mut self.fields;
        f_title.render(frame, title);
        f_tags.render(frame, tags);
        f_category.render(frame, category);
        f_content.render(frame, content);
        f_note.render(frame, note);

        let hint = truncate(&self.hints, usize::from(hints.width));
        frame.render_widget(
            Paragraph::new(Line::from(Span::styled(
                hint,
                Style::default().fg(Color::DarkGray),
            ))),
            hints,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::modals::Modal;
    use crate::tui::modals::test_helpers::{confirmed_step, draw, is_cancel};

    fn doc() -> Document {
        Document {
            id: "d1".into(),
            title: "Runbook".into(),
            category: "guides".into(),
            tags: vec!["ops".into()],
            content_md: "# Runbook".into(),
            ..Default::default()
        }
    }

    fn vocabulary() -> Vocabulary {
        Vocabulary {
            categories: vec!["guides".into(), "policies".into()],
            tags: vec!["ops".into()],
        }
    }

    #[test]
    fn save_sends_all_fields() {
        let mut modal = EditDocumentState::new(&doc(), &Vocabulary::default());
        modal.handle_event(&TuiEvent::Tab);
        for c in ", rust".chars() {
            modal.handle_event(&TuiEvent::InputChar(c));
        }
        let step = confirmed_step(modal.handle_event(&TuiEvent::Save)).unwrap();
        match step {
            Step::EditDocument { id, update } => {
                assert_eq!(id, "d1");
                assert_eq!(update.title.as_deref(), Some("Runbook"));
                assert_eq!(update.tags, Some(vec!["ops".to_string(), "rust".to_string()]));
                assert_eq!(update.content_md.as_deref(), Some("# Runbook"));
                assert_eq!(update.change_note, None);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn enter_in_content_is_a_newline() {
        let mut modal = EditDocumentState::new(&doc(), &Vocabulary::default());
        for _ in 0..CONTENT {
            modal.handle_event(&TuiEvent::Tab);
        }
        modal.handle_event(&TuiEvent::Submit);
        modal.handle_event(&TuiEvent::InputChar('x'));
        assert_eq!(modal.content(), "# Runbook\nx");
    }

    #[test]
    fn editor_round_trip_replaces_content() {
        let mut modal = EditDocumentState::new(&doc(), &Vocabulary::default());
        assert!(matches!(
            modal.handle_event(&TuiEvent::OpenEditor),
            ModalOutput::LaunchEditor
        ));
        modal.set_content("edited".into());
        assert_eq!(modal.content(), "edited");
    }

    #[test]
    fn escape_cancels() {
        let mut modal = EditDocumentState::new(&doc(), &Vocabulary::default());
        assert!(is_cancel(&modal.handle_event(&TuiEvent::Escape)));
    }

    #[test]
    fn shows_vocabulary_hints() {
        let mut modal = Modal::EditDocument(EditDocumentState::new(&doc(), &vocabulary()));
        let screen = draw(&mut modal);
        assert!(screen.contains("categories: guides, policies"));
        assert!(screen.contains("Runbook"));
    }
}
