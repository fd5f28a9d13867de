//! # Document Detail
//!
//! Metadata block followed by the rendered markdown body inside a
//! `tui_scrollview::ScrollView`.
//!
//! Rendering markdown with syntect is not free, so the parsed body is cached
//! per document and sequence number and only re-wrapped when the viewport
//! width changes.

use ratatui::Frame;
use ratatui::layout::{Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::Paragraph;
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::action::{Action, Step};
use crate::core::state::App;
use crate::remote::Document;
use crate::tui::Command;
use crate::tui::component::Component;
use crate::tui::components::table::{format_timestamp, section_block};
use crate::tui::event::TuiEvent;
use crate::tui::markdown;
use crate::tui::modals::{ConfirmState, EditDocumentState, Modal};

pub const HELP: &str = "↑↓ scroll  e edit  v versions  x delete  r refresh  Esc back";

struct Rendered {
    id: String,
    seq: u64,
    body: Text<'static>,
    width: u16,
    wrapped: Vec<Line<'static>>,
}

/// Persistent state for the detail view, lives in `TuiState`.
#[derive(Default)]
pub struct DocumentViewState {
    scroll: ScrollViewState,
    rendered: Option<Rendered>,
}

impl DocumentViewState {
    /// Lines for `doc` at `width`, re-rendering only what changed.
    fn lines(&mut self, doc: &Document, seq: u64, width: u16) -> &[Line<'static>] {
        let stale = !self
            .rendered
            .as_ref()
            .is_some_and(|r| r.id == doc.id && r.seq == seq);
        if stale {
            if self.rendered.as_ref().is_none_or(|r| r.id != doc.id) {
                self.scroll = ScrollViewState::default();
            }
            let mut lines = metadata(doc);
            lines.extend(markdown::render(&doc.content_md).lines);
            let body = Text::from(lines);
            let wrapped = markdown::reflow(&body.lines, width);
            self.rendered = Some(Rendered {
                id: doc.id.clone(),
                seq,
                body,
                width,
                wrapped,
            });
        }
        let rendered = match self.rendered.as_mut() {
            Some(r) => r,
            None => return &[],
        };
        if rendered.width != width {
            rendered.wrapped = markdown::reflow(&rendered.body.lines, width);
            rendered.width = width;
        }
        &rendered.wrapped
    }

    pub fn handle_event(&mut self, event: &TuiEvent, app: &App) -> Option<Command> {
        let doc = app.shown_document()?;
        match event {
            TuiEvent::CursorUp => self.scroll.scroll_up(),
            TuiEvent::CursorDown => self.scroll.scroll_down(),
            TuiEvent::PageUp => self.scroll.scroll_page_up(),
            TuiEvent::PageDown => self.scroll.scroll_page_down(),
            TuiEvent::CursorHome => self.scroll.scroll_to_top(),
            TuiEvent::CursorEnd => self.scroll.scroll_to_bottom(),
            TuiEvent::InputChar('e') => {
                return Some(Command::Open(Modal::EditDocument(EditDocumentState::new(
                    doc,
                    &app.vocabulary,
                ))));
            }
            TuiEvent::InputChar('v') => return Some(Command::Core(Action::ShowVersions)),
            TuiEvent::InputChar('x') => {
                return Some(Command::Open(Modal::Confirm(ConfirmState::new(
                    "Delete document",
                    format!("Delete \"{}\"? This cannot be undone.", doc.title),
                    Step::DeleteDocument(doc.id.clone()),
                ))));
            }
            TuiEvent::InputChar('r') => return Some(Command::Core(Action::Refresh)),
            _ => {}
        }
        None
    }
}

fn field(label: &'static str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{label:<12}"), Style::default().fg(Color::DarkGray)),
        Span::raw(value),
    ])
}

fn metadata(doc: &Document) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::from(Span::styled(
            doc.title.clone(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )),
        field("id", doc.id.clone()),
        field("category", doc.category.clone()),
        field("tags", doc.tags.join(", ")),
        field(
            "version",
            doc.latest_version
                .map(|v| format!("v{v}"))
                .unwrap_or_else(|| "-".to_string()),
        ),
        field("visibility", doc.visibility.clone()),
        field("created by", doc.created_by.clone()),
        field("created", format_timestamp(&doc.created_at)),
        field("updated", format_timestamp(&doc.updated_at)),
    ];
    lines.push(Line::from(Span::styled(
        "─".repeat(40),
        Style::default().fg(Color::DarkGray),
    )));
    lines
}

/// Transient render wrapper for the detail view.
pub struct DocumentView<'a> {
    state: &'a mut DocumentViewState,
    doc: &'a Document,
    seq: u64,
}

impl<'a> DocumentView<'a> {
    pub fn new(state: &'a mut DocumentViewState, doc: &'a Document, seq: u64) -> Self {
        Self { state, doc, seq }
    }
}

impl Component for DocumentView<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = section_block(self.doc.title.clone(), HELP);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        // one column for the scrollbar
        let width = inner.width.saturating_sub(1).max(1);
        let lines = self.state.lines(self.doc, self.seq, width).to_vec();
        let height = u16::try_from(lines.len()).unwrap_or(u16::MAX);

        let mut view = ScrollView::new(Size::new(width, height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);
        view.render_widget(Paragraph::new(lines), Rect::new(0, 0, width, height));
        frame.render_stateful_widget(view, inner, &mut self.state.scroll);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::{Section, View};
    use crate::test_support::logged_in_app;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn doc() -> Document {
        Document {
            id: "d1".into(),
            title: "Onboarding".into(),
            category: "guides".into(),
            tags: vec!["ops".into(), "rust".into()],
            latest_version: Some(3),
            content_md: "# Welcome\n\nRead **this** first.".into(),
            ..Default::default()
        }
    }

    #[test]
    fn renders_metadata_and_body() {
        let doc = doc();
        let mut state = DocumentViewState::default();
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| DocumentView::new(&mut state, &doc, 1).render(f, f.area()))
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Onboarding"));
        assert!(text.contains("ops, rust"));
        assert!(text.contains("v3"));
        assert!(text.contains("# Welcome"));
    }

    #[test]
    fn cache_follows_sequence() {
        let mut doc = doc();
        let mut state = DocumentViewState::default();
        let first = state.lines(&doc, 1, 60).len();
        doc.content_md.push_str("\n\nmore\n\nand more");
        assert_eq!(state.lines(&doc, 1, 60).len(), first);
        assert!(state.lines(&doc, 2, 60).len() > first);
    }

    #[test]
    fn keys_map_to_commands() {
        let mut app = logged_in_app();
        app.section = Section::Documents;
        app.view = View::Detail;
        app.detail = Some(doc());
        let mut state = DocumentViewState::default();

        assert!(matches!(
            state.handle_event(&TuiEvent::InputChar('v'), &app),
            Some(Command::Core(Action::ShowVersions))
        ));
        assert!(matches!(
            state.handle_event(&TuiEvent::InputChar('x'), &app),
            Some(Command::Open(Modal::Confirm(_)))
        ));
        assert!(matches!(
            state.handle_event(&TuiEvent::InputChar('e'), &app),
            Some(Command::Open(Modal::EditDocument(_)))
        ));
    }
}
