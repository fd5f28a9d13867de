//! # TextInput Component
//!
//! Editable text field used by the login form, the search box and every
//! modal form.
//!
//! ## Responsibilities
//!
//! - Capture text input (typing, paste, backspace, delete)
//! - Cursor movement by character, word and wrapped row
//! - Single-line fields emit `Submit` on Enter; multi-line fields insert a
//!   newline instead and scroll internally
//! - Password fields render as `•`
//!
//! The buffer is internal state; `focused` is a prop set by the owning form
//! each frame.

mod cursor;
mod layout;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, BorderType, Padding, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

use cursor::Caret;
use layout::{
    TEXT_OFFSET_X, TEXT_OFFSET_Y, VERTICAL_OVERHEAD, inner_width,
    next_char_boundary, next_word_boundary, prev_char_boundary, prev_word_boundary, wrap_options,
    wrapped_rows,
};

/// High-level events emitted by a TextInput
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Buffer or cursor changed
    Changed,
    /// Enter on a single-line field
    Submit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    SingleLine,
    MultiLine,
}

pub struct TextInput {
    title: String,
    buffer: String,
    caret: Caret,
    kind: Kind,
    masked: bool,
    /// Whether this field owns the terminal cursor (Prop)
    pub focused: bool,
}

impl TextInput {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            buffer: String::new(),
            caret: Caret::at(0),
            kind: Kind::SingleLine,
            masked: false,
            focused: false,
        }
    }

    pub fn multi_line(title: impl Into<String>) -> Self {
        Self {
            kind: Kind::MultiLine,
            ..Self::new(title)
        }
    }

    pub fn password(title: impl Into<String>) -> Self {
        Self {
            masked: true,
            ..Self::new(title)
        }
    }

    /// Builder: start with `value`, cursor at the end.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.set_value(value);
        self
    }

    pub fn value(&self) -> &str {
        &self.buffer
    }

    /// Replaces the text; newlines are flattened for single-line fields.
    pub fn set_value(&mut self, value: impl Into<String>) {
        let value = value.into();
        self.buffer = match self.kind {
            Kind::SingleLine => value.replace(['\r', '\n'], " "),
            Kind::MultiLine => value,
        };
        self.caret = Caret::at(self.buffer.len());
    }

    pub fn clear(&mut self) {
        self.set_value(String::new());
    }

    /// Rows needed to show the whole field for `width` columns, capped at
    /// `max_rows` of text.
    pub fn height(&self, width: u16, max_rows: u16) -> u16 {
        let rows = match self.kind {
            Kind::SingleLine => 1,
            Kind::MultiLine => wrapped_rows(&self.buffer, inner_width(width)).min(max_rows),
        };
        rows.max(1) + VERTICAL_OVERHEAD
    }

    fn insert(&mut self, text: &str) {
        let text = match self.kind {
            Kind::SingleLine => text.replace(['\r', '\n'], " "),
            Kind::MultiLine => text.replace('\r', ""),
        };
        self.buffer.insert_str(self.caret.pos, &text);
        self.caret.pos += text.len();
    }

    fn shown_text(&self) -> String {
        if self.masked {
            "•".repeat(self.buffer.chars().count())
        } else {
            self.buffer.clone()
        }
    }

    /// Single-line render: scroll horizontally so the caret stays visible.
    fn render_single(&self, width: u16) -> (String, u16) {
        let shown = self.shown_text();
        let caret_chars = self.buffer[..self.caret.pos].chars().count();
        let before: String = shown.chars().take(caret_chars).collect();
        let visible = usize::from(width.max(1));
        let mut skip = 0;
        while before.chars().skip(skip).collect::<String>().width() >= visible {
            skip += 1;
        }
        let text: String = shown.chars().skip(skip).collect();
        let column = before.chars().skip(skip).collect::<String>().width();
        (text, u16::try_from(column).unwrap_or(width))
    }

    fn render_multi(&mut self, area: Rect) -> String {
        let visible = area.height.saturating_sub(VERTICAL_OVERHEAD).max(1);
        self.caret.last_width = area.width;
        self.caret.follow(&self.buffer, area.width, visible);
        let width = inner_width(area.width);
        if self.caret.scroll == 0 || width == 0 {
            return self.buffer.clone();
        }
        let rows = textwrap::wrap(&self.buffer, wrap_options(width));
        let start = usize::from(self.caret.scroll).min(rows.len());
        let end = (start + usize::from(visible)).min(rows.len());
        rows[start..end].join("\n")
    }
}

impl Component for TextInput {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let border = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(border)
            .title(format!(" {} ", self.title))
            .padding(Padding::horizontal(1));

        let (text, cursor) = match self.kind {
            Kind::SingleLine => {
                let (text, column) = self.render_single(inner_width(area.width));
                (text, (area.x + TEXT_OFFSET_X + column, area.y + TEXT_OFFSET_Y))
            }
            Kind::MultiLine => {
                let text = self.render_multi(area);
                (text, self.caret.screen_pos(&self.buffer, area))
            }
        };

        let paragraph = Paragraph::new(text)
            .block(block)
            .style(Style::default().fg(Color::White));
        frame.render_widget(paragraph, area);

        if self.focused {
            frame.set_cursor_position(cursor);
        }
    }
}

impl EventHandler for TextInput {
    type Event = InputEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        let pos = self.caret.pos;
        match event {
            TuiEvent::InputChar(c) => {
                self.insert(c.encode_utf8(&mut [0; 4]));
                Some(InputEvent::Changed)
            }
            TuiEvent::Paste(text) => {
                self.insert(text);
                Some(InputEvent::Changed)
            }
            TuiEvent::Submit => match self.kind {
                Kind::SingleLine => Some(InputEvent::Submit),
                Kind::MultiLine => {
                    self.insert("\n");
                    Some(InputEvent::Changed)
                }
            },
            TuiEvent::Backspace => (pos > 0).then(|| {
                let prev = prev_char_boundary(&self.buffer, pos);
                self.buffer.drain(prev..pos);
                self.caret.pos = prev;
                InputEvent::Changed
            }),
            TuiEvent::Delete => (pos < self.buffer.len()).then(|| {
                let next = next_char_boundary(&self.buffer, pos);
                self.buffer.drain(pos..next);
                InputEvent::Changed
            }),
            TuiEvent::CursorLeft => self.move_to(prev_char_boundary(&self.buffer, pos)),
            TuiEvent::CursorRight => self.move_to(next_char_boundary(&self.buffer, pos)),
            TuiEvent::WordLeft => self.move_to(prev_word_boundary(&self.buffer, pos)),
            TuiEvent::WordRight => self.move_to(next_word_boundary(&self.buffer, pos)),
            TuiEvent::CursorHome => {
                let start = self.buffer[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0);
                self.move_to(start)
            }
            TuiEvent::CursorEnd => {
                let end = self.buffer[pos..]
                    .find('\n')
                    .map(|i| pos + i)
                    .unwrap_or(self.buffer.len());
                self.move_to(end)
            }
            TuiEvent::CursorUp if self.kind == Kind::MultiLine => self
                .caret
                .move_rows(&self.buffer, -1)
                .then_some(InputEvent::Changed),
            TuiEvent::CursorDown if self.kind == Kind::MultiLine => self
                .caret
                .move_rows(&self.buffer, 1)
                .then_some(InputEvent::Changed),
            _ => None,
        }
    }
}

impl TextInput {
    fn move_to(&mut self, pos: usize) -> Option<InputEvent> {
        (pos != self.caret.pos).then(|| {
            self.caret.pos = pos;
            InputEvent::Changed
        })
    }
}
