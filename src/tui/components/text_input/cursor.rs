//! Cursor tracking for multi-line `TextInput`s.
//!
//! `Caret` owns the byte offset, the first visible wrapped row and the width
//! seen at the last render. The buffer itself belongs to `TextInput` and is
//! passed in explicitly.

use super::layout::{TEXT_OFFSET_X, TEXT_OFFSET_Y, inner_width, wrap_options, wrapped_rows};
use ratatui::layout::Rect;

pub(super) struct Caret {
    /// Byte offset into the buffer (0..=len)
    pub pos: usize,
    /// First wrapped row shown when the text is taller than the widget
    pub scroll: u16,
    /// Outer width from the last render; vertical movement needs it
    pub last_width: u16,
}

impl Caret {
    const FALLBACK_WIDTH: u16 = 80;

    pub fn at(pos: usize) -> Self {
        Self {
            pos,
            scroll: 0,
            last_width: Self::FALLBACK_WIDTH,
        }
    }

    /// Byte spans `(start, len)` of each wrapped row, including the newline
    /// that ends a logical line.
    fn row_spans(buffer: &str, width: u16) -> Vec<(usize, usize)> {
        let rows = textwrap::wrap(buffer, wrap_options(width));
        let mut spans = Vec::with_capacity(rows.len());
        let mut start = 0;
        for row in &rows {
            let newline = buffer.as_bytes().get(start + row.len()) == Some(&b'\n');
            spans.push((start, row.len()));
            start += row.len() + usize::from(newline);
        }
        spans
    }

    /// Move one wrapped row up (`-1`) or down (`1`), keeping the column
    /// where possible. Returns whether the caret moved.
    pub fn move_rows(&mut self, buffer: &str, direction: i16) -> bool {
        let width = inner_width(self.last_width);
        if width == 0 || buffer.is_empty() {
            return false;
        }
        let spans = Self::row_spans(buffer, width);
        let Some(current) = spans
            .iter()
            .position(|&(start, len)| self.pos <= start + len)
        else {
            return false;
        };
        let target = if direction < 0 {
            match current.checked_sub(1) {
                Some(t) => t,
                None => return false,
            }
        } else if current + 1 < spans.len() {
            current + 1
        } else {
            return false;
        };
        let column = self.pos - spans[current].0;
        let (start, len) = spans[target];
        let mut pos = start + column.min(len);
        while !buffer.is_char_boundary(pos) {
            pos -= 1;
        }
        self.pos = pos;
        true
    }

    /// Wrapped row (0-based) the caret sits on.
    pub fn row(&self, buffer: &str, width: u16) -> u16 {
        if width == 0 {
            return 0;
        }
        let before = &buffer[..self.pos];
        let rows = textwrap::wrap(before, wrap_options(width));
        let mut row = u16::try_from(rows.len().saturating_sub(1)).unwrap_or(u16::MAX);
        if before.ends_with('\n') && !rows.last().is_some_and(|l| l.is_empty()) {
            row = row.saturating_add(1);
        }
        row
    }

    /// Scrolls so the caret stays inside `visible_rows`.
    pub fn follow(&mut self, buffer: &str, outer_width: u16, visible_rows: u16) {
        let width = inner_width(outer_width);
        if wrapped_rows(buffer, width) <= visible_rows {
            self.scroll = 0;
            return;
        }
        let row = self.row(buffer, width);
        if row < self.scroll {
            self.scroll = row;
        } else if row >= self.scroll + visible_rows {
            self.scroll = row + 1 - visible_rows;
        }
    }

    /// Terminal cell for the caret inside `area`.
    pub fn screen_pos(&self, buffer: &str, area: Rect) -> (u16, u16) {
        let width = inner_width(area.width);
        let origin = (area.x + TEXT_OFFSET_X, area.y + TEXT_OFFSET_Y);
        if width == 0 {
            return origin;
        }
        let before = &buffer[..self.pos];
        let row = self.row(buffer, width);

        // textwrap trims trailing spaces, so count characters on the
        // caret's own logical line instead of measuring wrapped output.
        let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let logical = &before[line_start..];
        let segments = textwrap::wrap(logical, wrap_options(width));
        let consumed: usize = segments
            .iter()
            .take(segments.len().saturating_sub(1))
            .map(|s| s.chars().count())
            .sum();
        let column = logical.chars().count().saturating_sub(consumed);
        let column = u16::try_from(column).unwrap_or(u16::MAX).min(width);

        (
            origin.0 + column,
            origin.1 + row.saturating_sub(self.scroll),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caret(pos: usize, width: u16) -> Caret {
        let mut c = Caret::at(pos);
        c.last_width = width;
        c
    }

    #[test]
    fn moves_between_logical_lines_keeping_column() {
        let text = "first\nsecond";
        let mut c = caret(3, 40);
        assert!(c.move_rows(text, 1));
        assert_eq!(c.pos, 9);
        assert!(c.move_rows(text, -1));
        assert_eq!(c.pos, 3);
        assert!(!c.move_rows(text, -1));
    }

    #[test]
    fn column_clamps_to_shorter_row() {
        let text = "a\nlonger line";
        let mut c = caret(text.len(), 40);
        assert!(c.move_rows(text, -1));
        assert_eq!(c.pos, 1);
    }

    #[test]
    fn follow_scrolls_to_caret() {
        let text = "1\n2\n3\n4\n5\n6";
        let mut c = caret(text.len(), 40);
        c.follow(text, 40, 3);
        assert_eq!(c.scroll, 3);
        c.pos = 0;
        c.follow(text, 40, 3);
        assert_eq!(c.scroll, 0);
    }

    #[test]
    fn screen_pos_after_newline() {
        let text = "ab\n";
        let c = caret(3, 40);
        let area = Rect::new(10, 5, 40, 6);
        assert_eq!(c.screen_pos(text, area), (12, 7));
    }
}
