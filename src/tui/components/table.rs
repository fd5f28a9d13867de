//! Shared pieces for the section tables: selection state, column helpers and
//! the common block styling.

use chrono::{DateTime, Local, NaiveDateTime};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, BorderType, Cell, Padding, Paragraph, Row, Table, TableState};
use unicode_width::UnicodeWidthChar;

use crate::tui::event::TuiEvent;

/// Persistent row selection for one table.
#[derive(Debug, Default)]
pub struct TableCursor {
    state: TableState,
}

impl TableCursor {
    pub fn selected(&self) -> usize {
        self.state.selected().unwrap_or(0)
    }

    pub fn select(&mut self, index: usize) {
        self.state.select(Some(index));
    }

    pub fn reset(&mut self) {
        self.state = TableState::default();
    }

    /// Keeps the selection inside `len` rows; called before every render.
    pub fn clamp(&mut self, len: usize) {
        if len == 0 {
            self.state.select(None);
        } else {
            self.state.select(Some(self.selected().min(len - 1)));
        }
    }

    /// Up/Down/Home/End navigation. Returns whether the event was consumed.
    pub fn navigate(&mut self, event: &TuiEvent, len: usize) -> bool {
        if len == 0 {
            return false;
        }
        let current = self.selected().min(len - 1);
        let next = match event {
            TuiEvent::CursorUp => current.saturating_sub(1),
            TuiEvent::CursorDown => (current + 1).min(len - 1),
            TuiEvent::CursorHome => 0,
            TuiEvent::CursorEnd => len - 1,
            _ => return false,
        };
        self.state.select(Some(next));
        true
    }

    pub fn state_mut(&mut self) -> &mut TableState {
        &mut self.state
    }
}

/// Local time for an RFC 3339 timestamp; anything else is cut to its first
/// 19 characters.
pub fn format_timestamp(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string();
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return dt.format("%Y-%m-%d %H:%M").to_string();
    }
    raw.chars().take(19).collect::<String>().replace('T', " ")
}

/// First `n` characters, for ids and checksums.
pub fn prefix(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

/// Cut `s` to `width` terminal columns, ending in `…` when shortened.
pub fn truncate(s: &str, width: usize) -> String {
    let mut out = String::new();
    let mut used = 0;
    let total: usize = s.chars().filter_map(|c| c.width()).sum();
    if total <= width {
        return s.to_string();
    }
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    if width > 0 {
        out.push('…');
    }
    out
}

pub fn header(titles: &[&'static str]) -> Row<'static> {
    Row::new(titles.iter().map(|t| Cell::from(*t)))
        .style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
}

pub fn highlight() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

/// Bordered block for a section body with its key help along the bottom.
pub fn section_block(title: String, help: &'static str) -> Block<'static> {
    Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" {title} "))
        .title_style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
        .title_bottom(Line::from(help).centered())
        .padding(Padding::horizontal(1))
}

/// Centered hint in place of an empty or still-loading table.
pub fn placeholder(frame: &mut Frame, area: Rect, block: Block<'static>, text: &str) {
    let paragraph = Paragraph::new(text.to_string())
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center)
        .block(block);
    frame.render_widget(paragraph, area);
}

/// Column layout and rows for one section table.
pub struct Columns<'a> {
    pub titles: &'a [&'static str],
    pub widths: &'a [Constraint],
}

/// Draws `rows` inside `block`. `None` means the list has not loaded yet.
pub fn render_rows(
    frame: &mut Frame,
    area: Rect,
    block: Block<'static>,
    cursor: &mut TableCursor,
    columns: Columns<'_>,
    rows: Option<Vec<Row<'static>>>,
    empty: &str,
) {
    let Some(rows) = rows else {
        placeholder(frame, area, block, "Loading…");
        return;
    };
    if rows.is_empty() {
        placeholder(frame, area, block, empty);
        return;
    }
    cursor.clamp(rows.len());
    let table = Table::new(rows, columns.widths.to_vec())
        .header(header(columns.titles))
        .block(block)
        .row_highlight_style(highlight())
        .highlight_symbol("▶ ");
    frame.render_stateful_widget(table, area, cursor.state_mut());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigation_stays_in_bounds() {
        let mut cursor = TableCursor::default();
        assert!(cursor.navigate(&TuiEvent::CursorDown, 3));
        assert!(cursor.navigate(&TuiEvent::CursorDown, 3));
        assert!(cursor.navigate(&TuiEvent::CursorDown, 3));
        assert_eq!(cursor.selected(), 2);
        assert!(cursor.navigate(&TuiEvent::CursorHome, 3));
        assert_eq!(cursor.selected(), 0);
        assert!(!cursor.navigate(&TuiEvent::CursorDown, 0));
        assert!(!cursor.navigate(&TuiEvent::Submit, 3));
    }

    #[test]
    fn clamp_after_list_shrinks() {
        let mut cursor = TableCursor::default();
        cursor.select(5);
        cursor.clamp(2);
        assert_eq!(cursor.selected(), 1);
        cursor.clamp(0);
        assert_eq!(cursor.state_mut().selected(), None);
    }

    #[test]
    fn timestamps_fall_back_to_prefix() {
        assert_eq!(format_timestamp("2024-03-01 09:15:00"), "2024-03-01 09:15");
        assert_eq!(format_timestamp("yesterday"), "yesterday");
        assert_eq!(
            format_timestamp("2024-03-01T09:15:00.123456"),
            "2024-03-01 09:15:00"
        );
        assert_eq!(format_timestamp(""), "");
    }

    #[test]
    fn truncate_marks_cut_text() {
        assert_eq!(truncate("Runbook", 10), "Runbook");
        assert_eq!(truncate("Release notes", 8), "Release…");
        assert_eq!(prefix("0123456789abcdef", 12), "0123456789ab");
    }
}
