//! Wrapping and boundary helpers for `TextInput`.
//!
//! Everything here works on byte offsets into a `&str` and never holds state.

/// Border (2) + horizontal padding (2) around the editable text.
pub(super) const HORIZONTAL_OVERHEAD: u16 = 4;
/// Top and bottom border.
pub(super) const VERTICAL_OVERHEAD: u16 = 2;
/// Column of the first text cell relative to the widget's left edge.
pub(super) const TEXT_OFFSET_X: u16 = 2;
/// Row of the first text cell relative to the widget's top edge.
pub(super) const TEXT_OFFSET_Y: u16 = 1;

pub(super) fn wrap_options(width: u16) -> textwrap::Options<'static> {
    textwrap::Options::new(usize::from(width.max(1)))
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace)
}

/// Text width left inside a widget of `outer_width` columns; 0 when too narrow.
pub(super) fn inner_width(outer_width: u16) -> u16 {
    outer_width.saturating_sub(HORIZONTAL_OVERHEAD)
}

/// Number of wrapped rows `text` occupies at `width`, counting a trailing
/// newline as the start of an empty row.
pub(super) fn wrapped_rows(text: &str, width: u16) -> u16 {
    if width == 0 || text.is_empty() {
        return 1;
    }
    let lines = textwrap::wrap(text, wrap_options(width));
    let mut rows = u16::try_from(lines.len()).unwrap_or(u16::MAX).max(1);
    if text.ends_with('\n') && !lines.last().is_some_and(|l| l.is_empty()) {
        rows = rows.saturating_add(1);
    }
    rows
}

pub(super) fn prev_char_boundary(text: &str, pos: usize) -> usize {
    let mut i = pos.min(text.len());
    while i > 0 {
        i -= 1;
        if text.is_char_boundary(i) {
            return i;
        }
    }
    0
}

pub(super) fn next_char_boundary(text: &str, pos: usize) -> usize {
    let mut i = pos;
    while i < text.len() {
        i += 1;
        if text.is_char_boundary(i) {
            return i;
        }
    }
    text.len()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Start of the word before `pos`, skipping separators first (readline
/// `backward-word`).
pub(super) fn prev_word_boundary(text: &str, pos: usize) -> usize {
    let before = &text[..pos];
    let trimmed = before.trim_end_matches(|c: char| !is_word_char(c));
    trimmed
        .char_indices()
        .rev()
        .find(|&(_, c)| !is_word_char(c))
        .map(|(i, c)| i + c.len_utf8())
        .unwrap_or(0)
}

/// End of the word after `pos`, skipping separators first (readline
/// `forward-word`).
pub(super) fn next_word_boundary(text: &str, pos: usize) -> usize {
    let after = &text[pos..];
    let skipped = after.len() - after.trim_start_matches(|c: char| !is_word_char(c)).len();
    let rest = &after[skipped..];
    let word = rest.find(|c: char| !is_word_char(c)).unwrap_or(rest.len());
    pos + skipped + word
}
