//! Left-hand section list. `1`–`6` jump straight to a section.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, List, ListItem, ListState};

use crate::core::state::Section;
use crate::tui::component::Component;

/// Width of the sidebar column, borders included.
pub const SIDEBAR_WIDTH: u16 = 22;

pub struct Sidebar {
    pub active: Section,
}

impl Component for Sidebar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = Section::ALL
            .iter()
            .enumerate()
            .map(|(i, section)| {
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{} ", i + 1), Style::default().fg(Color::DarkGray)),
                    Span::raw(section.title()),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::bordered()
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(Color::DarkGray))
                    .title(" Sections "),
            )
            .highlight_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        let mut state = ListState::default().with_selected(Some(self.active.index()));
        frame.render_stateful_widget(list, area, &mut state);
    }
}

/// Section for a digit key, if any.
pub fn section_for_key(c: char) -> Option<Section> {
    let digit = c.to_digit(10)? as usize;
    digit.checked_sub(1).and_then(Section::from_index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_map_to_sections() {
        assert_eq!(section_for_key('1'), Some(Section::Documents));
        assert_eq!(section_for_key('6'), Some(Section::Audit));
        assert_eq!(section_for_key('0'), None);
        assert_eq!(section_for_key('7'), None);
        assert_eq!(section_for_key('x'), None);
    }
}
