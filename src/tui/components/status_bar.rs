//! Bottom line: the current notice while it is fresh, key help otherwise.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::core::state::{Notice, NoticeLevel};
use crate::tui::component::Component;

pub struct StatusBar<'a> {
    pub notice: Option<&'a Notice>,
    pub help: &'a str,
}

impl<'a> StatusBar<'a> {
    pub fn new(notice: Option<&'a Notice>, help: &'a str) -> Self {
        Self { notice, help }
    }
}

impl Component for StatusBar<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let line = match self.notice {
            Some(notice) => {
                let (tag, color) = match notice.level {
                    NoticeLevel::Info => ("✓", Color::Green),
                    NoticeLevel::Warning => ("!", Color::Yellow),
                    NoticeLevel::Error => ("✗", Color::Red),
                };
                Line::from(vec![
                    Span::styled(format!(" {tag} "), Style::default().fg(color)),
                    Span::styled(notice.text.clone(), Style::default().fg(color)),
                ])
            }
            None => Line::from(Span::styled(
                format!(" {}", self.help),
                Style::default().fg(Color::DarkGray),
            )),
        };
        frame.render_widget(line, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    #[test]
    fn notice_replaces_help() {
        let notice = Notice {
            level: NoticeLevel::Error,
            text: "Username taken (hint: Pick another name)".into(),
            at: Instant::now(),
        };
        let backend = TestBackend::new(60, 1);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| StatusBar::new(Some(&notice), "q quit").render(f, f.area()))
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Username taken"));
        assert!(!text.contains("q quit"));
    }
}
