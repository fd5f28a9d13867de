//! # TitleBar Component
//!
//! Top line: application name, server, signed-in user and a spinner while
//! background jobs are in flight.
//!
//! Purely presentational. It receives everything as props and has no
//! internal state:
//!
//! ```rust,ignore
//! let mut title_bar = TitleBar::new(&app.server_url, app.user.as_ref(), app.in_flight, frame_no);
//! title_bar.render(frame, title_area);
//! ```

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::remote::CurrentUser;
use crate::tui::component::Component;

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub struct TitleBar<'a> {
    pub server_url: &'a str,
    pub user: Option<&'a CurrentUser>,
    /// Outstanding background jobs
    pub in_flight: usize,
    pub spinner_frame: usize,
}

impl<'a> TitleBar<'a> {
    pub fn new(
        server_url: &'a str,
        user: Option<&'a CurrentUser>,
        in_flight: usize,
        spinner_frame: usize,
    ) -> Self {
        Self {
            server_url,
            user,
            in_flight,
            spinner_frame,
        }
    }

    fn line(&self) -> Line<'static> {
        let mut spans = vec![
            Span::styled(
                " mdbrowse ",
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(" {}", self.server_url),
                Style::default().fg(Color::DarkGray),
            ),
        ];
        if let Some(user) = self.user {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                user.username.clone(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled(
                format!(" ({})", user.role),
                Style::default().fg(Color::Gray),
            ));
        }
        if self.in_flight > 0 {
            let frame = SPINNER[self.spinner_frame % SPINNER.len()];
            spans.push(Span::styled(
                format!("  {frame} working ({})", self.in_flight),
                Style::default().fg(Color::Yellow),
            ));
        }
        Line::from(spans)
    }
}

impl Component for TitleBar<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(self.line(), area);
    }
}
