//! # SSH Browser
//!
//! Connect form (user, host, start path) above a listing of the remote
//! directory. Listings and downloads run as background jobs; the modal
//! only asks for them with [`ModalOutput::Request`] and is fed the
//! results through [`SshBrowserState::show_listing`] and
//! [`SshBrowserState::fail`].

use std::path::Path;

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, List, ListItem, ListState, Paragraph};

use super::{ModalOutput, cancelled, centered_rect, frame_modal};
use crate::core::action::Action;
use crate::remote::{RemoteEntry, RemoteTarget, is_markdown};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::table::{highlight, truncate};
use crate::tui::components::text_input::{InputEvent, TextInput};
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    User,
    Host,
    Path,
    Listing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Loading,
    Downloading,
}

struct Listing {
    target: RemoteTarget,
    path: String,
    /// `..` first unless at `/`, then directories, then files.
    entries: Vec<RemoteEntry>,
}

pub struct SshBrowserState {
    user: TextInput,
    host: TextInput,
    path: TextInput,
    focus: Focus,
    phase: Phase,
    listing: Option<Listing>,
    list: ListState,
    error: Option<String>,
}

impl SshBrowserState {
    pub fn new(default_user: &str) -> Self {
        Self {
            user: TextInput::new("User").with_value(default_user),
            host: TextInput::new("Host"),
            path: TextInput::new("Path").with_value("/"),
            focus: Focus::Host,
            phase: Phase::Idle,
            listing: None,
            list: ListState::default(),
            error: None,
        }
    }

    pub fn is_downloading(&self) -> bool {
        self.phase == Phase::Downloading
    }

    /// A listing arrived; directories first, both groups by name.
    pub fn show_listing(&mut self, target: RemoteTarget, path: String, mut entries: Vec<RemoteEntry>) {
        entries.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));
        if path != "/" {
            entries.insert(
                0,
                RemoteEntry {
                    name: "..".to_string(),
                    is_dir: true,
                    size: 0,
                    permissions: String::new(),
                },
            );
        }
        self.path.set_value(path.clone());
        self.listing = Some(Listing {
            target,
            path,
            entries,
        });
        self.list.select(Some(0));
        self.phase = Phase::Idle;
        self.error = None;
        self.focus = Focus::Listing;
    }

    /// A listing or download failed; the form stays open for another try.
    pub fn fail(&mut self, message: String) {
        self.phase = Phase::Idle;
        self.error = Some(message);
    }

    fn target(&self) -> RemoteTarget {
        RemoteTarget::new(
            self.host.value().trim(),
            Some(self.user.value().trim().to_string()),
        )
    }

    fn browse(&mut self, target: RemoteTarget, path: String) -> ModalOutput {
        self.phase = Phase::Loading;
        self.error = None;
        ModalOutput::Request(Action::BrowseRemote { target, path })
    }

    fn next_focus(&mut self, forward: bool) {
        let order = if self.listing.is_some() {
            &[Focus::User, Focus::Host, Focus::Path, Focus::Listing][..]
        } else {
            &[Focus::User, Focus::Host, Focus::Path][..]
        };
        let i = order.iter().position(|f| *f == self.focus).unwrap_or(0);
        let n = order.len();
        self.focus = order[if forward { (i + 1) % n } else { (i + n - 1) % n }];
    }

    pub fn handle_event(&mut self, event: &TuiEvent) -> ModalOutput {
        match event {
            TuiEvent::Escape => return cancelled(),
            TuiEvent::Tab => {
                self.next_focus(true);
                return ModalOutput::Stay;
            }
            TuiEvent::BackTab => {
                self.next_focus(false);
                return ModalOutput::Stay;
            }
            _ => {}
        }
        if self.phase != Phase::Idle {
            return ModalOutput::Stay;
        }
        let field = match self.focus {
            Focus::User => &mut self.user,
            Focus::Host => &mut self.host,
            Focus::Path => &mut self.path,
            Focus::Listing => return self.handle_listing(event),
        };
        match field.handle_event(event) {
            Some(InputEvent::Submit) => {
                let path = self.path.value().trim().to_string();
                self.browse(self.target(), path)
            }
            _ => ModalOutput::Stay,
        }
    }

    fn handle_listing(&mut self, event: &TuiEvent) -> ModalOutput {
        let Some(listing) = &self.listing else {
            return ModalOutput::Stay;
        };
        let len = listing.entries.len();
        match event {
            TuiEvent::CursorUp => {
                let prev = self.list.selected().map_or(0, |i| i.saturating_sub(1));
                self.list.select(Some(prev));
                ModalOutput::Stay
            }
            TuiEvent::CursorDown if len > 0 => {
                let next = self.list.selected().map_or(0, |i| (i + 1).min(len - 1));
                self.list.select(Some(next));
                ModalOutput::Stay
            }
            TuiEvent::Backspace => {
                let (target, path) = (listing.target.clone(), parent(&listing.path));
                self.browse(target, path)
            }
            TuiEvent::Submit => {
                let Some(entry) = self.list.selected().and_then(|i| listing.entries.get(i)) else {
                    return ModalOutput::Stay;
                };
                let target = listing.target.clone();
                if entry.name == ".." {
                    let path = parent(&listing.path);
                    return self.browse(target, path);
                }
                let path = join(&listing.path, &entry.name);
                if entry.is_dir {
                    self.browse(target, path)
                } else if is_markdown(Path::new(&entry.name)) {
                    self.phase = Phase::Downloading;
                    self.error = None;
                    ModalOutput::Request(Action::FetchRemote { target, path })
                } else {
                    self.error = Some("Only .md/.markdown files can be uploaded".to_string());
                    ModalOutput::Stay
                }
            }
            _ => ModalOutput::Stay,
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let area = centered_rect(80, 80, area);
        let inner = frame_modal(
            frame,
            area,
            "Upload over SSH",
            "Enter connect/open  Tab next  Backspace up  Esc cancel",
        );
        let [form, status, list] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(3),
        ])
        .areas(inner);
        let [user, host, path] = Layout::horizontal([
            Constraint::Percentage(25),
            Constraint::Percentage(35),
            Constraint::Percentage(40),
        ])
        .areas(form);

        self.user.focused = self.focus == Focus::User;
        self.host.focused = self.focus == Focus::Host;
        self.path.focused = self.focus == Focus::Path;
        self.user.render(frame, user);
        self.host.render(frame, host);
        self.path.render(frame, path);

        let line = match (&self.error, self.phase) {
            (Some(error), _) => Span::styled(error.clone(), Style::default().fg(Color::Red)),
            (None, Phase::Loading) => Span::styled("Listing…", Style::default().fg(Color::Yellow)),
            (None, Phase::Downloading) => {
                Span::styled("Downloading…", Style::default().fg(Color::Yellow))
            }
            (None, Phase::Idle) => Span::styled(
                "Uses your ssh keys and agent; password prompts are not supported",
                Style::default().fg(Color::DarkGray),
            ),
        };
        frame.render_widget(Paragraph::new(Line::from(line)), status);

        let border = if self.focus == Focus::Listing {
            Color::Cyan
        } else {
            Color::DarkGray
        };
        let title = match &self.listing {
            Some(l) => format!(" {}:{} ", l.target.destination(), l.path),
            None => " Not connected ".to_string(),
        };
        let block = Block::bordered()
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border))
            .title(truncate(&title, usize::from(list.width.saturating_sub(2))));
        let items: Vec<ListItem> = self
            .listing
            .iter()
            .flat_map(|l| l.entries.iter())
            .map(|e| {
                if e.is_dir {
                    ListItem::new(Span::styled(
                        format!("{}/", e.name),
                        Style::default().fg(Color::Blue),
                    ))
                } else {
                    let style = if is_markdown(Path::new(&e.name)) {
                        Style::default()
                    } else {
                        Style::default().fg(Color::DarkGray)
                    };
                    ListItem::new(Line::from(vec![
                        Span::styled(e.name.clone(), style),
                        Span::styled(format!("  {} B", e.size), Style::default().fg(Color::DarkGray)),
                    ]))
                }
            })
            .collect();
        let widget = List::new(items)
            .block(block)
            .highlight_style(highlight())
            .highlight_symbol("▶ ");
        frame.render_stateful_widget(widget, list, &mut self.list);
    }
}

/// `dir/name` for remote POSIX paths.
fn join(dir: &str, name: &str) -> String {
    if dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}

/// Parent of a remote POSIX path; `/` is its own parent.
fn parent(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(i) => trimmed[..i].to_string(),
    }
}
