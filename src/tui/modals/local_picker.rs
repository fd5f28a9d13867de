//! Local file picker for uploads. Directories first, then files, both
//! sorted case-insensitively; only markdown files can be chosen.

use std::fs;
use std::path::{Path, PathBuf};

use log::warn;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, ListState, Paragraph};

use super::{ModalOutput, cancelled, centered_rect, confirmed, frame_modal};
use crate::core::action::{Action, Step};
use crate::core::state::NoticeLevel;
use crate::remote::is_markdown;
use crate::tui::components::table::{highlight, truncate};
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    name: String,
    is_dir: bool,
}

pub struct LocalPickerState {
    dir: PathBuf,
    entries: Vec<Entry>,
    list: ListState,
    error: Option<String>,
}

impl LocalPickerState {
    pub fn new(start: PathBuf) -> Self {
        let mut state = Self {
            dir: start,
            entries: Vec::new(),
            list: ListState::default(),
            error: None,
        };
        state.reload();
        state
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn reload(&mut self) {
        self.entries.clear();
        self.error = None;
        if self.dir.parent().is_some() {
            self.entries.push(Entry {
                name: "..".to_string(),
                is_dir: true,
            });
        }
        match read_entries(&self.dir) {
            Ok(entries) => self.entries.extend(entries),
            Err(e) => {
                warn!("Cannot read {}: {}", self.dir.display(), e);
                self.error = Some(format!("Cannot read directory: {e}"));
            }
        }
        self.list.select(Some(0));
    }

    fn enter(&mut self, dir: PathBuf) {
        self.dir = dir;
        self.reload();
    }

    fn up(&mut self) {
        if let Some(parent) = self.dir.parent() {
            let parent = parent.to_path_buf();
            self.enter(parent);
        }
    }

    pub fn handle_event(&mut self, event: &TuiEvent) -> ModalOutput {
        let len = self.entries.len();
        match event {
            TuiEvent::Escape => cancelled(),
            TuiEvent::Backspace => {
                self.up();
                ModalOutput::Stay
            }
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
            TuiEvent::Submit => {
                let Some(entry) = self.list.selected().and_then(|i| self.entries.get(i)) else {
                    return ModalOutput::Stay;
                };
                if entry.name == ".." {
                    self.up();
                    return ModalOutput::Stay;
                }
                let path = self.dir.join(&entry.name);
                if entry.is_dir {
                    self.enter(path);
                    ModalOutput::Stay
                } else if is_markdown(&path) {
                    confirmed(Step::UploadLocal(path))
                } else {
                    ModalOutput::Request(Action::Notify(
                        NoticeLevel::Warning,
                        "Only .md/.markdown files can be uploaded".to_string(),
                    ))
                }
            }
            _ => ModalOutput::Stay,
        }
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect) {
        let area = centered_rect(70, 70, area);
        let inner = frame_modal(
            frame,
            area,
            "Upload markdown file",
            "Enter open/upload  Backspace up  Esc cancel",
        );
        let [path, list] = Layout::vertical([Constraint::Length(2), Constraint::Min(1)]).areas(inner);

        let shown = self.dir.display().to_string();
        let mut header = vec![Line::from(Span::styled(
            truncate(&shown, usize::from(path.width)),
            Style::default().fg(Color::Yellow),
        ))];
        if let Some(error) = &self.error {
            header.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        }
        frame.render_widget(Paragraph::new(header), path);

        let items: Vec<ListItem> = self
            .entries
            .iter()
            .map(|e| {
                if e.is_dir {
                    ListItem::new(Span::styled(
                        format!("{}/", e.name),
                        Style::default().fg(Color::Blue),
                    ))
                } else if is_markdown(Path::new(&e.name)) {
                    ListItem::new(e.name.clone())
                } else {
                    ListItem::new(Span::styled(
                        e.name.clone(),
                        Style::default().fg(Color::DarkGray),
                    ))
                }
            })
            .collect();
        let widget = List::new(items)
            .highlight_style(highlight())
            .highlight_symbol("▶ ");
        frame.render_stateful_widget(widget, list, &mut self.list);
    }
}

fn read_entries(dir: &Path) -> std::io::Result<Vec<Entry>> {
    let mut entries = Vec::new();
    for item in fs::read_dir(dir)? {
        let item = item?;
        // follows symlinks so a linked directory opens like a directory
        let is_dir = fs::metadata(item.path()).map(|m| m.is_dir()).unwrap_or(false);
        entries.push(Entry {
            name: item.file_name().to_string_lossy().into_owned(),
            is_dir,
        });
    }
    entries.sort_by(|a, b| {
        b.is_dir
            .cmp(&a.is_dir)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
    Ok(entries)
}
