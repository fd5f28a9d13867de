//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! and translates keyboard events into core::Action values.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Event Flow
//!
//! ```text
//! key ─► handle_event ─► Action ─┐
//!                                ├─► process ─► update() ─► Effect
//! job result (channel) ──────────┘                  │
//!                                                   ├─ Spawn   → Dispatcher
//!                                                   ├─ modal feed (versions, ssh listing)
//!                                                   └─ Quit
//! ```
//!
//! ## Redraw Strategy
//!
//! - **Busy** (jobs in flight): draws every ~80ms so the spinner moves.
//! - **Idle**: sleeps up to 250ms and only redraws on input, on a finished
//!   job, or when the status notice expires.
//!
//! A `SteadyBlock` cursor style is used instead of a blinking cursor because
//! ratatui's `set_cursor_position` resets the terminal's blink timer on every
//! `draw()` call, making blinking cursors appear erratic during continuous redraws.

mod component;
mod components;
mod dispatch;
mod editor;
mod event;
pub mod markdown;
mod modals;
mod ui;

use std::collections::VecDeque;
use std::io::stdout;
use std::path::PathBuf;
use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use log::{debug, info, warn};

use crate::core::action::{Action, Effect, Step, update};
use crate::core::config::ResolvedConfig;
use crate::core::state::{App, NoticeLevel, Screen, Section, Ticket};
use crate::core::workflow::{self, Decision};
use crate::remote::{Backend, RemoteClient};
use crate::tui::component::EventHandler;
use crate::tui::components::sidebar::section_for_key;
use crate::tui::components::{
    DocumentViewState, LoginState, SearchState, TableCursor, audit, documents, folders, settings,
    users,
};
use crate::tui::dispatch::Dispatcher;
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};
use crate::tui::modals::{LocalPickerState, Modal, ModalOutput, SshBrowserState, VersionsState};

/// What a view asks for after handling a key.
pub enum Command {
    Core(Action),
    Open(Modal),
    /// Open the local file picker at the configured start directory.
    PickLocalFile,
    /// Open the SSH browser.
    BrowseSsh,
}

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub login: LoginState,
    // One selection per table section
    pub documents: TableCursor,
    pub folders: TableCursor,
    pub users: TableCursor,
    pub settings: TableCursor,
    pub audit: TableCursor,
    pub search: SearchState,
    pub document_view: DocumentViewState,
    /// At most one modal at a time (None = hidden)
    pub modal: Option<Modal>,
    /// A modal asked for `$EDITOR`; run between frames.
    pub editor_requested: bool,
    start_dir: PathBuf,
    editor: String,
}

impl TuiState {
    pub fn new(server_url: &str, start_dir: PathBuf, editor: String) -> Self {
        Self {
            login: LoginState::new(server_url),
            documents: TableCursor::default(),
            folders: TableCursor::default(),
            users: TableCursor::default(),
            settings: TableCursor::default(),
            audit: TableCursor::default(),
            search: SearchState::default(),
            document_view: DocumentViewState::default(),
            modal: None,
            editor_requested: false,
            start_dir,
            editor,
        }
    }

    fn open(&mut self, command: Command) -> Option<Action> {
        let modal = match command {
            Command::Core(action) => return Some(action),
            Command::Open(modal) => modal,
            Command::PickLocalFile => {
                Modal::LocalPicker(LocalPickerState::new(self.start_dir.clone()))
            }
            Command::BrowseSsh => {
                let user = std::env::var("USER").unwrap_or_default();
                Modal::SshBrowser(SshBrowserState::new(&user))
            }
        };
        self.modal = Some(modal);
        None
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Kitty keyboard protocol is requested unconditionally; terminals
        // without it ignore the sequence
        execute!(
            stdout(),
            EnableBracketedPaste,
            Show,                        // Show cursor for input editing
            SetCursorStyle::SteadyBlock, // Non-blinking: avoids blink timer reset from continuous redraws
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (bracketed paste, steady block cursor, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableBracketedPaste,
            Hide // Hide cursor on exit
        );
    }
}

pub fn run(config: ResolvedConfig) -> std::io::Result<()> {
    let backend: Arc<dyn Backend> = Arc::new(RemoteClient::new(config.client_config()));
    let mut app = App::new(config.base_url.clone(), config.page_size);
    let mut tui = TuiState::new(&app.server_url, config.start_dir.clone(), config.editor.clone());

    let mut terminal = ratatui::init();
    let mut mode_guard = TerminalModeGuard::new().ok();

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();
    let dispatcher = Dispatcher::new(backend, tx);
    let mut spawn = |ticket: Ticket| dispatcher.spawn(ticket);

    let start_time = Instant::now();
    let mut needs_redraw = true; // Force first frame
    let mut notice_shown = false;

    'main: loop {
        let busy = app.is_busy();
        let shown = app.visible_notice(Instant::now()).is_some();
        if busy || shown != notice_shown {
            needs_redraw = true;
        }

        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 12.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, spinner_frame))?;
            notice_shown = shown;
            needs_redraw = false;
        }

        let timeout = if busy {
            Duration::from_millis(80)
        } else {
            Duration::from_millis(250)
        };
        let first_event = poll_event_timeout(timeout);
        if first_event.is_some() {
            needs_redraw = true;
        }

        // Process first event + drain ALL pending events before next draw
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            if let Some(action) = handle_event(&mut tui, &app, event)
                && process(&mut app, &mut tui, action, &mut spawn)
            {
                break 'main;
            }
        }

        if tui.editor_requested {
            tui.editor_requested = false;
            if let Some(Modal::EditDocument(form)) = tui.modal.as_mut() {
                mode_guard.take();
                ratatui::restore();
                let result = editor::edit_text(&tui.editor, form.content());
                terminal = ratatui::init();
                mode_guard = TerminalModeGuard::new().ok();
                match result {
                    Ok(text) => form.set_content(text),
                    Err(e) => {
                        warn!("Editor round-trip failed: {}", e);
                        app.notify(NoticeLevel::Error, e.to_string());
                    }
                }
                needs_redraw = true;
            }
        }

        // Handle background job results
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            if process(&mut app, &mut tui, action, &mut spawn) {
                break 'main;
            }
        }
    }

    drop(mode_guard);
    ratatui::restore();
    Ok(())
}

/// Turns one terminal event into at most one core action. Keys that only
/// move presentation state (focus, selection, scroll) are handled here.
fn handle_event(tui: &mut TuiState, app: &App, event: TuiEvent) -> Option<Action> {
    match event {
        TuiEvent::ForceQuit => return Some(Action::Quit),
        TuiEvent::Resize => return None,
        _ => {}
    }

    if app.screen == Screen::LoggedOut {
        return tui.login.handle_event(&event).map(Action::Login);
    }

    if let Some(modal) = tui.modal.as_mut() {
        return match modal.handle_event(&event) {
            ModalOutput::Stay => None,
            ModalOutput::Close(action) => {
                tui.modal = None;
                action
            }
            ModalOutput::Request(action) => Some(action),
            ModalOutput::Replace(next) => {
                tui.modal = Some(next);
                None
            }
            ModalOutput::LaunchEditor => {
                tui.editor_requested = true;
                None
            }
        };
    }

    // The search box swallows plain characters while it has focus
    let typing = app.section == Section::Search && tui.search.is_typing();
    match event {
        TuiEvent::Escape => return Some(Action::Back),
        TuiEvent::InputChar('q') if !typing => return Some(Action::Quit),
        TuiEvent::InputChar(c) if !typing => {
            if let Some(section) = section_for_key(c) {
                if section == Section::Search {
                    tui.search.reset();
                }
                return Some(Action::SwitchSection(section));
            }
        }
        _ => {}
    }

    let command = if app.shown_document().is_some() {
        tui.document_view.handle_event(&event, app)
    } else {
        match app.section {
            Section::Documents => documents::handle_event(&mut tui.documents, &event, app),
            Section::Search => tui.search.handle_event(&event, app),
            Section::Folders => folders::handle_event(&mut tui.folders, &event, app),
            Section::Users => users::handle_event(&mut tui.users, &event, app),
            Section::Settings => settings::handle_event(&mut tui.settings, &event, app),
            Section::Audit => audit::handle_event(&mut tui.audit, &event, app),
        }
    };
    tui.open(command?)
}

/// Applies `action` and every follow-up it causes. Returns true to quit.
fn process(
    app: &mut App,
    tui: &mut TuiState,
    action: Action,
    spawn: &mut dyn FnMut(Ticket),
) -> bool {
    let mut queue = VecDeque::from([action]);
    while let Some(action) = queue.pop_front() {
        debug!("Applying action: {}", action.label());
        let was_logged_in = app.screen == Screen::LoggedIn;
        let effect = update(app, action);
        if was_logged_in && app.screen == Screen::LoggedOut {
            info!("Session ended, back to login");
            tui.modal = None;
            tui.login.reset_password();
        }
        match effect {
            Effect::None => {}
            Effect::Quit => return true,
            Effect::Spawn(ticket) => spawn(ticket),
            Effect::ShowVersions {
                document_id,
                versions,
            } => {
                if tui.modal.is_none() {
                    tui.modal = Some(Modal::Versions(VersionsState::new(document_id, versions)));
                }
            }
            Effect::RemoteListing {
                target,
                path,
                entries,
            } => {
                if let Some(Modal::SshBrowser(browser)) = tui.modal.as_mut() {
                    browser.show_listing(target, path, entries);
                }
            }
            Effect::RemoteFileReady(path) => match tui.modal.as_ref() {
                Some(Modal::SshBrowser(browser)) if browser.is_downloading() => {
                    tui.modal = None;
                    queue.push_back(Action::Resolve(Decision::Confirmed(Step::UploadRemote(
                        path,
                    ))));
                }
                _ => {
                    info!("Download no longer wanted, removing {}", path.display());
                    workflow::remove_temp_file(&path);
                }
            },
            Effect::RemoteFailed(message) => {
                if let Some(Modal::SshBrowser(browser)) = tui.modal.as_mut() {
                    browser.fail(message);
                }
            }
        }
    }
    false
}
