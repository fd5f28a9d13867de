//! # Application State
//!
//! Core business state for mdbrowse. This module contains domain logic only -
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── screen: Screen                 // logged out / logged in
//! ├── section: Section               // sidebar selection
//! ├── view: View                     // list or document detail
//! ├── server_url, user, login_error  // session as the UI sees it
//! ├── documents / search / folders / users / audit: ListCache<T>
//! ├── settings: Option<Settings>     // + settings_seq
//! ├── detail: Option<Document>       // + detail_seq, awaiting_detail
//! ├── vocabulary: Vocabulary         // category/tag hints
//! ├── notice: Option<Notice>         // transient status bar message
//! └── in_flight, next_seq            // job bookkeeping
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.
//! This keeps things predictable, so no surprise mutations.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::core::workflow::{Job, Vocabulary};
use crate::remote::{
    AuditEntry, AuditQuery, CurrentUser, Document, DocumentQuery, DocumentSummary, Folder, Keyed,
    SearchHit, Settings, User,
};

/// How long a notice stays in the status bar.
pub const NOTICE_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    LoggedOut,
    LoggedIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Documents,
    Search,
    Folders,
    Users,
    Settings,
    Audit,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Documents,
        Section::Search,
        Section::Folders,
        Section::Users,
        Section::Settings,
        Section::Audit,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Section::Documents => "Documents",
            Section::Search => "Search",
            Section::Folders => "Folders",
            Section::Users => "Users",
            Section::Settings => "Settings",
            Section::Audit => "Audit Log",
        }
    }

    /// Zero-based position in the sidebar.
    pub fn index(self) -> usize {
        Section::ALL.iter().position(|s| *s == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Option<Section> {
        Section::ALL.get(index).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    List,
    Detail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
    pub at: Instant,
}

/// The most recent fetch of one list, in backend order, with a key index.
///
/// Replaced wholesale on every refresh; `seq` is the sequence number of the
/// job that produced it, so an older completion never overwrites a newer one.
#[derive(Debug, Clone)]
pub struct ListCache<T> {
    items: Vec<T>,
    index: HashMap<String, usize>,
    seq: u64,
    loaded: bool,
}

impl<T> Default for ListCache<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
            seq: 0,
            loaded: false,
        }
    }
}

impl<T: Keyed> ListCache<T> {
    /// Replaces the contents unless `seq` is older than what is cached.
    /// Returns whether the new items were taken.
    pub fn replace(&mut self, items: Vec<T>, seq: u64) -> bool {
        if seq < self.seq {
            return false;
        }
        self.index = items
            .iter()
            .enumerate()
            .map(|(i, item)| (item.key().to_string(), i))
            .collect();
        self.items = items;
        self.seq = seq;
        self.loaded = true;
        true
    }

    /// Empties the cache and refuses any fetch issued before `seq`.
    pub fn clear(&mut self, seq: u64) {
        self.items.clear();
        self.index.clear();
        self.seq = self.seq.max(seq);
        self.loaded = false;
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn get(&self, key: &str) -> Option<&T> {
        self.index.get(key).and_then(|&i| self.items.get(i))
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }
}

/// A job stamped with its sequence number, ready for the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticket {
    pub seq: u64,
    pub job: Job,
}

pub struct App {
    pub screen: Screen,
    pub section: Section,
    pub view: View,
    /// Server address shown on the login form.
    pub server_url: String,
    pub user: Option<CurrentUser>,
    pub login_error: Option<String>,
    pub pending_login: Option<u64>,
    pub page_size: u32,

    pub documents: ListCache<DocumentSummary>,
    pub documents_query: DocumentQuery,
    pub documents_total: Option<u64>,
    pub search: ListCache<SearchHit>,
    pub search_query: String,
    pub folders: ListCache<Folder>,
    pub users: ListCache<User>,
    pub audit: ListCache<AuditEntry>,
    pub audit_query: AuditQuery,
    pub audit_total: Option<u64>,
    pub settings: Option<Settings>,
    pub settings_seq: u64,

    pub detail: Option<Document>,
    pub detail_seq: u64,
    /// Sequence number of the open-document request the user is waiting on.
    pub awaiting_detail: Option<u64>,

    pub vocabulary: Vocabulary,
    pub notice: Option<Notice>,
    pub in_flight: usize,
    next_seq: u64,
}

impl App {
    pub fn new(server_url: String, page_size: u32) -> Self {
        Self {
            screen: Screen::LoggedOut,
            section: Section::Documents,
            view: View::List,
            server_url,
            user: None,
            login_error: None,
            pending_login: None,
            page_size,
            documents: ListCache::default(),
            documents_query: DocumentQuery {
                page_size,
                ..Default::default()
            },
            documents_total: None,
            search: ListCache::default(),
            search_query: String::new(),
            folders: ListCache::default(),
            users: ListCache::default(),
            audit: ListCache::default(),
            audit_query: AuditQuery {
                page_size,
                ..Default::default()
            },
            audit_total: None,
            settings: None,
            settings_seq: 0,
            detail: None,
            detail_seq: 0,
            awaiting_detail: None,
            vocabulary: Vocabulary::default(),
            notice: None,
            in_flight: 0,
            next_seq: 0,
        }
    }

    /// Stamps `job` with the next sequence number.
    pub fn issue(&mut self, job: Job) -> Ticket {
        self.next_seq += 1;
        self.in_flight += 1;
        Ticket {
            seq: self.next_seq,
            job,
        }
    }

    /// Sequence number of the most recently issued job.
    pub fn latest_seq(&self) -> u64 {
        self.next_seq
    }

    pub fn notify(&mut self, level: NoticeLevel, text: impl Into<String>) {
        self.notice = Some(Notice {
            level,
            text: text.into(),
            at: Instant::now(),
        });
    }

    /// The notice to display at `now`, if it hasn't expired.
    pub fn visible_notice(&self, now: Instant) -> Option<&Notice> {
        self.notice
            .as_ref()
            .filter(|n| now.saturating_duration_since(n.at) < NOTICE_TTL)
    }

    /// The document currently on screen, if the detail view is showing.
    pub fn shown_document(&self) -> Option<&Document> {
        match (self.section, self.view) {
            (Section::Documents, View::Detail) => self.detail.as_ref(),
            _ => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    pub fn folder_name(&self, id: Option<&str>) -> String {
        id.and_then(|id| self.folders.get(id))
            .map(|f| f.name.clone())
            .unwrap_or_else(|| "(root)".to_string())
    }
}
