//! # Actions
//!
//! Everything that can happen in mdbrowse becomes an `Action`.
//! User presses Enter on a document? That's `Action::OpenDocument(id)`.
//! A background job finishes? That's `Action::Completed { .. }`.
//!
//! The `update()` function takes the current state and an action, mutates
//! the state, and returns an [`Effect`] for the TUI to carry out. No I/O
//! happens here; remote work is described as a [`Job`] and handed back
//! inside `Effect::Spawn`.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```
//!
//! This makes everything testable: `assert_eq!(update(&mut app, action), expected)`.

use std::path::PathBuf;

use log::{debug, info, warn};
use serde_json::{Map, Value};

use crate::core::state::{App, NoticeLevel, Screen, Section, Ticket, View};
use crate::core::workflow::{Completion, Decision, Job, Outcome, Slot};
use crate::remote::{
    AuditQuery, Document, DocumentQuery, DocumentUpdate, NewFolder, NewUser, RemoteEntry,
    RemoteError, RemoteTarget, Settings, UploadMeta, UserChange, Version, is_markdown,
};

/// Credentials from the login form. The password never reaches a log line.
#[derive(Clone, PartialEq)]
pub struct LoginForm {
    pub server_url: String,
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("server_url", &self.server_url)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// A confirmed modal result, ready to become a mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    DeleteDocument(String),
    EditDocument { id: String, update: DocumentUpdate },
    Rollback { id: String, version: i64 },
    UploadLocal(PathBuf),
    /// A file already copied from a remote host; removed after upload.
    UploadRemote(PathBuf),
    CreateFolder(NewFolder),
    RenameFolder { id: String, name: String },
    DeleteFolder(String),
    CreateUser(NewUser),
    UpdateUser { username: String, change: UserChange },
    DeleteUser(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Login(LoginForm),
    SwitchSection(Section),
    /// Esc: detail → list, other sections → documents.
    Back,
    Refresh,
    OpenDocument(String),
    OpenSearchHit(String),
    NextPage,
    PrevPage,
    Search(String),
    ShowVersions,
    ToggleRegistration,
    Resolve(Decision<Step>),
    BrowseRemote {
        target: RemoteTarget,
        path: String,
    },
    FetchRemote {
        target: RemoteTarget,
        path: String,
    },
    Completed {
        seq: u64,
        slot: Slot,
        result: Result<Completion, RemoteError>,
    },
    Notify(NoticeLevel, String),
    Quit,
}

impl Action {
    /// Variant name for logging. Actions carry credentials, so they are
    /// never logged with `{:?}`.
    pub fn label(&self) -> &'static str {
        match self {
            Action::Login(_) => "Login",
            Action::SwitchSection(_) => "SwitchSection",
            Action::Back => "Back",
            Action::Refresh => "Refresh",
            Action::OpenDocument(_) => "OpenDocument",
            Action::OpenSearchHit(_) => "OpenSearchHit",
            Action::NextPage => "NextPage",
            Action::PrevPage => "PrevPage",
            Action::Search(_) => "Search",
            Action::ShowVersions => "ShowVersions",
            Action::ToggleRegistration => "ToggleRegistration",
            Action::Resolve(_) => "Resolve",
            Action::BrowseRemote { .. } => "BrowseRemote",
            Action::FetchRemote { .. } => "FetchRemote",
            Action::Completed { .. } => "Completed",
            Action::Notify(..) => "Notify",
            Action::Quit => "Quit",
        }
    }
}

/// Side effects requested by `update()`, carried out by the TUI loop.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    Quit,
    Spawn(Ticket),
    ShowVersions {
        document_id: String,
        versions: Vec<Version>,
    },
    RemoteListing {
        target: RemoteTarget,
        path: String,
        entries: Vec<RemoteEntry>,
    },
    RemoteFileReady(PathBuf),
    RemoteFailed(String),
}

pub fn update(app: &mut App, action: Action) -> Effect {
    match action {
        Action::Quit => Effect::Quit,
        Action::Notify(level, text) => {
            app.notify(level, text);
            Effect::None
        }
        Action::Login(form) => login(app, form),
        Action::Completed { seq, slot, result } => complete(app, seq, slot, result),
        _ if app.screen == Screen::LoggedOut => Effect::None,
        Action::SwitchSection(section) => switch_section(app, section),
        Action::Back => back(app),
        Action::Refresh => refresh(app),
        Action::OpenDocument(id) => open_document(app, id),
        Action::OpenSearchHit(id) => {
            app.section = Section::Documents;
            app.view = View::List;
            open_document(app, id)
        }
        Action::NextPage => turn_page(app, 1),
        Action::PrevPage => turn_page(app, -1),
        Action::Search(text) => {
            let query = text.trim().to_string();
            if query.is_empty() {
                return Effect::None;
            }
            spawn(
                app,
                Job::Search {
                    query,
                    page: 1,
                    page_size: app.page_size,
                },
            )
        }
        Action::ShowVersions => match app.shown_document() {
            Some(doc) => {
                let id = doc.id.clone();
                spawn(app, Job::LoadVersions(id))
            }
            None => Effect::None,
        },
        Action::ToggleRegistration => toggle_registration(app),
        Action::Resolve(Decision::Cancelled) => {
            debug!("Modal cancelled, nothing sent");
            Effect::None
        }
        Action::Resolve(Decision::Confirmed(step)) => confirm(app, step),
        Action::BrowseRemote { target, path } => {
            if target.host.trim().is_empty() {
                app.notify(NoticeLevel::Warning, "Hostname required");
                return Effect::RemoteFailed("Hostname required".to_string());
            }
            let path = if path.trim().is_empty() {
                "/".to_string()
            } else {
                path
            };
            spawn(app, Job::ListRemote { target, path })
        }
        Action::FetchRemote { target, path } => {
            if !is_markdown(std::path::Path::new(&path)) {
                app.notify(NoticeLevel::Warning, "Only .md/.markdown files can be uploaded");
                return Effect::None;
            }
            spawn(app, Job::DownloadRemote { target, path })
        }
    }
}

fn spawn(app: &mut App, job: Job) -> Effect {
    let ticket = app.issue(job);
    info!("Issuing job #{}: {}", ticket.seq, ticket.job.label());
    Effect::Spawn(ticket)
}

fn login(app: &mut App, form: LoginForm) -> Effect {
    if app.screen == Screen::LoggedIn || app.pending_login.is_some() {
        return Effect::None;
    }
    let username = form.username.trim().to_string();
    if username.is_empty() || form.password.is_empty() {
        app.login_error = Some("Username and password are required".to_string());
        return Effect::None;
    }
    let server_url = form.server_url.trim();
    if !server_url.is_empty() {
        app.server_url = server_url.trim_end_matches('/').to_string();
    }
    app.login_error = None;
    let job = Job::Login {
        base_url: app.server_url.clone(),
        username,
        password: form.password,
    };
    let effect = spawn(app, job);
    if let Effect::Spawn(ticket) = &effect {
        app.pending_login = Some(ticket.seq);
    }
    effect
}

fn switch_section(app: &mut App, section: Section) -> Effect {
    app.section = section;
    app.view = View::List;
    app.detail = None;
    app.awaiting_detail = None;
    if section == Section::Search {
        app.search.clear(app.latest_seq());
        app.search_query.clear();
    }
    load_section(app)
}

fn load_section(app: &mut App) -> Effect {
    let job = match app.section {
        Section::Documents => Job::LoadDocuments(app.documents_query.clone()),
        Section::Search => return Effect::None,
        Section::Folders => Job::LoadFolders,
        Section::Users => Job::LoadUsers,
        Section::Settings => Job::LoadSettings,
        Section::Audit => Job::LoadAudit(app.audit_query.clone()),
    };
    spawn(app, job)
}

fn back(app: &mut App) -> Effect {
    if app.view == View::Detail {
        app.view = View::List;
        app.awaiting_detail = None;
        Effect::None
    } else if app.section != Section::Documents {
        switch_section(app, Section::Documents)
    } else {
        app.awaiting_detail = None;
        Effect::None
    }
}

fn refresh(app: &mut App) -> Effect {
    if let Some(doc) = app.shown_document() {
        let id = doc.id.clone();
        return spawn(app, Job::OpenDocument(id));
    }
    if app.section == Section::Search {
        if app.search_query.is_empty() {
            return Effect::None;
        }
        let job = Job::Search {
            query: app.search_query.clone(),
            page: 1,
            page_size: app.page_size,
        };
        return spawn(app, job);
    }
    load_section(app)
}

fn open_document(app: &mut App, id: String) -> Effect {
    if app.section != Section::Documents || id.is_empty() {
        return Effect::None;
    }
    let effect = spawn(app, Job::OpenDocument(id));
    if let Effect::Spawn(ticket) = &effect {
        app.awaiting_detail = Some(ticket.seq);
    }
    effect
}

/// Whether another page exists after `page`, using the backend total when
/// it was sent and a full page as the hint otherwise.
fn has_next_page(page: u32, page_size: u32, shown: usize, total: Option<u64>) -> bool {
    match total {
        Some(total) => u64::from(page) * u64::from(page_size) < total,
        None => shown >= page_size as usize,
    }
}

fn turn_page(app: &mut App, delta: i32) -> Effect {
    if app.view == View::Detail {
        return Effect::None;
    }
    match app.section {
        Section::Documents => {
            let mut query = app.documents_query.clone();
            if delta > 0 {
                if !has_next_page(query.page, query.page_size, app.documents.len(), app.documents_total) {
                    return Effect::None;
                }
                query.page += 1;
            } else {
                if query.page <= 1 {
                    return Effect::None;
                }
                query.page -= 1;
            }
            spawn(app, Job::LoadDocuments(query))
        }
        Section::Audit => {
            let mut query: AuditQuery = app.audit_query.clone();
            if delta > 0 {
                if !has_next_page(query.page, query.page_size, app.audit.len(), app.audit_total) {
                    return Effect::None;
                }
                query.page += 1;
            } else {
                if query.page <= 1 {
                    return Effect::None;
                }
                query.page -= 1;
            }
            spawn(app, Job::LoadAudit(query))
        }
        _ => Effect::None,
    }
}

fn toggle_registration(app: &mut App) -> Effect {
    if app.section != Section::Settings {
        return Effect::None;
    }
    let Some(settings) = &app.settings else {
        app.notify(NoticeLevel::Warning, "Settings not loaded yet");
        return Effect::None;
    };
    let mut changes = Map::new();
    changes.insert(
        "registration_enabled".to_string(),
        Value::Bool(!settings.registration_enabled()),
    );
    spawn(app, Job::UpdateSettings(Settings(changes)))
}

/// Turns a confirmed modal step into a job, rejecting invalid input locally.
fn confirm(app: &mut App, step: Step) -> Effect {
    let documents_query = app.documents_query.clone();
    let job = match step {
        Step::DeleteDocument(id) => Job::DeleteDocument {
            id,
            query: documents_query,
        },
        Step::EditDocument { id, update } => {
            if update.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
                return reject(app, "Title required");
            }
            Job::UpdateDocument {
                id,
                update,
                query: documents_query,
            }
        }
        Step::Rollback { id, version } => Job::Rollback {
            id,
            version,
            note: String::new(),
            query: documents_query,
        },
        Step::UploadLocal(path) => {
            if !is_markdown(&path) {
                return reject(app, "Only .md/.markdown files can be uploaded");
            }
            Job::Upload {
                path,
                meta: UploadMeta::default(),
                cleanup: false,
                query: documents_query,
            }
        }
        Step::UploadRemote(path) => Job::Upload {
            path,
            meta: UploadMeta::default(),
            cleanup: true,
            query: documents_query,
        },
        Step::CreateFolder(folder) => {
            let name = folder.name.trim().to_string();
            if name.is_empty() {
                return reject(app, "Folder name required");
            }
            Job::CreateFolder(NewFolder {
                name,
                parent_id: folder.parent_id,
            })
        }
        Step::RenameFolder { id, name } => {
            let name = name.trim().to_string();
            if name.is_empty() {
                return reject(app, "Folder name required");
            }
            Job::RenameFolder { id, name }
        }
        Step::DeleteFolder(id) => Job::DeleteFolder(id),
        Step::CreateUser(user) => {
            let username = user.username.trim().to_string();
            if username.is_empty() || user.password.is_empty() {
                return reject(app, "Username and password required");
            }
            Job::CreateUser(NewUser { username, ..user })
        }
        Step::UpdateUser { username, change } => {
            if matches!(&change, UserChange::Password(p) if p.is_empty()) {
                return reject(app, "Password required");
            }
            Job::UpdateUser { username, change }
        }
        Step::DeleteUser(username) => Job::DeleteUser(username),
    };
    spawn(app, job)
}

fn reject(app: &mut App, message: &str) -> Effect {
    warn!("Rejected locally: {}", message);
    app.notify(NoticeLevel::Warning, message);
    Effect::None
}

fn complete(
    app: &mut App,
    seq: u64,
    slot: Slot,
    result: Result<Completion, RemoteError>,
) -> Effect {
    app.in_flight = app.in_flight.saturating_sub(1);
    match result {
        Ok(Completion { notice, outcome }) => {
            debug!("Job #{} completed ({:?})", seq, slot);
            if let Some(notice) = notice {
                app.notify(NoticeLevel::Info, notice);
            }
            apply(app, seq, outcome)
        }
        Err(err) => {
            warn!("Job #{} failed ({:?}): {}", seq, slot, err);
            fail(app, seq, slot, err)
        }
    }
}

fn fail(app: &mut App, seq: u64, slot: Slot, err: RemoteError) -> Effect {
    if slot != Slot::Session && app.screen == Screen::LoggedIn && session_expired(&err) {
        warn!("Session rejected by backend, returning to login");
        app.screen = Screen::LoggedOut;
        app.user = None;
        app.view = View::List;
        app.detail = None;
        app.awaiting_detail = None;
        app.login_error = Some(format!("Session expired: {err}"));
        return if slot == Slot::RemoteBrowser {
            Effect::RemoteFailed(err.to_string())
        } else {
            Effect::None
        };
    }
    match slot {
        Slot::Session => {
            if app.pending_login == Some(seq) {
                app.pending_login = None;
                app.login_error = Some(if err.is_auth_failure() {
                    err.to_string()
                } else {
                    format!("Login failed: {err}")
                });
            }
            Effect::None
        }
        Slot::RemoteBrowser => {
            app.notify(NoticeLevel::Error, err.to_string());
            Effect::RemoteFailed(err.to_string())
        }
        Slot::Detail => {
            if app.awaiting_detail == Some(seq) {
                app.awaiting_detail = None;
            }
            app.notify(NoticeLevel::Error, err.to_string());
            Effect::None
        }
        _ => {
            app.notify(NoticeLevel::Error, err.to_string());
            Effect::None
        }
    }
}

/// 401 or a missing token; a 403 is a permission problem and stays a notice.
fn session_expired(err: &RemoteError) -> bool {
    matches!(
        err,
        RemoteError::Unauthenticated | RemoteError::Api { status: 401, .. }
    )
}

fn apply(app: &mut App, seq: u64, outcome: Outcome) -> Effect {
    match outcome {
        Outcome::LoggedIn { user, vocabulary } => {
            if app.pending_login != Some(seq) {
                return Effect::None;
            }
            info!("Session established for {}", user.username);
            app.pending_login = None;
            app.login_error = None;
            app.user = Some(user);
            app.vocabulary = vocabulary;
            app.screen = Screen::LoggedIn;
            app.section = Section::Documents;
            app.view = View::List;
            load_section(app)
        }
        Outcome::Documents { query, page } => {
            apply_documents(app, seq, query, page);
            Effect::None
        }
        Outcome::Document(document) => {
            apply_detail(app, seq, document);
            Effect::None
        }
        Outcome::DocumentChanged {
            document,
            query,
            documents,
        } => {
            apply_documents(app, seq, query, documents);
            apply_detail(app, seq, document);
            Effect::None
        }
        Outcome::DocumentDeleted {
            id,
            query,
            documents,
        } => {
            apply_documents(app, seq, query, documents);
            if app.detail.as_ref().is_some_and(|d| d.id == id) {
                app.detail = None;
                app.view = View::List;
            }
            Effect::None
        }
        Outcome::Versions {
            document_id,
            versions,
        } => {
            if app.shown_document().is_some_and(|d| d.id == document_id) {
                Effect::ShowVersions {
                    document_id,
                    versions,
                }
            } else {
                debug!("Discarding versions for {}: no longer on screen", document_id);
                Effect::None
            }
        }
        Outcome::SearchResults { query, page } => {
            if app.section == Section::Search && app.search.replace(page.data, seq) {
                app.search_query = query;
            }
            Effect::None
        }
        Outcome::Folders(folders) => {
            app.folders.replace(folders, seq);
            Effect::None
        }
        Outcome::Users(users) => {
            app.users.replace(users, seq);
            Effect::None
        }
        Outcome::Settings(settings) => {
            if seq >= app.settings_seq {
                app.settings = Some(settings);
                app.settings_seq = seq;
            }
            Effect::None
        }
        Outcome::Audit { query, page } => {
            if app.audit.replace(page.data, seq) {
                app.audit_query = query;
                app.audit_total = page.total;
            }
            Effect::None
        }
        Outcome::RemoteListing {
            target,
            path,
            entries,
        } => Effect::RemoteListing {
            target,
            path,
            entries,
        },
        Outcome::RemoteDownloaded(path) => Effect::RemoteFileReady(path),
    }
}

fn apply_documents(
    app: &mut App,
    seq: u64,
    query: DocumentQuery,
    page: crate::remote::Page<crate::remote::DocumentSummary>,
) {
    let total = page.total;
    if app.documents.replace(page.data, seq) {
        app.documents_query = query;
        app.documents_total = total;
    } else {
        debug!("Discarding stale document list #{}", seq);
    }
}

/// A fetched document is shown if the user is waiting for exactly this
/// request, or if it refreshes the document already on screen.
fn apply_detail(app: &mut App, seq: u64, document: Document) {
    if app.awaiting_detail == Some(seq) {
        app.awaiting_detail = None;
        app.section = Section::Documents;
        app.view = View::Detail;
        app.detail = Some(document);
        app.detail_seq = seq;
    } else if seq >= app.detail_seq && app.shown_document().is_some_and(|d| d.id == document.id) {
        app.detail = Some(document);
        app.detail_seq = seq;
    } else {
        debug!("Discarding document {}: not on screen", document.id);
    }
}
