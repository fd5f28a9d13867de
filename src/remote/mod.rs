//! # Remote Session Facade
//!
//! Everything mdbrowse knows about the outside world: the md-browse HTTP
//! backend and remote hosts reached through `ssh`/`scp`.
//!
//! The facade is a value, not a global. `tui::run` builds one
//! [`RemoteClient`] and hands it to the dispatcher as `Arc<dyn Backend>`;
//! tests substitute a recording backend behind the same trait.
//!
//! ```text
//! update() ──Effect::Spawn──▶ Dispatcher ──tokio::spawn──▶ workflow::run(&dyn Backend)
//!                                                              │
//!                                       RemoteClient ◀─────────┘
//!                                       ├── reqwest (HTTP, bearer token)
//!                                       └── ssh / scp (tokio::process)
//! ```

pub mod client;
pub mod error;
pub mod ssh;
pub mod types;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;

pub use client::{ClientConfig, RemoteClient, is_markdown};
pub use error::RemoteError;
pub use ssh::{RemoteEntry, RemoteTarget, SshOptions};
pub use types::{
    AuditEntry, AuditQuery, CurrentUser, Document, DocumentQuery, DocumentSummary,
    DocumentUpdate, Folder, FolderUpdate, Keyed, NewFolder, NewUser, Page, Role, SearchHit,
    Settings, UploadMeta, User, UserChange, Version, parse_tags,
};

/// One async method per backend operation, plus the two remote-file helpers.
///
/// Mutations return the backend's raw JSON answer; callers never render it
/// and always re-fetch instead.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Server address requests are sent to, without a trailing slash.
    fn base_url(&self) -> String;

    /// Points the session at a different server. Only valid before login.
    fn set_base_url(&self, base_url: &str);

    /// Exchanges credentials for a bearer token and keeps it for the session.
    async fn login(&self, username: &str, password: &str) -> Result<(), RemoteError>;

    async fn current_user(&self) -> Result<CurrentUser, RemoteError>;

    async fn list_documents(
        &self,
        query: &DocumentQuery,
    ) -> Result<Page<DocumentSummary>, RemoteError>;

    async fn get_document(&self, id: &str) -> Result<Document, RemoteError>;

    /// Uploads a local markdown file. Non-markdown paths are rejected before
    /// any request is made.
    async fn upload_document(&self, path: &Path, meta: &UploadMeta)
    -> Result<Value, RemoteError>;

    async fn update_document(&self, id: &str, update: &DocumentUpdate)
    -> Result<Value, RemoteError>;

    async fn delete_document(&self, id: &str) -> Result<(), RemoteError>;

    async fn list_versions(&self, id: &str) -> Result<Vec<Version>, RemoteError>;

    async fn rollback(
        &self,
        id: &str,
        target_version: i64,
        change_note: &str,
    ) -> Result<Value, RemoteError>;

    async fn search(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Page<SearchHit>, RemoteError>;

    async fn list_folders(&self) -> Result<Vec<Folder>, RemoteError>;
    async fn create_folder(&self, folder: &NewFolder) -> Result<Value, RemoteError>;
    async fn update_folder(&self, id: &str, update: &FolderUpdate) -> Result<Value, RemoteError>;
    async fn delete_folder(&self, id: &str) -> Result<(), RemoteError>;

    async fn list_users(&self) -> Result<Vec<User>, RemoteError>;
    async fn create_user(&self, user: &NewUser) -> Result<Value, RemoteError>;
    async fn update_user(&self, username: &str, change: &UserChange) -> Result<Value, RemoteError>;
    async fn delete_user(&self, username: &str) -> Result<(), RemoteError>;

    async fn get_settings(&self) -> Result<Settings, RemoteError>;
    async fn update_settings(&self, changes: &Settings) -> Result<Value, RemoteError>;

    async fn list_audit_logs(&self, query: &AuditQuery) -> Result<Page<AuditEntry>, RemoteError>;

    async fn list_categories(&self) -> Result<Vec<String>, RemoteError>;
    async fn list_tags(&self) -> Result<Vec<String>, RemoteError>;

    async fn list_remote_directory(
        &self,
        target: &RemoteTarget,
        path: &str,
    ) -> Result<Vec<RemoteEntry>, RemoteError>;

    /// Copies a remote file to a local temporary path owned by the caller.
    async fn download_remote_file(
        &self,
        target: &RemoteTarget,
        path: &str,
    ) -> Result<PathBuf, RemoteError>;
}
