//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::core::state::App;
use crate::remote::{
    AuditEntry, AuditQuery, Backend, CurrentUser, Document, DocumentQuery, DocumentSummary,
    DocumentUpdate, Folder, FolderUpdate, NewFolder, NewUser, Page, RemoteEntry, RemoteError,
    RemoteTarget, SearchHit, Settings, UploadMeta, User, UserChange, Version,
};

/// An in-memory backend that records every call it receives.
///
/// Mutations change the stored data so a follow-up fetch sees them. Any
/// operation can be made to fail with [`RecordingBackend::fail`].
pub struct RecordingBackend {
    calls: Mutex<Vec<String>>,
    failures: Mutex<HashMap<String, RemoteError>>,
    base_url: Mutex<String>,
    pub documents: Mutex<Vec<DocumentSummary>>,
    pub folders: Mutex<Vec<Folder>>,
    pub users: Mutex<Vec<User>>,
    pub settings: Mutex<Settings>,
    pub remote_entries: Mutex<Vec<RemoteEntry>>,
    pub download_to: Mutex<Option<PathBuf>>,
}

fn summary(id: &str, title: &str) -> DocumentSummary {
    DocumentSummary {
        id: id.to_string(),
        title: title.to_string(),
        category: "guides".to_string(),
        tags: vec!["ops".to_string()],
        folder_id: None,
        updated_at: "2024-05-01T10:00:00Z".to_string(),
    }
}

impl RecordingBackend {
    pub fn new() -> Self {
        let settings: Settings = serde_json::from_value(json!({
            "registration_enabled": true,
            "site_name": "docs",
        }))
        .unwrap();
        Self {
            calls: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            base_url: Mutex::new("http://localhost:3001".to_string()),
            // deliberately not sorted by id: the client must keep backend order
            documents: Mutex::new(vec![
                summary("d2", "Runbook"),
                summary("d1", "Onboarding"),
                summary("d3", "Release notes"),
            ]),
            folders: Mutex::new(vec![Folder {
                id: "f1".to_string(),
                name: "Ops".to_string(),
                parent_id: None,
                created_at: "2024-01-01T00:00:00Z".to_string(),
            }]),
            users: Mutex::new(vec![User {
                username: "ada".to_string(),
                role: "admin".to_string(),
                created_at: "2024-01-01T00:00:00Z".to_string(),
            }]),
            settings: Mutex::new(settings),
            remote_entries: Mutex::new(Vec::new()),
            download_to: Mutex::new(None),
        }
    }

    /// Makes every later call to `op` fail with `err`.
    pub fn fail(&self, op: &str, err: RemoteError) {
        self.failures.lock().unwrap().insert(op.to_string(), err);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, op: &str, detail: Option<&str>) -> Result<(), RemoteError> {
        let entry = match detail {
            Some(detail) => format!("{op}:{detail}"),
            None => op.to_string(),
        };
        self.calls.lock().unwrap().push(entry);
        match self.failures.lock().unwrap().get(op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn document(&self, id: &str) -> Option<Document> {
        self.documents
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.id == id)
            .map(|d| Document {
                id: d.id.clone(),
                title: d.title.clone(),
                category: d.category.clone(),
                tags: d.tags.clone(),
                folder_id: d.folder_id.clone(),
                visibility: "team".to_string(),
                latest_version: Some(3),
                created_by: "ada".to_string(),
                created_at: "2024-01-01T00:00:00Z".to_string(),
                updated_at: d.updated_at.clone(),
                content_md: format!("# {}\n\nBody.", d.title),
            })
    }
}

fn not_found(what: &str) -> RemoteError {
    RemoteError::Api {
        status: 404,
        code: "not_found".to_string(),
        message: format!("{what} not found"),
        hint: None,
    }
}

#[async_trait]
impl Backend for RecordingBackend {
    fn base_url(&self) -> String {
        self.base_url.lock().unwrap().clone()
    }

    fn set_base_url(&self, base_url: &str) {
        if !base_url.trim().is_empty() {
            *self.base_url.lock().unwrap() = base_url.trim_end_matches('/').to_string();
        }
    }

    async fn login(&self, username: &str, _password: &str) -> Result<(), RemoteError> {
        self.record("login", Some(username))
    }

    async fn current_user(&self) -> Result<CurrentUser, RemoteError> {
        self.record("current_user", None)?;
        Ok(CurrentUser {
            username: "ada".to_string(),
            role: "admin".to_string(),
        })
    }

    async fn list_documents(
        &self,
        _query: &DocumentQuery,
    ) -> Result<Page<DocumentSummary>, RemoteError> {
        self.record("list_documents", None)?;
        Ok(Page::new(self.documents.lock().unwrap().clone()))
    }

    async fn get_document(&self, id: &str) -> Result<Document, RemoteError> {
        self.record("get_document", Some(id))?;
        self.document(id).ok_or_else(|| not_found("Document"))
    }

    async fn upload_document(
        &self,
        path: &Path,
        _meta: &UploadMeta,
    ) -> Result<Value, RemoteError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.record("upload_document", Some(&name))?;
        self.documents
            .lock()
            .unwrap()
            .insert(0, summary("new", &name));
        Ok(json!({ "id": "new" }))
    }

    async fn update_document(
        &self,
        id: &str,
        update: &DocumentUpdate,
    ) -> Result<Value, RemoteError> {
        self.record("update_document", Some(id))?;
        if let Some(doc) = self.documents.lock().unwrap().iter_mut().find(|d| d.id == id)
            && let Some(title) = &update.title
        {
            doc.title = title.clone();
        }
        Ok(Value::Null)
    }

    async fn delete_document(&self, id: &str) -> Result<(), RemoteError> {
        self.record("delete_document", Some(id))?;
        self.documents.lock().unwrap().retain(|d| d.id != id);
        Ok(())
    }

    async fn list_versions(&self, id: &str) -> Result<Vec<Version>, RemoteError> {
        self.record("list_versions", Some(id))?;
        Ok((1..=3)
            .map(|n| Version {
                version_number: n,
                created_by: "ada".to_string(),
                created_at: format!("2024-01-0{n}T00:00:00Z"),
                change_note: format!("v{n}"),
                checksum: format!("{n:0>64}"),
            })
            .collect())
    }

    async fn rollback(
        &self,
        id: &str,
        target_version: i64,
        _change_note: &str,
    ) -> Result<Value, RemoteError> {
        self.record("rollback", Some(&format!("{id}:{target_version}")))?;
        Ok(Value::Null)
    }

    async fn search(
        &self,
        query: &str,
        _page: u32,
        _page_size: u32,
    ) -> Result<Page<SearchHit>, RemoteError> {
        self.record("search", Some(query))?;
        let hits = self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.title.to_lowercase().contains(&query.to_lowercase()))
            .map(|d| SearchHit {
                id: d.id.clone(),
                title: d.title.clone(),
                category: d.category.clone(),
                snippet: format!("...{query}..."),
            })
            .collect();
        Ok(Page::new(hits))
    }

    async fn list_folders(&self) -> Result<Vec<Folder>, RemoteError> {
        self.record("list_folders", None)?;
        Ok(self.folders.lock().unwrap().clone())
    }

    async fn create_folder(&self, folder: &NewFolder) -> Result<Value, RemoteError> {
        self.record("create_folder", Some(&folder.name))?;
        let mut folders = self.folders.lock().unwrap();
        let id = format!("f{}", folders.len() + 1);
        folders.push(Folder {
            id: id.clone(),
            name: folder.name.clone(),
            parent_id: folder.parent_id.clone(),
            created_at: String::new(),
        });
        Ok(json!({ "id": id }))
    }

    async fn update_folder(&self, id: &str, update: &FolderUpdate) -> Result<Value, RemoteError> {
        self.record("update_folder", Some(id))?;
        if let Some(folder) = self.folders.lock().unwrap().iter_mut().find(|f| f.id == id)
            && let Some(name) = &update.name
        {
            folder.name = name.clone();
        }
        Ok(Value::Null)
    }

    async fn delete_folder(&self, id: &str) -> Result<(), RemoteError> {
        self.record("delete_folder", Some(id))?;
        self.folders.lock().unwrap().retain(|f| f.id != id);
        Ok(())
    }

    async fn list_users(&self) -> Result<Vec<User>, RemoteError> {
        self.record("list_users", None)?;
        Ok(self.users.lock().unwrap().clone())
    }

    async fn create_user(&self, user: &NewUser) -> Result<Value, RemoteError> {
        self.record("create_user", Some(&user.username))?;
        self.users.lock().unwrap().push(User {
            username: user.username.clone(),
            role: user.role.as_str().to_string(),
            created_at: String::new(),
        });
        Ok(Value::Null)
    }

    async fn update_user(&self, username: &str, change: &UserChange) -> Result<Value, RemoteError> {
        self.record("update_user", Some(username))?;
        if let UserChange::Role(role) = change
            && let Some(user) = self
                .users
                .lock()
                .unwrap()
                .iter_mut()
                .find(|u| u.username == username)
        {
            user.role = role.as_str().to_string();
        }
        Ok(Value::Null)
    }

    async fn delete_user(&self, username: &str) -> Result<(), RemoteError> {
        self.record("delete_user", Some(username))?;
        self.users.lock().unwrap().retain(|u| u.username != username);
        Ok(())
    }

    async fn get_settings(&self) -> Result<Settings, RemoteError> {
        self.record("get_settings", None)?;
        Ok(self.settings.lock().unwrap().clone())
    }

    async fn update_settings(&self, changes: &Settings) -> Result<Value, RemoteError> {
        self.record("update_settings", None)?;
        let mut settings = self.settings.lock().unwrap();
        for (key, value) in &changes.0 {
            settings.0.insert(key.clone(), value.clone());
        }
        Ok(Value::Null)
    }

    async fn list_audit_logs(&self, query: &AuditQuery) -> Result<Page<AuditEntry>, RemoteError> {
        self.record("list_audit_logs", Some(&query.page.to_string()))?;
        Ok(Page::new(vec![AuditEntry {
            id: "a1".to_string(),
            created_at: "2024-05-01T10:00:00Z".to_string(),
            actor_type: "user".to_string(),
            actor_id: "ada".to_string(),
            action: "document.update".to_string(),
            resource_type: "document".to_string(),
            resource_id: "d1".to_string(),
        }]))
    }

    async fn list_categories(&self) -> Result<Vec<String>, RemoteError> {
        self.record("list_categories", None)?;
        Ok(vec!["guides".to_string()])
    }

    async fn list_tags(&self) -> Result<Vec<String>, RemoteError> {
        self.record("list_tags", None)?;
        Ok(vec!["ops".to_string(), "rust".to_string()])
    }

    async fn list_remote_directory(
        &self,
        target: &RemoteTarget,
        path: &str,
    ) -> Result<Vec<RemoteEntry>, RemoteError> {
        self.record(
            "list_remote_directory",
            Some(&format!("{}:{path}", target.destination())),
        )?;
        Ok(self.remote_entries.lock().unwrap().clone())
    }

    async fn download_remote_file(
        &self,
        target: &RemoteTarget,
        path: &str,
    ) -> Result<PathBuf, RemoteError> {
        self.record(
            "download_remote_file",
            Some(&format!("{}:{path}", target.destination())),
        )?;
        self.download_to
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| RemoteError::Process {
                program: "scp".to_string(),
                message: "SCP download failed".to_string(),
            })
    }
}

/// A fresh, logged-out `App`.
pub fn test_app() -> App {
    App::new("http://localhost:3001".to_string(), 100)
}

/// An `App` that has completed login as an admin.
pub fn logged_in_app() -> App {
    let mut app = test_app();
    app.screen = crate::core::state::Screen::LoggedIn;
    app.user = Some(CurrentUser {
        username: "ada".to_string(),
        role: "admin".to_string(),
    });
    app
}

/// Renders one frame into a test terminal and returns the buffer text.
pub fn render_to_string(width: u16, height: u16, draw: impl FnOnce(&mut ratatui::Frame)) -> String {
    let backend = ratatui::backend::TestBackend::new(width, height);
    let mut terminal = ratatui::Terminal::new(backend).unwrap();
    terminal.draw(draw).unwrap();
    terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|c| c.symbol())
        .collect()
}
