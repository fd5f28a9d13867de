//! HTTP implementation of [`Backend`] on top of `reqwest`.

use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::ssh::{self, RemoteEntry, RemoteTarget, SshOptions};
use super::types::{
    AuditEntry, AuditQuery, CurrentUser, Document, DocumentQuery, DocumentSummary,
    DocumentUpdate, Folder, FolderUpdate, ListBody, LoginResponse, NamedEntry, NewFolder, NewUser,
    Page, SearchHit, Settings, UploadMeta, User, UserChange, Version, VersionList,
};
use super::{Backend, RemoteError};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3001";

/// Knobs the client is built from. Filled in from `ResolvedConfig`.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    pub upload_timeout: Duration,
    pub ssh: SshOptions,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(15),
            upload_timeout: Duration::from_secs(30),
            ssh: SshOptions::default(),
        }
    }
}

struct Session {
    base_url: String,
    token: Option<String>,
}

/// Session-scoped client: one base URL and at most one bearer token for the
/// lifetime of the process.
pub struct RemoteClient {
    http: reqwest::Client,
    session: RwLock<Session>,
    request_timeout: Duration,
    upload_timeout: Duration,
    ssh: SshOptions,
}

impl RemoteClient {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            session: RwLock::new(Session {
                base_url: normalize_base_url(&config.base_url),
                token: None,
            }),
            request_timeout: config.request_timeout,
            upload_timeout: config.upload_timeout,
            ssh: config.ssh,
        }
    }

    pub fn has_token(&self) -> bool {
        self.session
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .token
            .is_some()
    }

    /// Builds a request against the current base URL, with the bearer token
    /// attached when one is held.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let session = self.session.read().unwrap_or_else(|e| e.into_inner());
        let mut builder = self
            .http
            .request(method, format!("{}{}", session.base_url, path))
            .timeout(self.request_timeout);
        if let Some(token) = &session.token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Sends the request and returns the raw body of a successful response.
    async fn send(&self, builder: RequestBuilder) -> Result<Vec<u8>, RemoteError> {
        let response = builder.send().await.map_err(|e| {
            warn!("Request failed: {}", e);
            if e.is_timeout() {
                RemoteError::Network("request timed out".to_string())
            } else {
                RemoteError::Network(e.to_string())
            }
        })?;

        let status = response.status().as_u16();
        let url = response.url().path().to_string();
        let body = response
            .bytes()
            .await
            .map_err(|e| RemoteError::Network(e.to_string()))?;
        debug!("{} -> HTTP {} ({} bytes)", url, status, body.len());

        if status >= 400 {
            let err = RemoteError::from_response(status, &body);
            warn!("Backend error on {}: HTTP {}: {}", url, status, err);
            return Err(err);
        }
        Ok(body.to_vec())
    }

    async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, RemoteError> {
        let body = self.send(builder).await?;
        parse_body(&body)
    }
}

/// Parses a 2xx body. An empty body (204 and friends) is treated as JSON
/// `null`, so it satisfies `Value` and `Option<_>` but not a record type.
fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, RemoteError> {
    let parsed = if body.iter().all(u8::is_ascii_whitespace) {
        serde_json::from_value(Value::Null)
    } else {
        serde_json::from_slice(body)
    };
    parsed.map_err(|e| RemoteError::Malformed(e.to_string()))
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

/// True for `.md` and `.markdown`, ignoring case.
pub fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown"))
        .unwrap_or(false)
}

fn upload_form(file_name: String, bytes: Vec<u8>, meta: &UploadMeta) -> Result<Form, RemoteError> {
    let part = Part::bytes(bytes)
        .file_name(file_name)
        .mime_str("text/markdown")
        .map_err(|e| RemoteError::Validation(e.to_string()))?;

    let mut form = Form::new().part("file", part);
    if let Some(category) = meta.category.as_ref().filter(|c| !c.is_empty()) {
        form = form.text("category", category.clone());
    }
    if !meta.tags.is_empty() {
        form = form.text("tags", meta.tags.join(","));
    }
    if let Some(folder_id) = meta.folder_id.as_ref().filter(|f| !f.is_empty()) {
        form = form.text("folder_id", folder_id.clone());
    }
    if let Some(visibility) = meta.visibility.as_ref().filter(|v| !v.is_empty()) {
        form = form.text("visibility", visibility.clone());
    }
    Ok(form)
}

#[async_trait]
impl Backend for RemoteClient {
    fn base_url(&self) -> String {
        self.session
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .base_url
            .clone()
    }

    fn set_base_url(&self, base_url: &str) {
        let normalized = normalize_base_url(base_url);
        if normalized.is_empty() {
            return;
        }
        let mut session = self.session.write().unwrap_or_else(|e| e.into_inner());
        if session.base_url != normalized {
            info!("Server address set to {}", normalized);
            session.base_url = normalized;
        }
    }

    async fn login(&self, username: &str, password: &str) -> Result<(), RemoteError> {
        let builder = self
            .request(Method::POST, "/api/auth/login")
            .json(&json!({ "username": username, "password": password }));
        let response: LoginResponse = self.fetch(builder).await?;
        self.session
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .token = Some(response.token);
        info!("Logged in as {}", username);
        Ok(())
    }

    async fn current_user(&self) -> Result<CurrentUser, RemoteError> {
        if !self.has_token() {
            return Err(RemoteError::Unauthenticated);
        }
        self.fetch(self.request(Method::GET, "/api/auth/me")).await
    }

    async fn list_documents(
        &self,
        query: &DocumentQuery,
    ) -> Result<Page<DocumentSummary>, RemoteError> {
        let builder = self
            .request(Method::GET, "/api/v1/documents")
            .query(&query.params());
        self.fetch(builder).await
    }

    async fn get_document(&self, id: &str) -> Result<Document, RemoteError> {
        let builder = self
            .request(Method::GET, &format!("/api/v1/documents/{id}"))
            .query(&[("include_raw", "true"), ("include_rendered", "true")]);
        self.fetch(builder).await
    }

    async fn upload_document(
        &self,
        path: &Path,
        meta: &UploadMeta,
    ) -> Result<Value, RemoteError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !is_markdown(path) {
            return Err(RemoteError::Validation(format!(
                "{file_name} is not a markdown file (.md or .markdown)"
            )));
        }

        let bytes = tokio::fs::read(path).await?;
        info!("Uploading {} ({} bytes)", path.display(), bytes.len());
        let builder = self
            .request(Method::POST, "/api/v1/documents/upload")
            .timeout(self.upload_timeout)
            .multipart(upload_form(file_name, bytes, meta)?);
        self.fetch(builder).await
    }

    async fn update_document(
        &self,
        id: &str,
        update: &DocumentUpdate,
    ) -> Result<Value, RemoteError> {
        let builder = self
            .request(Method::PUT, &format!("/api/v1/documents/{id}"))
            .json(update);
        self.fetch(builder).await
    }

    async fn delete_document(&self, id: &str) -> Result<(), RemoteError> {
        self.send(self.request(Method::DELETE, &format!("/api/v1/documents/{id}")))
            .await
            .map(|_| ())
    }

    async fn list_versions(&self, id: &str) -> Result<Vec<Version>, RemoteError> {
        let list: VersionList = self
            .fetch(self.request(Method::GET, &format!("/api/v1/documents/{id}/versions")))
            .await?;
        Ok(list.versions)
    }

    async fn rollback(
        &self,
        id: &str,
        target_version: i64,
        change_note: &str,
    ) -> Result<Value, RemoteError> {
        let builder = self
            .request(Method::POST, &format!("/api/v1/documents/{id}/rollback"))
            .json(&json!({ "target_version": target_version, "change_note": change_note }));
        self.fetch(builder).await
    }

    async fn search(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> Result<Page<SearchHit>, RemoteError> {
        let builder = self.request(Method::GET, "/api/v1/search").query(&[
            ("q", query.to_string()),
            ("page", page.to_string()),
            ("page_size", page_size.to_string()),
        ]);
        self.fetch(builder).await
    }

    async fn list_folders(&self) -> Result<Vec<Folder>, RemoteError> {
        let body: ListBody<Folder> = self
            .fetch(self.request(Method::GET, "/api/v1/folders"))
            .await?;
        Ok(body.into_vec())
    }

    async fn create_folder(&self, folder: &NewFolder) -> Result<Value, RemoteError> {
        self.fetch(self.request(Method::POST, "/api/v1/folders").json(folder))
            .await
    }

    async fn update_folder(&self, id: &str, update: &FolderUpdate) -> Result<Value, RemoteError> {
        let builder = self
            .request(Method::PUT, &format!("/api/v1/folders/{id}"))
            .json(update);
        self.fetch(builder).await
    }

    async fn delete_folder(&self, id: &str) -> Result<(), RemoteError> {
        self.send(self.request(Method::DELETE, &format!("/api/v1/folders/{id}")))
            .await
            .map(|_| ())
    }

    async fn list_users(&self) -> Result<Vec<User>, RemoteError> {
        let body: ListBody<User> = self
            .fetch(self.request(Method::GET, "/api/v1/admin/users"))
            .await?;
        Ok(body.into_vec())
    }

    async fn create_user(&self, user: &NewUser) -> Result<Value, RemoteError> {
        self.fetch(self.request(Method::POST, "/api/v1/admin/users").json(user))
            .await
    }

    async fn update_user(&self, username: &str, change: &UserChange) -> Result<Value, RemoteError> {
        let builder = self
            .request(Method::PUT, &format!("/api/v1/admin/users/{username}"))
            .json(&change.body());
        self.fetch(builder).await
    }

    async fn delete_user(&self, username: &str) -> Result<(), RemoteError> {
        self.send(self.request(Method::DELETE, &format!("/api/v1/admin/users/{username}")))
            .await
            .map(|_| ())
    }

    async fn get_settings(&self) -> Result<Settings, RemoteError> {
        let settings: Option<Settings> = self
            .fetch(self.request(Method::GET, "/api/v1/admin/settings"))
            .await?;
        Ok(settings.unwrap_or_default())
    }

    async fn update_settings(&self, changes: &Settings) -> Result<Value, RemoteError> {
        self.fetch(self.request(Method::PUT, "/api/v1/admin/settings").json(changes))
            .await
    }

    async fn list_audit_logs(&self, query: &AuditQuery) -> Result<Page<AuditEntry>, RemoteError> {
        let builder = self
            .request(Method::GET, "/api/v1/audit-logs")
            .query(&query.params());
        self.fetch(builder).await
    }

    async fn list_categories(&self) -> Result<Vec<String>, RemoteError> {
        let body: ListBody<NamedEntry> = self
            .fetch(self.request(Method::GET, "/api/v1/categories"))
            .await?;
        Ok(body.into_vec().into_iter().map(NamedEntry::into_name).collect())
    }

    async fn list_tags(&self) -> Result<Vec<String>, RemoteError> {
        let body: ListBody<NamedEntry> = self
            .fetch(self.request(Method::GET, "/api/v1/tags"))
            .await?;
        Ok(body.into_vec().into_iter().map(NamedEntry::into_name).collect())
    }

    async fn list_remote_directory(
        &self,
        target: &RemoteTarget,
        path: &str,
    ) -> Result<Vec<RemoteEntry>, RemoteError> {
        ssh::list_remote_directory(target, path, &self.ssh).await
    }

    async fn download_remote_file(
        &self,
        target: &RemoteTarget,
        path: &str,
    ) -> Result<PathBuf, RemoteError> {
        ssh::download_remote_file(target, path, &self.ssh).await
    }
}
