//! Wire types for the md-browse backend.
//!
//! These are projections of records the backend owns. Every optional string
//! defaults to empty so a sparse payload never fails to parse.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Reads an explicit `null` as the type's default, so `"category": null`
/// and a missing key mean the same thing.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A list record that can be looked up by a stable identifier.
pub trait Keyed {
    fn key(&self) -> &str;
}

/// Paginated list envelope (`{data: [...], total, page, page_size}`).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Page<T> {
    #[serde(
        default,
        deserialize_with = "null_as_default",
        bound(deserialize = "T: Deserialize<'de>")
    )]
    pub data: Vec<T>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self {
            data,
            total: None,
            page: None,
            page_size: None,
        }
    }
}

/// Unpaginated list endpoints answer either with a bare array or with a
/// `{data: [...]}` envelope.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum ListBody<T> {
    Bare(Vec<T>),
    Wrapped { data: Vec<T> },
}

impl<T> ListBody<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            ListBody::Bare(items) | ListBody::Wrapped { data: items } => items,
        }
    }
}

/// A category or tag; the backend sends either plain strings or records.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum NamedEntry {
    Plain(String),
    Record {
        #[serde(alias = "category", alias = "tag")]
        name: String,
    },
}

impl NamedEntry {
    pub(crate) fn into_name(self) -> String {
        match self {
            NamedEntry::Plain(name) | NamedEntry::Record { name } => name,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Default)]
pub struct CurrentUser {
    pub username: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Default)]
pub struct DocumentSummary {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub folder_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub updated_at: String,
}

impl Keyed for DocumentSummary {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Full document as returned by `GET /documents/{id}`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Default)]
pub struct Document {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(default)]
    pub folder_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub visibility: String,
    #[serde(default)]
    pub latest_version: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_by: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub updated_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content_md: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Version {
    pub version_number: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_by: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub change_note: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub checksum: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Default)]
pub struct VersionList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub versions: Vec<Version>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Default)]
pub struct SearchHit {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub snippet: String,
}

impl Keyed for SearchHit {
    fn key(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Default)]
pub struct Folder {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
}

impl Keyed for Folder {
    fn key(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Default)]
pub struct User {
    pub username: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
}

impl Keyed for User {
    fn key(&self) -> &str {
        &self.username
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Default)]
pub struct AuditEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub actor_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub actor_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub action: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub resource_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub resource_id: String,
}

impl Keyed for AuditEntry {
    fn key(&self) -> &str {
        &self.id
    }
}

/// Backend settings are an open object; only `registration_enabled` has
/// client-side meaning.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Default)]
#[serde(transparent)]
pub struct Settings(pub Map<String, Value>);

impl Settings {
    /// Registration counts as enabled unless the backend says otherwise.
    pub fn registration_enabled(&self) -> bool {
        self.0
            .get("registration_enabled")
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }

    /// Key/value pairs sorted by key, values rendered compactly.
    pub fn entries(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .map(|(k, v)| {
                let shown = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (k.clone(), shown)
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Editor,
    #[default]
    Viewer,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Editor, Role::Viewer];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Editor => "editor",
            Role::Viewer => "viewer",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        Role::ALL.into_iter().find(|r| r.as_str() == s)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Parameters for `GET /documents`. Filtering and ordering are the
/// backend's job; the client only forwards them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentQuery {
    pub page: u32,
    pub page_size: u32,
    pub q: Option<String>,
    pub tag: Option<String>,
    pub folder_id: Option<String>,
    pub sort_by: String,
    pub sort_order: SortOrder,
}

impl Default for DocumentQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 50,
            q: None,
            tag: None,
            folder_id: None,
            sort_by: "updated_at".to_string(),
            sort_order: SortOrder::Desc,
        }
    }
}

impl DocumentQuery {
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("page_size", self.page_size.to_string()),
            ("sort_by", self.sort_by.clone()),
            ("sort_order", self.sort_order.as_str().to_string()),
        ];
        if let Some(q) = self.q.as_ref().filter(|q| !q.is_empty()) {
            params.push(("q", q.clone()));
        }
        if let Some(tag) = self.tag.as_ref().filter(|t| !t.is_empty()) {
            params.push(("tag", tag.clone()));
        }
        if let Some(folder_id) = &self.folder_id {
            params.push(("folder_id", folder_id.clone()));
        }
        params
    }
}

/// Parameters for `GET /audit-logs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditQuery {
    pub page: u32,
    pub page_size: u32,
    pub actor_type: Option<String>,
    pub action: Option<String>,
}

impl Default for AuditQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 50,
            actor_type: None,
            action: None,
        }
    }
}

impl AuditQuery {
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("page_size", self.page_size.to_string()),
        ];
        if let Some(actor_type) = self.actor_type.as_ref().filter(|s| !s.is_empty()) {
            params.push(("actor_type", actor_type.clone()));
        }
        if let Some(action) = self.action.as_ref().filter(|s| !s.is_empty()) {
            params.push(("action", action.clone()));
        }
        params
    }
}

/// Partial update for `PUT /documents/{id}`; absent fields are left alone.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
pub struct DocumentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_md: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_note: Option<String>,
}

/// Optional form fields sent alongside an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadMeta {
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub folder_id: Option<String>,
    pub visibility: Option<String>,
}

impl Default for UploadMeta {
    fn default() -> Self {
        Self {
            category: None,
            tags: Vec::new(),
            folder_id: None,
            visibility: Some("team".to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NewFolder {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
pub struct FolderUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub role: Role,
}

/// A single change applied to an existing account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserChange {
    Role(Role),
    Password(String),
}

impl UserChange {
    pub fn body(&self) -> Value {
        match self {
            UserChange::Role(role) => serde_json::json!({ "role": role.as_str() }),
            UserChange::Password(password) => serde_json::json!({ "password": password }),
        }
    }
}

/// Splits a comma separated tag field, dropping blanks.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
