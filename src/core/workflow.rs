//! # Workflows
//!
//! The async half of the coordinator. A [`Job`] is one unit of background
//! work issued by `update()`; [`run`] performs it against a [`Backend`] and
//! produces a [`Completion`] for `update()` to apply.
//!
//! Mutating jobs always end with a fetch of whatever they changed, inside
//! the same task, so the UI only ever shows data the backend just returned:
//!
//! ```text
//! modal ──Decision::Confirmed(step)──▶ update() ──Job──▶ run()
//!                                                         ├─ mutate
//!                                                         └─ re-fetch ──▶ Outcome
//! ```

use std::path::PathBuf;

use log::{info, warn};

use crate::remote::{
    AuditEntry, AuditQuery, Backend, CurrentUser, Document, DocumentQuery, DocumentSummary,
    DocumentUpdate, Folder, FolderUpdate, NewFolder, NewUser, Page, RemoteEntry, RemoteError,
    RemoteTarget, SearchHit, Settings, UploadMeta, User, UserChange, Version,
};

/// The answer of a modal step: either the user backed out, or they
/// confirmed with a payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision<T> {
    Cancelled,
    Confirmed(T),
}

impl<T> Decision<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Decision<U> {
        match self {
            Decision::Cancelled => Decision::Cancelled,
            Decision::Confirmed(value) => Decision::Confirmed(f(value)),
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Decision::Cancelled => None,
            Decision::Confirmed(value) => Some(value),
        }
    }
}

impl<T> From<Option<T>> for Decision<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Decision::Confirmed(value),
            None => Decision::Cancelled,
        }
    }
}

/// Which piece of state a job's result lands in. Used to route errors and
/// to decide whether a result is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Session,
    Documents,
    Detail,
    Versions,
    Search,
    Folders,
    Users,
    Settings,
    Audit,
    RemoteBrowser,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Job {
    Login {
        base_url: String,
        username: String,
        password: String,
    },
    LoadDocuments(DocumentQuery),
    OpenDocument(String),
    UpdateDocument {
        id: String,
        update: DocumentUpdate,
        query: DocumentQuery,
    },
    DeleteDocument {
        id: String,
        query: DocumentQuery,
    },
    LoadVersions(String),
    Rollback {
        id: String,
        version: i64,
        note: String,
        query: DocumentQuery,
    },
    Upload {
        path: PathBuf,
        meta: UploadMeta,
        /// Remove `path` once the upload has been attempted.
        cleanup: bool,
        query: DocumentQuery,
    },
    Search {
        query: String,
        page: u32,
        page_size: u32,
    },
    LoadFolders,
    CreateFolder(NewFolder),
    RenameFolder {
        id: String,
        name: String,
    },
    DeleteFolder(String),
    LoadUsers,
    CreateUser(NewUser),
    UpdateUser {
        username: String,
        change: UserChange,
    },
    DeleteUser(String),
    LoadSettings,
    UpdateSettings(Settings),
    LoadAudit(AuditQuery),
    ListRemote {
        target: RemoteTarget,
        path: String,
    },
    DownloadRemote {
        target: RemoteTarget,
        path: String,
    },
}

impl Job {
    pub fn slot(&self) -> Slot {
        match self {
            Job::Login { .. } => Slot::Session,
            Job::LoadDocuments(_) | Job::DeleteDocument { .. } | Job::Upload { .. } => {
                Slot::Documents
            }
            Job::OpenDocument(_) | Job::UpdateDocument { .. } | Job::Rollback { .. } => {
                Slot::Detail
            }
            Job::LoadVersions(_) => Slot::Versions,
            Job::Search { .. } => Slot::Search,
            Job::LoadFolders
            | Job::CreateFolder(_)
            | Job::RenameFolder { .. }
            | Job::DeleteFolder(_) => Slot::Folders,
            Job::LoadUsers | Job::CreateUser(_) | Job::UpdateUser { .. } | Job::DeleteUser(_) => {
                Slot::Users
            }
            Job::LoadSettings | Job::UpdateSettings(_) => Slot::Settings,
            Job::LoadAudit(_) => Slot::Audit,
            Job::ListRemote { .. } | Job::DownloadRemote { .. } => Slot::RemoteBrowser,
        }
    }

    /// Short name for logs. Never includes credentials.
    pub fn label(&self) -> &'static str {
        match self {
            Job::Login { .. } => "login",
            Job::LoadDocuments(_) => "load documents",
            Job::OpenDocument(_) => "open document",
            Job::UpdateDocument { .. } => "update document",
            Job::DeleteDocument { .. } => "delete document",
            Job::LoadVersions(_) => "load versions",
            Job::Rollback { .. } => "rollback",
            Job::Upload { .. } => "upload",
            Job::Search { .. } => "search",
            Job::LoadFolders => "load folders",
            Job::CreateFolder(_) => "create folder",
            Job::RenameFolder { .. } => "rename folder",
            Job::DeleteFolder(_) => "delete folder",
            Job::LoadUsers => "load users",
            Job::CreateUser(_) => "create user",
            Job::UpdateUser { .. } => "update user",
            Job::DeleteUser(_) => "delete user",
            Job::LoadSettings => "load settings",
            Job::UpdateSettings(_) => "update settings",
            Job::LoadAudit(_) => "load audit log",
            Job::ListRemote { .. } => "list remote directory",
            Job::DownloadRemote { .. } => "download remote file",
        }
    }
}

/// Category and tag names offered as hints in the edit form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Vocabulary {
    pub categories: Vec<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    LoggedIn {
        user: CurrentUser,
        vocabulary: Vocabulary,
    },
    Documents {
        query: DocumentQuery,
        page: Page<DocumentSummary>,
    },
    Document(Document),
    /// An edit or rollback: the fresh document plus the list it appears in.
    DocumentChanged {
        document: Document,
        query: DocumentQuery,
        documents: Page<DocumentSummary>,
    },
    DocumentDeleted {
        id: String,
        query: DocumentQuery,
        documents: Page<DocumentSummary>,
    },
    Versions {
        document_id: String,
        versions: Vec<Version>,
    },
    SearchResults {
        query: String,
        page: Page<SearchHit>,
    },
    Folders(Vec<Folder>),
    Users(Vec<User>),
    Settings(Settings),
    Audit {
        query: AuditQuery,
        page: Page<AuditEntry>,
    },
    RemoteListing {
        target: RemoteTarget,
        path: String,
        entries: Vec<RemoteEntry>,
    },
    RemoteDownloaded(PathBuf),
}

/// A finished job: what to show, plus an optional success notice.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub notice: Option<String>,
    pub outcome: Outcome,
}

impl Completion {
    fn quiet(outcome: Outcome) -> Self {
        Self {
            notice: None,
            outcome,
        }
    }

    fn notice(notice: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            notice: Some(notice.into()),
            outcome,
        }
    }
}

/// Runs one job to completion.
pub async fn run(backend: &dyn Backend, job: Job) -> Result<Completion, RemoteError> {
    info!("Running job: {}", job.label());
    match job {
        Job::Login {
            base_url,
            username,
            password,
        } => {
            backend.set_base_url(&base_url);
            backend.login(&username, &password).await?;
            let user = backend.current_user().await?;
            let vocabulary = load_vocabulary(backend).await;
            Ok(Completion::quiet(Outcome::LoggedIn { user, vocabulary }))
        }
        Job::LoadDocuments(query) => {
            let page = backend.list_documents(&query).await?;
            Ok(Completion::quiet(Outcome::Documents { query, page }))
        }
        Job::OpenDocument(id) => {
            let document = backend.get_document(&id).await?;
            Ok(Completion::quiet(Outcome::Document(document)))
        }
        Job::UpdateDocument { id, update, query } => {
            backend.update_document(&id, &update).await?;
            let document = backend.get_document(&id).await?;
            let documents = backend.list_documents(&query).await?;
            Ok(Completion::notice(
                "Document updated",
                Outcome::DocumentChanged {
                    document,
                    query,
                    documents,
                },
            ))
        }
        Job::DeleteDocument { id, query } => {
            backend.delete_document(&id).await?;
            let documents = backend.list_documents(&query).await?;
            Ok(Completion::notice(
                "Document deleted",
                Outcome::DocumentDeleted {
                    id,
                    query,
                    documents,
                },
            ))
        }
        Job::LoadVersions(document_id) => {
            let mut versions = backend.list_versions(&document_id).await?;
            // newest first
            versions.reverse();
            Ok(Completion::quiet(Outcome::Versions {
                document_id,
                versions,
            }))
        }
        Job::Rollback {
            id,
            version,
            note,
            query,
        } => {
            backend.rollback(&id, version, &note).await?;
            let document = backend.get_document(&id).await?;
            let documents = backend.list_documents(&query).await?;
            Ok(Completion::notice(
                format!("Rolled back to v{version}"),
                Outcome::DocumentChanged {
                    document,
                    query,
                    documents,
                },
            ))
        }
        Job::Upload {
            path,
            meta,
            cleanup,
            query,
        } => {
            let uploaded = backend.upload_document(&path, &meta).await;
            if cleanup {
                remove_temp_file(&path);
            }
            uploaded?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let page = backend.list_documents(&query).await?;
            Ok(Completion::notice(
                format!("Uploaded: {name}"),
                Outcome::Documents { query, page },
            ))
        }
        Job::Search {
            query,
            page,
            page_size,
        } => {
            let results = backend.search(&query, page, page_size).await?;
            Ok(Completion::quiet(Outcome::SearchResults {
                query,
                page: results,
            }))
        }
        Job::LoadFolders => Ok(Completion::quiet(Outcome::Folders(
            backend.list_folders().await?,
        ))),
        Job::CreateFolder(folder) => {
            backend.create_folder(&folder).await?;
            Ok(Completion::notice(
                format!("Folder '{}' created", folder.name),
                Outcome::Folders(backend.list_folders().await?),
            ))
        }
        Job::RenameFolder { id, name } => {
            let update = FolderUpdate {
                name: Some(name),
                parent_id: None,
            };
            backend.update_folder(&id, &update).await?;
            Ok(Completion::notice(
                "Folder renamed",
                Outcome::Folders(backend.list_folders().await?),
            ))
        }
        Job::DeleteFolder(id) => {
            backend.delete_folder(&id).await?;
            Ok(Completion::notice(
                "Folder deleted",
                Outcome::Folders(backend.list_folders().await?),
            ))
        }
        Job::LoadUsers => Ok(Completion::quiet(Outcome::Users(backend.list_users().await?))),
        Job::CreateUser(user) => {
            backend.create_user(&user).await?;
            Ok(Completion::notice(
                format!("User '{}' created", user.username),
                Outcome::Users(backend.list_users().await?),
            ))
        }
        Job::UpdateUser { username, change } => {
            backend.update_user(&username, &change).await?;
            Ok(Completion::notice(
                format!("User '{username}' updated"),
                Outcome::Users(backend.list_users().await?),
            ))
        }
        Job::DeleteUser(username) => {
            backend.delete_user(&username).await?;
            Ok(Completion::notice(
                format!("User '{username}' deleted"),
                Outcome::Users(backend.list_users().await?),
            ))
        }
        Job::LoadSettings => Ok(Completion::quiet(Outcome::Settings(
            backend.get_settings().await?,
        ))),
        Job::UpdateSettings(changes) => {
            backend.update_settings(&changes).await?;
            Ok(Completion::notice(
                "Settings updated",
                Outcome::Settings(backend.get_settings().await?),
            ))
        }
        Job::LoadAudit(query) => {
            let page = backend.list_audit_logs(&query).await?;
            Ok(Completion::quiet(Outcome::Audit { query, page }))
        }
        Job::ListRemote { target, path } => {
            let entries = backend.list_remote_directory(&target, &path).await?;
            Ok(Completion::quiet(Outcome::RemoteListing {
                target,
                path,
                entries,
            }))
        }
        Job::DownloadRemote { target, path } => {
            let local = backend.download_remote_file(&target, &path).await?;
            Ok(Completion::quiet(Outcome::RemoteDownloaded(local)))
        }
    }
}

/// Categories and tags are hints only; a failure leaves them empty.
async fn load_vocabulary(backend: &dyn Backend) -> Vocabulary {
    let categories = backend.list_categories().await.unwrap_or_else(|e| {
        warn!("Could not load categories: {}", e);
        Vec::new()
    });
    let tags = backend.list_tags().await.unwrap_or_else(|e| {
        warn!("Could not load tags: {}", e);
        Vec::new()
    });
    Vocabulary { categories, tags }
}

pub fn remove_temp_file(path: &std::path::Path) {
    if let Err(e) = std::fs::remove_file(path) {
        warn!("Failed to remove temp file {}: {}", path.display(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::Role;
    use crate::test_support::RecordingBackend;

    #[tokio::test]
    async fn login_sets_server_then_fetches_user() {
        let backend = RecordingBackend::new();
        let job = Job::Login {
            base_url: "http://docs:9000".into(),
            username: "ada".into(),
            password: "pw".into(),
        };
        let completion = run(&backend, job).await.unwrap();
        assert_eq!(backend.base_url(), "http://docs:9000");
        assert_eq!(
            backend.calls()[..2],
            ["login:ada".to_string(), "current_user".to_string()]
        );
        match completion.outcome {
            Outcome::LoggedIn { user, vocabulary } => {
                assert_eq!(user.username, "ada");
                assert_eq!(vocabulary.categories, vec!["guides"]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_login_stops_before_current_user() {
        let backend = RecordingBackend::new();
        backend.fail("login", RemoteError::from_response(401, b""));
        let job = Job::Login {
            base_url: String::new(),
            username: "ada".into(),
            password: "wrong".into(),
        };
        assert!(run(&backend, job).await.is_err());
        assert_eq!(backend.calls(), vec!["login:ada"]);
    }

    #[tokio::test]
    async fn vocabulary_failure_does_not_fail_login() {
        let backend = RecordingBackend::new();
        backend.fail("list_tags", RemoteError::Network("down".into()));
        let job = Job::Login {
            base_url: String::new(),
            username: "ada".into(),
            password: "pw".into(),
        };
        let completion = run(&backend, job).await.unwrap();
        assert!(matches!(completion.outcome, Outcome::LoggedIn { vocabulary, .. } if vocabulary.tags.is_empty()));
    }

    #[tokio::test]
    async fn every_mutation_is_followed_by_a_fetch() {
        let query = DocumentQuery::default();
        let cases = vec![
            (
                Job::DeleteDocument {
                    id: "d1".into(),
                    query: query.clone(),
                },
                vec!["delete_document:d1", "list_documents"],
            ),
            (
                Job::UpdateDocument {
                    id: "d1".into(),
                    update: DocumentUpdate::default(),
                    query: query.clone(),
                },
                vec!["update_document:d1", "get_document:d1", "list_documents"],
            ),
            (
                Job::Rollback {
                    id: "d1".into(),
                    version: 2,
                    note: String::new(),
                    query: query.clone(),
                },
                vec!["rollback:d1:2", "get_document:d1", "list_documents"],
            ),
            (
                Job::CreateFolder(NewFolder {
                    name: "ops".into(),
                    parent_id: None,
                }),
                vec!["create_folder:ops", "list_folders"],
            ),
            (
                Job::RenameFolder {
                    id: "f1".into(),
                    name: "x".into(),
                },
                vec!["update_folder:f1", "list_folders"],
            ),
            (Job::DeleteFolder("f1".into()), vec!["delete_folder:f1", "list_folders"]),
            (
                Job::CreateUser(NewUser {
                    username: "bob".into(),
                    password: "pw".into(),
                    role: Role::Editor,
                }),
                vec!["create_user:bob", "list_users"],
            ),
            (
                Job::UpdateUser {
                    username: "bob".into(),
                    change: UserChange::Role(Role::Admin),
                },
                vec!["update_user:bob", "list_users"],
            ),
            (Job::DeleteUser("bob".into()), vec!["delete_user:bob", "list_users"]),
            (
                Job::UpdateSettings(Settings::default()),
                vec!["update_settings", "get_settings"],
            ),
        ];

        for (job, expected) in cases {
            let backend = RecordingBackend::new();
            let label = job.label();
            let completion = run(&backend, job).await.unwrap();
            assert_eq!(backend.calls(), expected, "{label}");
            assert!(completion.notice.is_some(), "{label}");
        }
    }

    #[tokio::test]
    async fn failed_mutation_skips_refresh() {
        let backend = RecordingBackend::new();
        backend.fail(
            "delete_folder",
            RemoteError::Api {
                status: 409,
                code: "folder_not_empty".into(),
                message: "Folder has documents".into(),
                hint: Some("Move them first".into()),
            },
        );
        let err = run(&backend, Job::DeleteFolder("f1".into())).await.unwrap_err();
        assert_eq!(err.to_string(), "Folder has documents (hint: Move them first)");
        assert_eq!(backend.calls(), vec!["delete_folder:f1"]);
    }

    #[tokio::test]
    async fn fetched_list_keeps_backend_order() {
        let backend = RecordingBackend::new();
        let completion = run(&backend, Job::LoadDocuments(DocumentQuery::default()))
            .await
            .unwrap();
        match completion.outcome {
            Outcome::Documents { page, .. } => {
                let ids: Vec<&str> = page.data.iter().map(|d| d.id.as_str()).collect();
                assert_eq!(ids, vec!["d2", "d1", "d3"]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn versions_come_back_newest_first() {
        let backend = RecordingBackend::new();
        let completion = run(&backend, Job::LoadVersions("d1".into())).await.unwrap();
        match completion.outcome {
            Outcome::Versions { versions, .. } => {
                let numbers: Vec<i64> = versions.iter().map(|v| v.version_number).collect();
                assert_eq!(numbers, vec![3, 2, 1]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn remote_upload_removes_temp_file_even_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mdbrowse-test.md");
        std::fs::write(&path, "# hi").unwrap();

        let backend = RecordingBackend::new();
        backend.fail("upload_document", RemoteError::Network("reset".into()));
        let job = Job::Upload {
            path: path.clone(),
            meta: UploadMeta::default(),
            cleanup: true,
            query: DocumentQuery::default(),
        };
        assert!(run(&backend, job).await.is_err());
        assert!(!path.exists());
        assert_eq!(backend.calls(), vec!["upload_document:mdbrowse-test.md"]);
    }

    #[tokio::test]
    async fn local_upload_keeps_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, "# notes").unwrap();

        let backend = RecordingBackend::new();
        let job = Job::Upload {
            path: path.clone(),
            meta: UploadMeta::default(),
            cleanup: false,
            query: DocumentQuery::default(),
        };
        let completion = run(&backend, job).await.unwrap();
        assert!(path.exists());
        assert_eq!(completion.notice.as_deref(), Some("Uploaded: notes.md"));
        assert_eq!(
            backend.calls(),
            vec!["upload_document:notes.md", "list_documents"]
        );
    }

    #[test]
    fn decision_conversions() {
        let confirmed: Decision<u8> = Some(3).into();
        assert_eq!(confirmed.clone().map(|v| v * 2), Decision::Confirmed(6));
        assert_eq!(confirmed.into_option(), Some(3));
        let cancelled: Decision<u8> = None.into();
        assert_eq!(cancelled.into_option(), None);
    }

    #[test]
    fn login_label_hides_credentials() {
        let job = Job::Login {
            base_url: String::new(),
            username: "ada".into(),
            password: "hunter2".into(),
        };
        assert!(!job.label().contains("hunter2"));
        assert_eq!(job.slot(), Slot::Session);
    }
}
