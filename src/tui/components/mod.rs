//! # TUI Components
//!
//! Every screen piece of mdbrowse, each in its own file.
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Display components that receive all data as fields:
//! - `TitleBar`: server, signed-in user and the busy spinner
//! - `StatusBar`: the current notice or the key help of the active view
//! - `Sidebar`: section list
//!
//! ### Stateful Components (Persistent State + Render Wrapper)
//!
//! State lives in `TuiState` between frames; a short-lived wrapper borrows
//! it together with `App` for one render pass:
//! - `LoginState` / `LoginScreen`
//! - `SearchState` / `SearchView`
//! - `DocumentViewState` / `DocumentView`
//! - `TableCursor` / `DocumentList`, `FolderList`, `UserList`,
//!   `SettingsView`, `AuditLog`
//!
//! Section views translate keys with a `handle_event` that returns a
//! [`Command`](crate::tui::Command): either a core action or a modal to open.
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs           (this file)
//! ├── table.rs         (selection state and column helpers)
//! ├── text_input/      (editable field, single- or multi-line)
//! ├── title_bar.rs
//! ├── status_bar.rs
//! ├── sidebar.rs
//! ├── login.rs
//! ├── documents.rs
//! ├── document_view.rs
//! ├── search.rs
//! ├── folders.rs
//! ├── users.rs
//! ├── settings.rs
//! └── audit.rs
//! ```

pub mod audit;
pub mod document_view;
pub mod documents;
pub mod folders;
pub mod login;
pub mod search;
pub mod settings;
pub mod sidebar;
mod status_bar;
pub mod table;
pub mod text_input;
mod title_bar;
pub mod users;

pub use audit::AuditLog;
pub use document_view::{DocumentView, DocumentViewState};
pub use documents::DocumentList;
pub use folders::FolderList;
pub use login::{LoginScreen, LoginState};
pub use search::{SearchState, SearchView};
pub use settings::SettingsView;
pub use sidebar::{SIDEBAR_WIDTH, Sidebar};
pub use status_bar::StatusBar;
pub use table::TableCursor;
pub use title_bar::TitleBar;
pub use users::UserList;
