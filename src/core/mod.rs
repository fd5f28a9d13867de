//! # Core Application Logic
//!
//! This module contains mdbrowse's business logic.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (app data)     │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │  • workflow (jobs)      │
//!                    └───────────┬─────────────┘
//!                                │
//!            ┌───────────────────┴───────────────────┐
//!            ▼                                       ▼
//!     ┌────────────┐                          ┌────────────┐
//!     │    TUI     │                          │   Remote   │
//!     │  Adapter   │                          │  Backend   │
//!     │ (ratatui)  │                          │ (reqwest)  │
//!     └────────────┘                          └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, all application state in one place
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`workflow`]: Jobs that run against a [`Backend`](crate::remote::Backend)
//! - [`config`]: `~/.mdbrowse/config.toml` loading and precedence

pub mod action;
pub mod config;
pub mod state;
pub mod workflow;
