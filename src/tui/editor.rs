//! Round-trips text through an external editor using a temp file.
//!
//! The caller leaves the alternate screen before calling [`edit_text`] and
//! restores it afterwards; this module only deals with the file and the
//! child process.

use std::fs;
use std::process::Command;

use log::{info, warn};
use thiserror::Error;

use crate::remote::ssh::shell_quote;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("editor temp file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not start editor '{command}': {source}")]
    Launch {
        command: String,
        source: std::io::Error,
    },
    #[error("editor '{command}' exited with {status}")]
    Failed { command: String, status: String },
}

/// Writes `initial` to a `.md` temp file, runs `command <file>` through the
/// shell and returns the file's contents afterwards. The temp file is
/// removed on every path.
pub fn edit_text(command: &str, initial: &str) -> Result<String, EditorError> {
    let file = tempfile::Builder::new()
        .prefix("mdbrowse-")
        .suffix(".md")
        .tempfile()?;
    fs::write(file.path(), initial)?;

    info!("Launching editor: {}", command);
    let status = Command::new("sh")
        .arg("-c")
        .arg(format!("{command} {}", shell_quote(&file.path().to_string_lossy())))
        .status()
        .map_err(|source| EditorError::Launch {
            command: command.to_string(),
            source,
        })?;
    if !status.success() {
        warn!("Editor exited with {}", status);
        return Err(EditorError::Failed {
            command: command.to_string(),
            status: status.to_string(),
        });
    }
    Ok(fs::read_to_string(file.path())?)
}
