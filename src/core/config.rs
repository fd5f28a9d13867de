//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.mdbrowse/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::remote::{ClientConfig, SshOptions};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct MdBrowseConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub local: LocalConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ServerConfig {
    pub base_url: Option<String>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TimeoutConfig {
    pub request_secs: Option<u64>,
    pub upload_secs: Option<u64>,
    pub ssh_connect_secs: Option<u64>,
    pub ssh_command_secs: Option<u64>,
    pub scp_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct EditorConfig {
    pub command: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LocalConfig {
    pub start_dir: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_BASE_URL: &str = crate::remote::client::DEFAULT_BASE_URL;
pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const DEFAULT_REQUEST_SECS: u64 = 15;
pub const DEFAULT_UPLOAD_SECS: u64 = 30;
pub const DEFAULT_SSH_CONNECT_SECS: u64 = 5;
pub const DEFAULT_SSH_COMMAND_SECS: u64 = 15;
pub const DEFAULT_SCP_SECS: u64 = 30;
pub const DEFAULT_EDITOR: &str = "nano";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub page_size: u32,
    pub request_timeout: Duration,
    pub upload_timeout: Duration,
    pub ssh: SshOptions,
    pub editor: String,
    pub start_dir: PathBuf,
}

impl ResolvedConfig {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            request_timeout: self.request_timeout,
            upload_timeout: self.upload_timeout,
            ssh: self.ssh,
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.mdbrowse/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".mdbrowse").join("config.toml"))
}

/// Load config from `path`, or from `~/.mdbrowse/config.toml` when `None`.
///
/// A missing default file is generated (commented out) and treated as
/// empty. An explicitly named file that doesn't exist is an error.
pub fn load_config(path: Option<&Path>) -> Result<MdBrowseConfig, ConfigError> {
    if let Some(path) = path {
        return read_config(path);
    }

    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(MdBrowseConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(MdBrowseConfig::default());
    }

    read_config(&path)
}

fn read_config(path: &Path) -> Result<MdBrowseConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: MdBrowseConfig = toml::from_str(&contents)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# mdbrowse Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [server]
# base_url = "http://localhost:3001"   # Or set MD_BROWSE_URL, or pass --server-url
# page_size = 100                      # Rows per page for documents and audit log

# [timeouts]
# request_secs = 15                    # Metadata calls
# upload_secs = 30                     # Document uploads
# ssh_connect_secs = 5                 # ssh/scp ConnectTimeout
# ssh_command_secs = 15                # Remote directory listing
# scp_secs = 30                        # Remote file download

# [editor]
# command = "nano"                     # Used when $EDITOR is unset

# [local]
# start_dir = "~/notes"                # Where the local file picker opens
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config from the process environment.
///
/// `cli_url` is the `--server-url` flag (None = not specified).
pub fn resolve(config: &MdBrowseConfig, cli_url: Option<&str>) -> ResolvedConfig {
    resolve_with(config, cli_url, |key| std::env::var(key).ok())
}

/// Collapses defaults → config file → env vars → CLI, reading variables
/// through `env`.
pub fn resolve_with(
    config: &MdBrowseConfig,
    cli_url: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Server: CLI → env → config → default
    let base_url = cli_url
        .map(|s| s.to_string())
        .or_else(|| env("MD_BROWSE_URL"))
        .or_else(|| config.server.base_url.clone())
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
        .trim()
        .trim_end_matches('/')
        .to_string();

    // Editor: env → config → default; a blank value counts as unset
    let editor = env("EDITOR")
        .filter(|s| !s.trim().is_empty())
        .or_else(|| config.editor.command.clone())
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_EDITOR.to_string());

    let home = env("HOME").map(PathBuf::from).or_else(dirs::home_dir);
    let start_dir = config
        .local
        .start_dir
        .as_deref()
        .map(|dir| expand_home(dir, home.as_deref()))
        .or_else(|| home.clone())
        .unwrap_or_else(|| PathBuf::from("."));

    let t = &config.timeouts;
    let secs = |value: Option<u64>, default: u64| Duration::from_secs(value.unwrap_or(default).max(1));

    ResolvedConfig {
        base_url,
        page_size: config.server.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1),
        request_timeout: secs(t.request_secs, DEFAULT_REQUEST_SECS),
        upload_timeout: secs(t.upload_secs, DEFAULT_UPLOAD_SECS),
        ssh: SshOptions {
            connect_timeout: secs(t.ssh_connect_secs, DEFAULT_SSH_CONNECT_SECS),
            command_timeout: secs(t.ssh_command_secs, DEFAULT_SSH_COMMAND_SECS),
            copy_timeout: secs(t.scp_secs, DEFAULT_SCP_SECS),
        },
        editor,
        start_dir,
    }
}

fn expand_home(dir: &str, home: Option<&Path>) -> PathBuf {
    match (dir.strip_prefix("~"), home) {
        (Some(rest), Some(home)) => home.join(rest.trim_start_matches('/')),
        _ => PathBuf::from(dir),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let resolved = resolve_with(&MdBrowseConfig::default(), None, env_from(&[]));
        assert_eq!(resolved.base_url, DEFAULT_BASE_URL);
        assert_eq!(resolved.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(resolved.request_timeout, Duration::from_secs(15));
        assert_eq!(resolved.upload_timeout, Duration::from_secs(30));
        assert_eq!(resolved.ssh, SshOptions::default());
        assert_eq!(resolved.editor, "nano");
    }

    #[test]
    fn test_resolve_precedence_cli_env_file() {
        let config = MdBrowseConfig {
            server: ServerConfig {
                base_url: Some("http://file:1".to_string()),
                page_size: None,
            },
            ..Default::default()
        };
        let env = env_from(&[("MD_BROWSE_URL", "http://env:2/")]);
        assert_eq!(resolve_with(&config, None, &env).base_url, "http://env:2");
        assert_eq!(
            resolve_with(&config, Some("http://cli:3"), &env).base_url,
            "http://cli:3"
        );
        assert_eq!(
            resolve_with(&config, None, env_from(&[])).base_url,
            "http://file:1"
        );
    }

    #[test]
    fn test_editor_env_wins_over_config() {
        let config = MdBrowseConfig {
            editor: EditorConfig {
                command: Some("hx".to_string()),
            },
            ..Default::default()
        };
        let env = env_from(&[("EDITOR", "vim")]);
        assert_eq!(resolve_with(&config, None, &env).editor, "vim");

        let blank = env_from(&[("EDITOR", "  ")]);
        assert_eq!(resolve_with(&config, None, &blank).editor, "hx");
        assert_eq!(
            resolve_with(&MdBrowseConfig::default(), None, &blank).editor,
            DEFAULT_EDITOR
        );
    }

    #[test]
    fn test_start_dir_expands_tilde() {
        let config = MdBrowseConfig {
            local: LocalConfig {
                start_dir: Some("~/notes".to_string()),
            },
            ..Default::default()
        };
        let resolved = resolve_with(&config, None, env_from(&[("HOME", "/home/ada")]));
        assert_eq!(resolved.start_dir, PathBuf::from("/home/ada/notes"));
    }

    #[test]
    fn test_sparse_toml_parses() {
        let toml_str = r#"
[timeouts]
upload_secs = 120
"#;
        let config: MdBrowseConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.timeouts.upload_secs, Some(120));
        assert!(config.timeouts.request_secs.is_none());
        assert!(config.server.base_url.is_none());

        let resolved = resolve_with(&config, None, env_from(&[]));
        assert_eq!(resolved.upload_timeout, Duration::from_secs(120));
        assert_eq!(resolved.request_timeout, Duration::from_secs(15));
    }

    #[test]
    fn test_full_toml_parses() {
        let toml_str = r#"
[server]
base_url = "https://docs.internal"
page_size = 25

[timeouts]
request_secs = 10
ssh_connect_secs = 3
scp_secs = 60

[editor]
command = "code --wait"

[local]
start_dir = "/srv/notes"
"#;
        let config: MdBrowseConfig = toml::from_str(toml_str).unwrap();
        let resolved = resolve_with(&config, None, env_from(&[]));
        assert_eq!(resolved.base_url, "https://docs.internal");
        assert_eq!(resolved.page_size, 25);
        assert_eq!(resolved.ssh.connect_timeout, Duration::from_secs(3));
        assert_eq!(resolved.ssh.copy_timeout, Duration::from_secs(60));
        assert_eq!(resolved.editor, "code --wait");
        assert_eq!(resolved.start_dir, PathBuf::from("/srv/notes"));
    }

    #[test]
    fn test_load_explicit_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_load_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[server\nbase_url = ").unwrap();
        assert!(matches!(
            load_config(Some(&path)).unwrap_err(),
            ConfigError::Parse(_)
        ));
    }

    #[test]
    fn test_generated_default_is_valid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("config.toml");
        generate_default_config(&path);
        let config = load_config(Some(&path)).unwrap();
        assert!(config.server.base_url.is_none());
    }
}
