//! Remote file access through the system `ssh` and `scp` binaries.
//!
//! Both commands run non-interactively (`BatchMode=yes`), accept unknown host
//! keys on first contact, and give up quickly when the host is unreachable.
//! A non-zero exit is reported with whatever the tool wrote to stderr.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use log::{debug, info, warn};
use tokio::process::Command;

use super::RemoteError;

/// Where to connect: `host` or `user@host`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTarget {
    pub host: String,
    pub user: Option<String>,
}

impl RemoteTarget {
    pub fn new(host: impl Into<String>, user: Option<String>) -> Self {
        Self {
            host: host.into(),
            user: user.filter(|u| !u.trim().is_empty()),
        }
    }

    pub fn destination(&self) -> String {
        match &self.user {
            Some(user) => format!("{user}@{}", self.host),
            None => self.host.clone(),
        }
    }
}

/// Deadlines for the external tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SshOptions {
    /// Passed to `-o ConnectTimeout=`.
    pub connect_timeout: Duration,
    /// Wall-clock limit for a directory listing.
    pub command_timeout: Duration,
    /// Wall-clock limit for a file copy.
    pub copy_timeout: Duration,
}

impl Default for SshOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            command_timeout: Duration::from_secs(15),
            copy_timeout: Duration::from_secs(30),
        }
    }
}

/// One line of a remote `ls -la`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteEntry {
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
    pub permissions: String,
}

/// Lists `path` on the remote host.
pub async fn list_remote_directory(
    target: &RemoteTarget,
    path: &str,
    options: &SshOptions,
) -> Result<Vec<RemoteEntry>, RemoteError> {
    let mut args = common_args(options);
    args.push(target.destination());
    args.push(format!("ls -la {}", shell_quote(path)));

    info!("Listing {}:{}", target.destination(), path);
    let stdout = run("ssh", &args, options.command_timeout, "SSH connection failed").await?;
    let entries = parse_listing(&stdout);
    debug!("Remote listing returned {} entries", entries.len());
    Ok(entries)
}

/// Copies `path` from the remote host into a fresh temporary file and
/// returns its local path. The caller owns the file and must remove it.
pub async fn download_remote_file(
    target: &RemoteTarget,
    path: &str,
    options: &SshOptions,
) -> Result<PathBuf, RemoteError> {
    let local = std::env::temp_dir().join(format!("mdbrowse-{}.md", uuid::Uuid::new_v4()));

    let mut args = common_args(options);
    args.push(format!("{}:{}", target.destination(), path));
    args.push(local.to_string_lossy().into_owned());

    info!("Downloading {}:{} -> {}", target.destination(), path, local.display());
    if let Err(e) = run("scp", &args, options.copy_timeout, "SCP download failed").await {
        // scp may leave a partial file behind
        let _ = std::fs::remove_file(&local);
        return Err(e);
    }
    Ok(local)
}

/// Parses `ls -la` output. The `total` header, `.` and `..` are skipped;
/// symlinks keep only their own name.
pub fn parse_listing(output: &str) -> Vec<RemoteEntry> {
    output
        .lines()
        .filter_map(parse_listing_line)
        .filter(|entry| entry.name != "." && entry.name != "..")
        .collect()
}

fn parse_listing_line(line: &str) -> Option<RemoteEntry> {
    // perms links owner group size month day time name...
    let mut rest = line.trim_start();
    let mut fields = Vec::with_capacity(8);
    for _ in 0..8 {
        let end = rest.find(char::is_whitespace)?;
        fields.push(&rest[..end]);
        rest = rest[end..].trim_start();
    }
    if rest.is_empty() {
        return None;
    }

    let permissions = fields[0];
    let name = if permissions.starts_with('l') {
        rest.split(" -> ").next().unwrap_or(rest)
    } else {
        rest
    };

    Some(RemoteEntry {
        name: name.to_string(),
        is_dir: permissions.starts_with('d'),
        size: fields[4].parse().unwrap_or(0),
        permissions: permissions.to_string(),
    })
}

fn common_args(options: &SshOptions) -> Vec<String> {
    vec![
        "-o".to_string(),
        "BatchMode=yes".to_string(),
        "-o".to_string(),
        "StrictHostKeyChecking=accept-new".to_string(),
        "-o".to_string(),
        format!("ConnectTimeout={}", options.connect_timeout.as_secs().max(1)),
    ]
}

/// Single-quotes `value` for `sh`, escaping embedded quotes.
pub(crate) fn shell_quote(value: &str) -> String {
    let escaped = value.replace('\'', "'\\''");
    format!("'{escaped}'")
}

/// Runs `program` to completion and returns its stdout.
///
/// The child is killed if the deadline passes.
pub(crate) async fn run(
    program: &str,
    args: &[String],
    timeout: Duration,
    fallback_message: &str,
) -> Result<String, RemoteError> {
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let output = match tokio::time::timeout(timeout, command.output()).await {
        Ok(Ok(output)) => output,
        Ok(Err(e)) => {
            warn!("Failed to start {}: {}", program, e);
            return Err(RemoteError::Process {
                program: program.to_string(),
                message: e.to_string(),
            });
        }
        Err(_) => {
            warn!("{} timed out after {}s", program, timeout.as_secs());
            return Err(RemoteError::Process {
                program: program.to_string(),
                message: format!("timed out after {}s", timeout.as_secs()),
            });
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        warn!("{} exited with {}: {}", program, output.status, stderr);
        return Err(RemoteError::Process {
            program: program.to_string(),
            message: if stderr.is_empty() {
                fallback_message.to_string()
            } else {
                stderr
            },
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
