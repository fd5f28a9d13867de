use serde::Deserialize;
use thiserror::Error;

/// Everything that can go wrong while talking to the backend or the
/// `ssh`/`scp` binaries.
///
/// `Api` carries the backend's error envelope untouched so the UI can show
/// exactly what the server said.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// Backend answered with status >= 400.
    #[error("{message}{}", hint_suffix(.hint))]
    Api {
        status: u16,
        code: String,
        message: String,
        hint: Option<String>,
    },
    /// Connection refused, DNS failure, deadline exceeded.
    #[error("network error: {0}")]
    Network(String),
    /// A 2xx response whose body could not be parsed.
    #[error("malformed response: {0}")]
    Malformed(String),
    /// An authenticated call was attempted before login.
    #[error("not logged in")]
    Unauthenticated,
    /// Rejected locally before any request was sent.
    #[error("{0}")]
    Validation(String),
    /// An external program exited non-zero or timed out.
    #[error("{program} failed: {message}")]
    Process { program: String, message: String },
    /// Local file access failed.
    #[error("I/O error: {0}")]
    Io(String),
}

fn hint_suffix(hint: &Option<String>) -> String {
    hint.as_deref()
        .map(|h| format!(" (hint: {h})"))
        .unwrap_or_default()
}

#[derive(Deserialize, Default)]
struct ErrorEnvelope {
    #[serde(default)]
    error: ErrorBody,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
    hint: Option<String>,
}

impl RemoteError {
    /// Builds an `Api` error from a failed response body.
    ///
    /// Bodies that are not the `{error: {code, message, hint}}` envelope fall
    /// back to code `"error"` and the raw body text as the message.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let raw = String::from_utf8_lossy(body).trim().to_string();
        let envelope: ErrorEnvelope = serde_json::from_slice(body).unwrap_or_default();
        let message = envelope.error.message.unwrap_or_else(|| {
            if raw.is_empty() {
                format!("HTTP {status}")
            } else {
                raw
            }
        });
        RemoteError::Api {
            status,
            code: envelope.error.code.unwrap_or_else(|| "error".to_string()),
            message,
            hint: envelope.error.hint,
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(self, RemoteError::Unauthenticated)
            || matches!(self, RemoteError::Api { status: 401 | 403, .. })
    }
}

impl From<std::io::Error> for RemoteError {
    fn from(e: std::io::Error) -> Self {
        RemoteError::Io(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_fields_are_kept_verbatim() {
        let body = br#"{"error":{"code":"not_found","message":"Document missing","hint":"Check the id"}}"#;
        let err = RemoteError::from_response(404, body);
        assert_eq!(
            err,
            RemoteError::Api {
                status: 404,
                code: "not_found".into(),
                message: "Document missing".into(),
                hint: Some("Check the id".into()),
            }
        );
        assert_eq!(err.to_string(), "Document missing (hint: Check the id)");
    }

    #[test]
    fn non_json_body_becomes_message() {
        let err = RemoteError::from_response(502, b"Bad Gateway");
        match err {
            RemoteError::Api { code, message, hint, .. } => {
                assert_eq!(code, "error");
                assert_eq!(message, "Bad Gateway");
                assert!(hint.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn empty_body_mentions_status() {
        let err = RemoteError::from_response(500, b"");
        assert_eq!(err.to_string(), "HTTP 500");
    }

    #[test]
    fn auth_failures_are_detected() {
        assert!(RemoteError::Unauthenticated.is_auth_failure());
        assert!(RemoteError::from_response(401, b"").is_auth_failure());
        assert!(!RemoteError::Network("x".into()).is_auth_failure());
    }
}
