//! Network error taxonomy for backend calls.

use crate::logging::sanitize_message;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Maximum response-body characters kept for diagnostics.
const MAX_ERROR_BODY_CHARS: usize = 200;

pub type ApiResult<T> = Result<T, NetworkError>;

/// Failure of one fetch/create/update/delete call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// Backend answered with a non-success status.
    Status { code: u16, body: String },
    /// Request never produced a response (DNS, connect, timeout, TLS, ...).
    Transport { kind: &'static str, message: String },
    /// Response body could not be encoded or decoded.
    Decode(String),
    /// Request URL could not be built.
    InvalidUrl(String),
}

impl NetworkError {
    pub fn status(code: u16, body: &str) -> Self {
        Self::Status {
            code,
            body: sanitize_message(body.trim(), MAX_ERROR_BODY_CHARS),
        }
    }

    /// Short stable code for log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Status { .. } => "http_status",
            Self::Transport { kind, .. } => *kind,
            Self::Decode(_) => "decode",
            Self::InvalidUrl(_) => "invalid_url",
        }
    }
}

impl Display for NetworkError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status { code, body } if body.is_empty() => {
                write!(f, "request failed with status {code}")
            }
            Self::Status { code, body } => write!(f, "request failed with status {code}: {body}"),
            Self::Transport { kind, message } => write!(f, "{kind} error: {message}"),
            Self::Decode(message) => write!(f, "invalid response body: {message}"),
            Self::InvalidUrl(message) => write!(f, "invalid request url: {message}"),
        }
    }
}

impl Error for NetworkError {}

impl From<serde_json::Error> for NetworkError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value.to_string())
    }
}

/// Buckets a transport failure description into a stable kind.
pub(crate) fn classify_transport_error_kind(raw: &str) -> &'static str {
    let lower = raw.to_ascii_lowercase();
    if lower.contains("timed out") || lower.contains("timeout") {
        "timeout"
    } else if lower.contains("tls") || lower.contains("ssl") || lower.contains("certificate") {
        "tls"
    } else if lower.contains("dns") {
        "dns"
    } else if lower.contains("connection") || lower.contains("connect") {
        "connection"
    } else {
        "transport"
    }
}
