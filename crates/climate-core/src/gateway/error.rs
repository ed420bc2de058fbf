//! Errors surfaced by the request gateway.

use std::fmt;

/// Failure category for a gateway call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayErrorKind {
    /// Response received with a non-success status (4xx, 5xx)
    RequestFailed,
    /// Request never completed (DNS, connect, timeout)
    Transport,
    /// Request body could not be serialized to JSON
    Encode,
}

impl fmt::Display for GatewayErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayErrorKind::RequestFailed => write!(f, "request_failed"),
            GatewayErrorKind::Transport => write!(f, "transport"),
            GatewayErrorKind::Encode => write!(f, "encode"),
        }
    }
}

/// Error returned by `RequestGateway` calls. Never retried by the gateway.
#[derive(Debug)]
pub enum GatewayError {
    /// The server answered with a non-success status.
    RequestFailed {
        status: u16,
        url: String,
        /// Raw response body, if any
        body: Option<String>,
    },
    /// The request could not complete.
    Transport { url: String, source: reqwest::Error },
    /// The request body could not be serialized.
    Encode { url: String, source: serde_json::Error },
}

impl GatewayError {
    /// Creates a non-success status error, keeping the body for diagnostics.
    pub fn request_failed(status: u16, url: impl Into<String>, body: &str) -> Self {
        let body = body.trim();
        Self::RequestFailed {
            status,
            url: url.into(),
            body: (!body.is_empty()).then(|| body.to_string()),
        }
    }

    pub fn kind(&self) -> GatewayErrorKind {
        match self {
            GatewayError::RequestFailed { .. } => GatewayErrorKind::RequestFailed,
            GatewayError::Transport { .. } => GatewayErrorKind::Transport,
            GatewayError::Encode { .. } => GatewayErrorKind::Encode,
        }
    }

    /// HTTP status code for `RequestFailed`, `None` otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::RequestFailed { status, .. } => Some(*status),
            GatewayError::Transport { .. } | GatewayError::Encode { .. } => None,
        }
    }

    /// Whether the transport failure was a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, GatewayError::Transport { source, .. } if source.is_timeout())
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::RequestFailed { status, url, .. } => {
                write!(f, "HTTP error! status: {status} ({url})")
            }
            GatewayError::Transport { url, source } => {
                let reason = if source.is_timeout() {
                    "Request timed out"
                } else if source.is_connect() {
                    "Connection failed"
                } else {
                    "Network error"
                };
                write!(f, "{reason} ({url}): {source}")
            }
            GatewayError::Encode { url, source } => {
                write!(f, "Failed to encode request body for {url}: {source}")
            }
        }
    }
}

impl std::error::Error for GatewayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GatewayError::RequestFailed { .. } => None,
            GatewayError::Transport { source, .. } => Some(source),
            GatewayError::Encode { source, .. } => Some(source),
        }
    }
}

/// Result type for gateway operations.
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_failed_carries_status() {
        let err = GatewayError::request_failed(404, "http://api/x", "");
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.kind(), GatewayErrorKind::RequestFailed);
        assert_eq!(err.to_string(), "HTTP error! status: 404 (http://api/x)");
    }

    #[test]
    fn test_request_failed_keeps_body() {
        let err = GatewayError::request_failed(500, "http://api/x", " boom \n");
        match err {
            GatewayError::RequestFailed { body, .. } => assert_eq!(body.as_deref(), Some("boom")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(GatewayErrorKind::Transport.to_string(), "transport");
        assert_eq!(GatewayErrorKind::Encode.to_string(), "encode");
    }
}
