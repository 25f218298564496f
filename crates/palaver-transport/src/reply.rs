//! Normalized outcome of one exchange with the backend.

use palaver_core::advisory;
use palaver_core::RawReplyPayload;

/// Why an exchange failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    /// No answer within the configured bound; the request was abandoned.
    Timeout,
    /// The backend answered with a status outside 2xx.
    HttpError,
    /// The call could not complete, or its body was not JSON.
    NetworkError,
}

impl TransportErrorKind {
    /// User-facing text logged in place of a reply.
    pub fn advisory(&self) -> &'static str {
        match self {
            TransportErrorKind::Timeout => advisory::TIMEOUT,
            TransportErrorKind::HttpError | TransportErrorKind::NetworkError => {
                advisory::SERVER_ERROR
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::HttpError => "http_error",
            TransportErrorKind::NetworkError => "network_error",
        }
    }
}

impl std::fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of [`ChatBackend::send`](crate::ChatBackend::send).
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// The exchange produced a reply payload (possibly a locally
    /// substituted advisory).
    Delivered(RawReplyPayload),
    /// The exchange failed; the kind says how.
    Failed(TransportErrorKind),
}

impl Reply {
    /// Shorthand for a delivered plain-text reply.
    pub fn text(text: impl Into<String>) -> Self {
        Reply::Delivered(RawReplyPayload::scalar(text))
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Reply::Delivered(_))
    }

    pub fn error_kind(&self) -> Option<TransportErrorKind> {
        match self {
            Reply::Delivered(_) => None,
            Reply::Failed(kind) => Some(*kind),
        }
    }
}
