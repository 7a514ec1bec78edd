//! The one error the session state machine can observe.

use thiserror::Error;

/// A remote completion call that did not produce usable text.
///
/// The kind and message exist for logging. The session treats every value
/// the same way and answers with the persona's fallback turn.
#[derive(Debug, Error)]
#[error("remote call failed ({kind}): {message}")]
pub struct RemoteCallFailed {
    pub kind: FailureKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Connection, timeout, or body read failure
    Network,
    /// Non-2xx HTTP status
    Status(u16),
    /// Body did not decode, or decoded without any text
    Payload,
    /// No API key for the selected provider
    MissingCredentials,
    /// The task running the call panicked or was aborted
    Aborted,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Network => write!(f, "network"),
            FailureKind::Status(code) => write!(f, "status {}", code),
            FailureKind::Payload => write!(f, "payload"),
            FailureKind::MissingCredentials => write!(f, "missing credentials"),
            FailureKind::Aborted => write!(f, "aborted"),
        }
    }
}

impl RemoteCallFailed {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Network, message)
    }

    pub fn status(code: u16, message: impl Into<String>) -> Self {
        Self::new(FailureKind::Status(code), message)
    }

    pub fn payload(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Payload, message)
    }

    pub fn missing_credentials(provider: &str) -> Self {
        Self::new(
            FailureKind::MissingCredentials,
            format!("no API key configured for {}", provider),
        )
    }

    pub fn aborted(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Aborted, message)
    }
}

impl From<reqwest::Error> for RemoteCallFailed {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::payload(e.to_string())
        } else if let Some(status) = e.status() {
            Self::status(status.as_u16(), e.to_string())
        } else {
            Self::network(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind_and_message() {
        let err = RemoteCallFailed::status(503, "overloaded");
        assert_eq!(err.to_string(), "remote call failed (status 503): overloaded");
    }

    #[test]
    fn test_missing_credentials_names_provider() {
        let err = RemoteCallFailed::missing_credentials("Gemini");
        assert_eq!(err.kind, FailureKind::MissingCredentials);
        assert!(err.message.contains("Gemini"));
    }
}
