//! Shared error type across tally crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Empty, missing or oversized key.
    InvalidKey,
    /// Key is not present in the store.
    NotFound,
    /// Malformed input (configuration, request framing).
    BadRequest,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Downstream collaborator did not accept the call.
    Unavailable,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::InvalidKey => "INVALID_KEY",
            ClientCode::NotFound => "NOT_FOUND",
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Unavailable => "UNAVAILABLE",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, TallyError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum TallyError {
    #[error("invalid key: {0}")]
    InvalidKey(String),
    #[error("key not found: {0}")]
    NotFound(String),
    #[error("health sink unavailable: {0}")]
    SinkUnavailable(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl TallyError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            TallyError::InvalidKey(_) => ClientCode::InvalidKey,
            TallyError::NotFound(_) => ClientCode::NotFound,
            TallyError::SinkUnavailable(_) => ClientCode::Unavailable,
            TallyError::InvalidConfig(_) => ClientCode::BadRequest,
            TallyError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            TallyError::Internal(_) => ClientCode::Internal,
        }
    }

    /// Expected per-call outcomes that are answered to the client, not logged as failures.
    pub fn is_client_error(&self) -> bool {
        matches!(self, TallyError::InvalidKey(_) | TallyError::NotFound(_))
    }
}
