//! Error taxonomy shared by the session store, API client and pages.
//!
//! Every error renders a human-readable message through `Display`; pages
//! surface that message verbatim (inline text, banner, alert).

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;

// =============================================================================
// ERROR CODES
// =============================================================================

/// Grepable error code and retryable flag, printed by the CLI next to the message.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// Errors produced while reading or writing the persisted session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The stored session value is not valid JSON.
    #[error("stored session is corrupt: {0}")]
    Parse(String),

    /// The storage backend refused the operation (disabled, full, unreadable).
    #[error("session storage unavailable: {0}")]
    Storage(String),

    /// The session could not be serialized.
    #[error("session serialize failed: {0}")]
    Serialize(String),
}

impl ErrorCode for SessionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Parse(_) => "E_SESSION_PARSE",
            Self::Storage(_) => "E_STORAGE",
            Self::Serialize(_) => "E_SESSION_SERIALIZE",
        }
    }
}

// =============================================================================
// API
// =============================================================================

/// Errors produced by remote API calls.
///
/// `Display` is the operator-facing message: for `Request`,
/// `InvalidCredentials`, `Signup` and `NotFound` it is exactly the message
/// chosen by the response interpreter, with no prefix.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request did not complete before its deadline and was aborted.
    #[error("{operation} timed out after {timeout_ms} ms")]
    Timeout { operation: &'static str, timeout_ms: u64 },

    /// The request failed before a response arrived (DNS, connect, reset).
    #[error("{operation} request failed: {message}")]
    Transport { operation: &'static str, message: String },

    /// The response body was not valid JSON.
    #[error("Invalid JSON received from server")]
    InvalidResponse,

    /// The server answered with a non-success HTTP status.
    #[error("{message}")]
    Request { status: u16, message: String },

    /// Login answered `success: false`.
    #[error("{0}")]
    InvalidCredentials(String),

    /// Signup answered `success: false`.
    #[error("{0}")]
    Signup(String),

    /// The requested record does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// A successful login could not be persisted.
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ErrorCode for ApiError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "E_TIMEOUT",
            Self::Transport { .. } => "E_TRANSPORT",
            Self::InvalidResponse => "E_INVALID_RESPONSE",
            Self::Request { .. } => "E_REQUEST",
            Self::InvalidCredentials(_) => "E_INVALID_CREDENTIALS",
            Self::Signup(_) => "E_SIGNUP",
            Self::NotFound(_) => "E_NOT_FOUND",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
            Self::Session(err) => err.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Transport { .. } | Self::Request { status: 429 | 500..=599, .. }
        )
    }
}

// =============================================================================
// CONFIG
// =============================================================================

/// Errors produced while assembling configuration from flags and environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("invalid value for {var}: {value}")]
    InvalidNumber { var: &'static str, value: String },

    #[error("cannot locate storage file; set PLAYERDESK_STORAGE or HOME")]
    NoStorageLocation,
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidBaseUrl(_) => "E_CONFIG_BASE_URL",
            Self::InvalidNumber { .. } => "E_CONFIG_PARSE",
            Self::NoStorageLocation => "E_CONFIG_STORAGE",
        }
    }
}
