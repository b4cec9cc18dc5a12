//! Error types for kolgate.
//!
//! Uses `thiserror` for structured error types that map to exit codes.
//!
//! ## Error Taxonomy
//!
//! The decision functions (classification, consumption, access checks) are
//! total and never fail. Errors only arise at the edges:
//! - **Configuration**: config file parsing, validation, or pattern files
//! - **Storage**: reading or writing persisted session state
//! - **Task**: invalid lifecycle transitions, unknown task ids or blank requests
//! - **Denied**: quota exhausted or feature access denied (CLI surface only)
//! - **Internal**: unexpected errors, bugs, or unclassified issues
//!
//! Each error has a stable error code (e.g., `KOL-C001`) for programmatic handling.

pub mod suggestions;

use thiserror::Error;

use crate::core::tasks::TaskError;
pub use suggestions::FixSuggestion;

// =============================================================================
// Error Categories
// =============================================================================

/// High-level error categories for classification and routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Configuration issues (parse errors, invalid values, missing files).
    Configuration,
    /// Storage issues (unreadable state, invalid session ids).
    Storage,
    /// Task lifecycle violations.
    Task,
    /// A policy decision denied the request.
    Denied,
    /// Internal errors (bugs, unexpected state, unclassified).
    Internal,
}

impl ErrorCategory {
    /// Returns a human-readable description of the category.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Configuration => "Configuration error",
            Self::Storage => "Storage error",
            Self::Task => "Task error",
            Self::Denied => "Request denied",
            Self::Internal => "Internal error",
        }
    }

    /// Returns a short code prefix for this category.
    #[must_use]
    pub const fn code_prefix(&self) -> &'static str {
        match self {
            Self::Configuration => "C",
            Self::Storage => "S",
            Self::Task => "T",
            Self::Denied => "D",
            Self::Internal => "X",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

// =============================================================================
// Exit Codes
// =============================================================================

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// Unexpected failure
    GeneralError = 1,
    /// Parse/config errors, invalid arguments
    ParseError = 3,
    /// Quota exhausted or access denied
    Denied = 5,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

/// Main error type for kolgate operations.
#[derive(Error, Debug)]
pub enum KolgateError {
    // ==========================================================================
    // Configuration errors
    // ==========================================================================
    /// Generic configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Error parsing a configuration or pattern file.
    #[error("config parse error at {path}: {message}")]
    ConfigParse { path: String, message: String },

    /// Invalid value in configuration.
    #[error("invalid config value for '{key}': {message}")]
    ConfigInvalid {
        key: String,
        value: String,
        message: String,
    },

    // ==========================================================================
    // Storage errors
    // ==========================================================================
    /// Session id contains characters that cannot be used as a file name.
    #[error("invalid session id '{0}': use 1-64 characters from [A-Za-z0-9_-]")]
    InvalidSession(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ==========================================================================
    // Task errors
    // ==========================================================================
    /// Task lifecycle violation or unusable request.
    #[error(transparent)]
    Task(#[from] TaskError),

    // ==========================================================================
    // Denials surfaced by the CLI
    // ==========================================================================
    /// No credits left to cover the message.
    #[error("credit limit reached; next reset in {resets_in}")]
    QuotaExhausted { resets_in: String },

    /// The access policy denied a feature.
    #[error("access to '{feature}' denied")]
    AccessDenied { feature: String },

    // ==========================================================================
    // Generic wrapper
    // ==========================================================================
    /// Catch-all for other errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl KolgateError {
    /// Map error to process exit code.
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        match self {
            Self::Config(_)
            | Self::ConfigParse { .. }
            | Self::ConfigInvalid { .. }
            | Self::InvalidSession(_) => ExitCode::ParseError,

            Self::QuotaExhausted { .. } | Self::AccessDenied { .. } => ExitCode::Denied,

            Self::Io(_) | Self::Json(_) | Self::Task(_) | Self::Other(_) => {
                ExitCode::GeneralError
            }
        }
    }

    /// Returns the error category for classification and routing.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_) | Self::ConfigParse { .. } | Self::ConfigInvalid { .. } => {
                ErrorCategory::Configuration
            }
            Self::InvalidSession(_) | Self::Io(_) | Self::Json(_) => ErrorCategory::Storage,
            Self::Task(_) => ErrorCategory::Task,
            Self::QuotaExhausted { .. } | Self::AccessDenied { .. } => ErrorCategory::Denied,
            Self::Other(_) => ErrorCategory::Internal,
        }
    }

    /// Stable error code, e.g. `KOL-C001`.
    #[must_use]
    pub fn error_code(&self) -> String {
        let number = match self {
            Self::Config(_)
            | Self::InvalidSession(_)
            | Self::Task(_)
            | Self::QuotaExhausted { .. }
            | Self::Other(_) => 1,
            Self::ConfigParse { .. } | Self::Io(_) | Self::AccessDenied { .. } => 2,
            Self::ConfigInvalid { .. } | Self::Json(_) => 3,
        };
        format!("KOL-{}{number:03}", self.category().code_prefix())
    }

    /// Whether a retry could succeed without changing input.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::QuotaExhausted { .. })
    }

    /// Actionable fixes for this error, most useful first.
    #[must_use]
    pub fn fix_suggestions(&self) -> Vec<FixSuggestion> {
        match self {
            Self::ConfigParse { path, message } => {
                suggestions::config_parse_suggestions(path, message)
            }
            Self::ConfigInvalid {
                key,
                value,
                message,
            } => suggestions::config_invalid_suggestions(key, value, message),
            Self::InvalidSession(session) => suggestions::invalid_session_suggestions(session),
            Self::QuotaExhausted { resets_in } => {
                suggestions::quota_exhausted_suggestions(resets_in)
            }
            Self::AccessDenied { feature } => suggestions::access_denied_suggestions(feature),
            Self::Json(_) => suggestions::corrupt_state_suggestions(),
            Self::Config(_) => vec![FixSuggestion::new(
                vec!["kolgate config".to_string()],
                "Check the config file and KOLGATE_* environment variables.",
            )],
            Self::Io(_) | Self::Task(_) | Self::Other(_) => Vec::new(),
        }
    }
}

/// Result type alias for kolgate operations.
pub type Result<T> = std::result::Result<T, KolgateError>;
