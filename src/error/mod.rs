//! Error types for Parley.

pub mod unified;

pub use unified::{ErrorCategory, RecoverySuggestion};

use std::fmt;

use thiserror::Error;

/// Why a `converse` call stopped waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The caller's cancellation token fired.
    Token,
    /// The caller-supplied deadline elapsed.
    Deadline,
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token => f.write_str("cancellation requested"),
            Self::Deadline => f.write_str("deadline exceeded"),
        }
    }
}

/// Primary error type for all Parley operations.
#[derive(Error, Debug)]
pub enum ParleyError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api {
        status: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limited: retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    /// The remote run reached `failed`. Carries the remote reason verbatim.
    #[error("Run {run_id} failed: {reason}")]
    RunFailed { run_id: String, reason: String },

    #[error("Cancelled: {0}")]
    Cancelled(CancelReason),

    #[error("Tool {name} not found. Available tools: {available:?}")]
    ToolNotFound { name: String, available: Vec<String> },

    #[error("Tool execution error: {tool_name}: {message}")]
    ToolExecution { tool_name: String, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl ParleyError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
            source: None,
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Authentication(_) => ErrorCategory::Authentication,
            Self::RateLimited { .. } => ErrorCategory::RateLimit,
            Self::Network(_) => ErrorCategory::Network,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Api { status, .. } => match status {
                401 | 403 => ErrorCategory::Authentication,
                429 => ErrorCategory::RateLimit,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Api,
            },
            Self::RunFailed { .. } => ErrorCategory::Run,
            Self::Cancelled(_) => ErrorCategory::Cancelled,
            Self::ToolNotFound { .. } | Self::ToolExecution { .. } => ErrorCategory::ToolExecution,
            _ => ErrorCategory::Unknown,
        }
    }

    /// Whether this error is potentially retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::RateLimit | ErrorCategory::Network | ErrorCategory::Server
        )
    }

    /// Whether this error came from talking to the remote services rather than
    /// from the run itself or the caller.
    pub fn is_remote_service_failure(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Authentication
                | ErrorCategory::RateLimit
                | ErrorCategory::Network
                | ErrorCategory::Server
                | ErrorCategory::Api
        )
    }

    /// Suggest what the caller can do next.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self {
            Self::Api { status: 404, .. } | Self::InvalidArgument(_) => {
                RecoverySuggestion::CheckIdentifiers
            }
            Self::Io(_) => RecoverySuggestion::CheckConfiguration,
            _ => match self.category() {
                ErrorCategory::Authentication => RecoverySuggestion::CheckCredentials,
                ErrorCategory::RateLimit | ErrorCategory::Network | ErrorCategory::Server => {
                    RecoverySuggestion::RetryWithBackoff
                }
                ErrorCategory::Configuration => RecoverySuggestion::CheckConfiguration,
                ErrorCategory::Run => RecoverySuggestion::InspectRun,
                ErrorCategory::Cancelled => RecoverySuggestion::ResendMessage,
                ErrorCategory::ToolExecution => RecoverySuggestion::CheckToolImplementation,
                _ => RecoverySuggestion::None,
            },
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ParleyError>;
