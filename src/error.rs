//! Unified error hierarchy for nutrirs
//!
//! Separates local input problems from the three ways a remote diet-plan
//! call can fail, so callers can tell a backend outage from contract drift.

use thiserror::Error;

/// Top-level error type for all nutrirs operations
#[derive(Debug, Error)]
pub enum NutriError {
    /// Profile or argument outside the accepted domain
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    /// Remote service answered with a non-success status
    #[error("Remote service error: HTTP {status}")]
    RemoteService { status: u16 },

    /// Remote service unreachable or timed out
    #[error("Network error: {0}")]
    Network(String),

    /// Remote payload could not be decoded or broke the response contract
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for nutrirs operations
pub type Result<T> = std::result::Result<T, NutriError>;

impl NutriError {
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        NutriError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Check if a manual retry of the same request could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            NutriError::Network(_) => true,
            NutriError::RemoteService { status } => *status >= 500,
            _ => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            NutriError::InvalidInput { .. } => ErrorSeverity::Warning,
            NutriError::Network(_) => ErrorSeverity::Warning,
            NutriError::RemoteService { .. } => ErrorSeverity::Error,
            NutriError::MalformedResponse(_) => ErrorSeverity::Critical,
            NutriError::Configuration(_) => ErrorSeverity::Error,
            NutriError::Io(_) => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            NutriError::InvalidInput { field, reason } => {
                format!("Please check your {}: {}", field, reason)
            }
            NutriError::RemoteService { .. } | NutriError::MalformedResponse(_) => {
                "Failed to generate diet plan. Please try again later.".to_string()
            }
            NutriError::Network(_) => {
                "Could not reach the diet plan service. Check your connection and retry."
                    .to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl From<reqwest::Error> for NutriError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            NutriError::MalformedResponse(err.to_string())
        } else if let Some(status) = err.status() {
            NutriError::RemoteService {
                status: status.as_u16(),
            }
        } else {
            NutriError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for NutriError {
    fn from(err: serde_json::Error) -> Self {
        NutriError::MalformedResponse(err.to_string())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Contract violation that needs operator attention
    Critical,
    /// Error that prevents the operation
    Error,
    /// Recoverable by the user (fix input or retry)
    Warning,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Critical => tracing::Level::ERROR,
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
        }
    }
}
