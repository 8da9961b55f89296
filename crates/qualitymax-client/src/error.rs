//! Error types for the execution client.

use std::time::Duration;

/// Execution lifecycle errors.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    /// The service rejected the run or failed to start it.
    #[error("failed to trigger tests: {message}")]
    Trigger { message: String },

    /// Execution id unknown or expired, or results requested before completion.
    #[error("execution {execution_id} {detail}")]
    NotFound {
        execution_id: String,
        detail: &'static str,
    },

    /// Status lookup failed with a non-404 error code.
    #[error("failed to get status: {message}")]
    Status { message: String },

    /// Results lookup failed with a non-404 error code.
    #[error("failed to get results: {message}")]
    Results { message: String },

    /// Wall-clock budget exhausted while polling.
    #[error("execution timed out after {} seconds", timeout.as_secs())]
    Timeout { timeout: Duration },

    /// Project listing or resolution failed.
    #[error("project lookup failed: {message}")]
    Project { message: String },

    /// Transport-level failure (connect, DNS, TLS, body read).
    #[error("network error: {message}")]
    Network { message: String },

    /// Response body could not be decoded.
    #[error("invalid response: {message}")]
    InvalidResponse { message: String },

    /// Client configuration error.
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl ExecutionError {
    /// Exit code for CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            // Caller-side problems
            Self::Config { .. } => 2,
            Self::Project { .. } => 2,

            // Service refused or lost the run
            Self::Trigger { .. } => 3,
            Self::NotFound { .. } => 3,

            // Budget exhausted
            Self::Timeout { .. } => 4,

            // Service/transport failures
            Self::Status { .. } => 5,
            Self::Results { .. } => 5,
            Self::Network { .. } => 5,
            Self::InvalidResponse { .. } => 5,
        }
    }

    /// Whether the error means the execution id is no longer usable.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<reqwest::Error> for ExecutionError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network {
            message: err.to_string(),
        }
    }
}

/// Result type for execution client operations.
pub type ExecutionResult<T> = Result<T, ExecutionError>;
