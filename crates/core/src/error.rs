//! Error types for the RustedReason domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; only the variants of
//! [`Error`] marked as loop failures ever leave a reason-act run.

use thiserror::Error;

/// The top-level error type for all RustedReason operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Loop failures ---
    #[error("Model invocation failed: {0}")]
    ModelInvocation(#[from] ModelError),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Run cancelled")]
    Cancelled,

    // --- Wrapper / setup errors ---
    #[error("Memory error: {0}")]
    Memory(#[from] MemoryError),

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl Error {
    /// The stage of the run that failed, for callers that report it.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::ModelInvocation(_) => "model",
            Self::ToolNotFound(_) => "dispatch",
            Self::Cancelled => "cancelled",
            Self::Memory(_) => "memory",
            Self::Config { .. } => "config",
        }
    }
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ModelError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by model backend, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model returned no completion")]
    EmptyCompletion,

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Model not configured: {0}")]
    NotConfigured(String),
}

/// Failures raised by a tool's own call.
///
/// These never abort a run: the dispatcher folds them into the
/// observation text so the model can correct itself.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{0}")]
    Failed(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Elapsed limit, in milliseconds.
    #[error("timed out after {0}ms")]
    Timeout(u64),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Progress sink is full")]
    Full,

    #[error("Progress sink is closed")]
    Closed,
}

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("Storage error: {0}")]
    Storage(String),
}
