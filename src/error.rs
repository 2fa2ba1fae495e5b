//! Error types for the ExpoCLI kernel.
//!
//! Per-query failures are never errors here: they travel inside
//! [`crate::executor::ExecutionResult`]. This enum covers startup and
//! transport failures only.

use thiserror::Error;

/// Main error type for kernel operations.
#[derive(Error, Debug)]
pub enum KernelError {
    /// Configuration errors (invalid config file, bad override values, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed requests arriving at the session boundary.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// I/O failures on stdin/stdout or while writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal application errors (unexpected states, bugs, etc.)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl KernelError {
    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a protocol error with the given message.
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) => "Configuration Error",
            Self::Protocol(_) => "Protocol Error",
            Self::Io(_) => "I/O Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using KernelError.
pub type Result<T> = std::result::Result<T, KernelError>;
