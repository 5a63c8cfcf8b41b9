//! Core error types for pomo-core.
//!
//! Every precondition of the session state machine is an explicit
//! [`SessionError`] variant; nothing is left to silently skew statistics.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pomo-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Session state machine misuse
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The ticker task panicked or was cancelled from outside.
    #[error("Ticker task failed: {0}")]
    Ticker(String),
}

/// Guarded preconditions of [`crate::Session`] operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("session is already paused")]
    AlreadyPaused,

    #[error("session is not paused")]
    NotPaused,

    /// Advancing is not allowed while paused.
    #[error("cannot advance while paused")]
    Paused,

    #[error("round is not over yet ({elapsed_ms}ms of {required_ms}ms elapsed)")]
    RoundNotOver { elapsed_ms: u64, required_ms: u64 },

    #[error("session has already been ended")]
    AlreadyEnded,

    /// Any mutation after `end_session`.
    #[error("session has ended")]
    Ended,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// No home directory to derive the config location from
    #[error("Could not determine the configuration directory")]
    NoConfigDir,
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
