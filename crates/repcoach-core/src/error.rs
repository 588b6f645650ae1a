//! Core error types for repcoach-core.
//!
//! Plan validation and clock transitions fail loudly and synchronously.
//! Collaborator failures (audio, settings reads) have their own types so
//! callers can log and swallow them without touching the session.

use std::path::PathBuf;
use thiserror::Error;

use crate::timer::{ClockAction, ClockState};

/// Core error type for repcoach-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Illegal session clock transitions
    #[error("Transition error: {0}")]
    Transition(#[from] TransitionError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML decoding errors
    #[error("TOML error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML encoding errors
    #[error("TOML error: {0}")]
    TomlSer(#[from] toml::ser::Error),
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

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// The backing key-value store could not be read
    #[error("Settings store unavailable: {0}")]
    StoreUnavailable(String),
}

/// Workout plan validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A count or interval that must be at least one was zero
    #[error("Invalid value for '{field}': must be at least 1, got {value}")]
    NonPositive { field: &'static str, value: u32 },

    /// Derived durations do not fit in 64 bits
    #[error("Workout is too long: total duration overflows")]
    DurationOverflow,
}

/// A clock command issued from a state that does not accept it.
///
/// `elapsed_secs` is never modified when this is returned.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("cannot {action} a session that is {from}")]
pub struct TransitionError {
    pub action: ClockAction,
    pub from: ClockState,
}

/// Cue audio could not be played. Never fatal to a session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlaybackError {
    #[error("audio device unavailable: {0}")]
    DeviceUnavailable(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
