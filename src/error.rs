//! Error types.
//!
//! None of these abort an animation. Callers log them and fall back to the
//! default behavior (motion allowed, default option value).

use thiserror::Error;

/// Settings file could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("settings file unreadable: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings parse failed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A markup attribute carried an unusable value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AttributeError {
    #[error("attribute `{name}` is not an integer: {value:?}")]
    NotAnInteger { name: String, value: String },
}

/// The reduced-motion preference could not be determined.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MotionQueryError {
    #[error("reduced-motion variable `{0}` is not valid unicode")]
    NotUnicode(String),
    #[error("unrecognized reduced-motion value {0:?}")]
    Unrecognized(String),
}
