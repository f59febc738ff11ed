use std::io;
use thiserror::Error;

/// Error types for creature loading and playback
#[derive(Error, Debug)]
pub enum CreatureError {
    /// I/O Error while reading a creature document
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed or missing document sections
    #[error("Load error: {0}")]
    Load(String),

    /// Unknown animation name
    #[error("Animation not found: {0}")]
    NotFound(String),

    /// Custom time range whose start is not before its end
    #[error("Invalid time range: start {start} must be less than end {end}")]
    InvalidRange { start: i32, end: i32 },

    /// A required dependency (target creature, active animation) is not set
    #[error("Uninitialized: no {0} set")]
    Uninitialized(&'static str),
}

impl From<serde_json::Error> for CreatureError {
    fn from(err: serde_json::Error) -> Self {
        Self::Load(format!("malformed document: {err}"))
    }
}

#[cfg(feature = "zip")]
impl From<zip::result::ZipError> for CreatureError {
    fn from(err: zip::result::ZipError) -> Self {
        Self::Load(format!("invalid zip archive: {err}"))
    }
}

/// Result type using CreatureError
pub type Result<T> = std::result::Result<T, CreatureError>;
