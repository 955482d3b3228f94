//! Error types for dialogbox

use thiserror::Error;

use crate::config::Mode;

#[derive(Error, Debug)]
pub enum DialogError {
    #[error("Unable to parse command line: {0}")]
    CommandLine(String),

    #[error("Unable to parse extra options: {0}")]
    ExtraOptions(String),

    #[error("Invalid value for --{option}: {message}")]
    InvalidOption { option: &'static str, message: String },

    #[error("{0:?} mode is not supported outside X11")]
    UnsupportedBackend(Mode),

    #[error("Slot table error: {0}")]
    SlotTable(String),

    #[error("Timed out after {waited_ms} ms waiting for {what}")]
    HandshakeTimeout { what: String, waited_ms: u64 },

    #[error("Window system error: {0}")]
    Window(String),

    #[error("Settings error: {0}")]
    Settings(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DialogError {
    pub fn invalid(option: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidOption {
            option,
            message: message.into(),
        }
    }
}

impl From<x11rb::errors::ConnectError> for DialogError {
    fn from(e: x11rb::errors::ConnectError) -> Self {
        Self::Window(e.to_string())
    }
}

impl From<x11rb::errors::ConnectionError> for DialogError {
    fn from(e: x11rb::errors::ConnectionError) -> Self {
        Self::Window(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DialogError>;
