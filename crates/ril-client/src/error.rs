//! Error types for the RIL client.

use ril_wire::{ModemErrorCode, WireError};
use thiserror::Error;

/// Errors raised by the client itself (as opposed to results of a request).
#[derive(Error, Debug)]
pub enum RilError {
    /// A request with this serial is already in flight.
    #[error("serial {0} is already in flight")]
    DuplicateSerial(i32),

    /// No request with this serial is in flight.
    #[error("no request in flight with serial {0}")]
    NotFound(i32),

    /// Wire codec error.
    #[error("wire error: {0}")]
    Wire(#[from] WireError),

    /// The transport refused a frame.
    #[error("transport error: {0}")]
    Transport(String),

    /// The client thread has gone away.
    #[error("client channel closed")]
    ChannelClosed,

    /// Configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The client thread could not be started.
    #[error("failed to spawn client thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Why a request did not succeed. This is what a result sink receives.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// The modem (or the client on its behalf) reported an error code.
    #[error("modem error: {0}")]
    Modem(ModemErrorCode),

    /// The response could not be decoded.
    #[error("malformed response: {0}")]
    MalformedResponse(WireError),
}

impl CommandError {
    /// Failure delivered when the modem cannot be reached.
    pub fn radio_not_available() -> Self {
        CommandError::Modem(ModemErrorCode::RadioNotAvailable)
    }

    /// The modem error code, if this is a modem error.
    pub fn modem_code(&self) -> Option<ModemErrorCode> {
        match self {
            CommandError::Modem(code) => Some(*code),
            CommandError::MalformedResponse(_) => None,
        }
    }
}

/// Errors loading a [`ClientConfig`](crate::ClientConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The YAML was invalid.
    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, RilError>;
