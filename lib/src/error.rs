// Copyright (c) 2022-2023 The MobileCoin Foundation

use ledger_fil_apdu::{ApduError, StatusCode};
use tokio::time::error::Elapsed;

/// Ledger Filecoin API Error Type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport IO error
    #[error("Transport error {0}")]
    Io(#[from] std::io::Error),

    /// Response framing was invalid
    #[error("Invalid response length (expected {expected}, found {actual})")]
    InvalidLength { expected: usize, actual: usize },

    /// Unexpected APDU response
    #[error("Unexpected APDU response")]
    UnexpectedResponse,

    /// Response payload could not be decoded
    #[error("Invalid response payload: {0}")]
    Apdu(#[from] ApduError),

    /// Device returned a non-success status
    #[error("Device returned {status}: {message}")]
    Status { status: StatusCode, message: String },

    /// Timeout waiting for user
    #[error("Timeout waiting for user interaction")]
    UserTimeout,

    /// Request timeout
    #[error("Timeout waiting for device response")]
    RequestTimeout,

    /// A command is already in flight on this handle
    #[error("Device busy (command already in flight)")]
    Busy,

    /// Pending command task was cancelled or panicked
    #[error("Pending command aborted: {0}")]
    Aborted(String),
}

impl From<Elapsed> for Error {
    fn from(_: Elapsed) -> Self {
        Error::RequestTimeout
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(e: tokio::task::JoinError) -> Self {
        Error::Aborted(e.to_string())
    }
}
