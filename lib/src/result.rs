// Copyright (c) 2022-2023 The MobileCoin Foundation

use ledger_fil_apdu::StatusCode;

use crate::Error;

/// Status-coded command result
///
/// A payload is present if and only if the status is `0x9000` ("No errors").
#[derive(Clone, Debug, PartialEq)]
pub struct CommandResult<P> {
    status: StatusCode,
    message: String,
    payload: Option<P>,
}

impl<P> CommandResult<P> {
    /// Build a successful result with the provided payload
    pub fn ok(payload: P) -> Self {
        Self {
            status: StatusCode::OK,
            message: StatusCode::OK.message(),
            payload: Some(payload),
        }
    }

    /// Build a failed result for a non-success status
    pub fn failed(status: StatusCode, message: impl Into<String>) -> Result<Self, Error> {
        // Success without a payload is a malformed response
        if status.is_ok() {
            return Err(Error::UnexpectedResponse);
        }

        Ok(Self {
            status,
            message: message.into(),
            payload: None,
        })
    }

    /// Fetch the status word
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Fetch the status message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Fetch the response payload, present only on success
    pub fn payload(&self) -> Option<&P> {
        self.payload.as_ref()
    }

    /// Check whether the command succeeded
    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }

    /// Convert into the payload, mapping failure statuses to [Error::Status]
    pub fn into_payload(self) -> Result<P, Error> {
        match self.payload {
            Some(p) => Ok(p),
            None => Err(Error::Status {
                status: self.status,
                message: self.message,
            }),
        }
    }
}
