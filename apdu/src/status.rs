// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Status words returned by the Filecoin app

use std::fmt::Display;

use ledger_apdu::APDUErrorCode;

/// Status word wrapper, mapping codes to the app's status messages
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct StatusCode(pub u16);

impl StatusCode {
    /// Success
    pub const OK: StatusCode = StatusCode(0x9000);
    /// Data is invalid (rejected before review)
    pub const DATA_INVALID: StatusCode = StatusCode(0x6984);
    /// Command not allowed (rejected by user)
    pub const COMMAND_NOT_ALLOWED: StatusCode = StatusCode(0x6986);
    /// Application not open
    pub const APP_NOT_OPEN: StatusCode = StatusCode(0x6e00);
    /// Instruction not supported
    pub const INS_NOT_SUPPORTED: StatusCode = StatusCode(0x6d00);
    /// Wrong P1/P2
    pub const INVALID_P1P2: StatusCode = StatusCode(0x6b00);
    /// Wrong length
    pub const WRONG_LENGTH: StatusCode = StatusCode(0x6700);

    /// Check whether this status indicates success
    pub fn is_ok(&self) -> bool {
        *self == Self::OK
    }

    /// Fetch the status message for this code
    pub fn message(&self) -> String {
        let m = match APDUErrorCode::try_from(self.0) {
            Ok(APDUErrorCode::NoError) => "No errors",
            Ok(APDUErrorCode::ExecutionError) => "Execution Error",
            Ok(APDUErrorCode::WrongLength) => "Wrong Length",
            Ok(APDUErrorCode::EmptyBuffer) => "Empty Buffer",
            Ok(APDUErrorCode::OutputBufferTooSmall) => "Output buffer too small",
            Ok(APDUErrorCode::DataInvalid) => "Data is invalid",
            Ok(APDUErrorCode::ConditionsNotSatisfied) => "Conditions not satisfied",
            Ok(APDUErrorCode::CommandNotAllowed) => "Command not allowed",
            Ok(APDUErrorCode::BadKeyHandle) => "Bad key handle",
            Ok(APDUErrorCode::InvalidP1P2) => "Invalid P1/P2",
            Ok(APDUErrorCode::InsNotSupported) => "Instruction not supported",
            Ok(APDUErrorCode::ClaNotSupported) => "App does not seem to be open",
            Ok(APDUErrorCode::Unknown) => "Unknown error",
            Ok(APDUErrorCode::SignVerifyError) => "Sign/verify error",
            Err(_) => return format!("Unknown Status Code: {}", self.0),
        };

        m.to_string()
    }

    /// Build the full status message for a response, appending any
    /// printable error detail returned alongside a failure status
    pub fn message_with(&self, data: &[u8]) -> String {
        let m = self.message();

        if self.is_ok() || data.is_empty() {
            return m;
        }

        match std::str::from_utf8(data) {
            Ok(s) if s.chars().all(|c| c.is_ascii() && !c.is_ascii_control()) => {
                format!("{m} : {s}")
            }
            _ => m,
        }
    }
}

impl From<u16> for StatusCode {
    fn from(v: u16) -> Self {
        Self(v)
    }
}

impl Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:04x}", self.0)
    }
}
