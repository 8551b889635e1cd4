// Copyright (c) 2022-2023 The MobileCoin Foundation

use ledger_fil_apdu::StatusCode;

use crate::verify::VerificationError;

/// Flow name used for timeouts outside of an approval flow
pub const SESSION_FLOW: &str = "session";

/// Harness error type, aborts the current scenario
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// Device did not become ready
    #[error("Startup failed: {0}")]
    Startup(String),

    /// Bounded wait expired
    #[error("Timeout in flow '{flow}' at step {step}")]
    Timeout { flow: String, step: usize },

    /// Non-success status where success was expected
    #[error("Unexpected status {status}: {message}")]
    Protocol { status: StatusCode, message: String },

    /// Captured screen differs from (or is missing in) the golden set
    #[error("Snapshot mismatch in flow '{flow}' at index {index}")]
    SnapshotMismatch { flow: String, index: usize },

    /// Returned signature failed verification
    #[error("Verification failed: {0}")]
    Verification(#[from] VerificationError),

    /// Response value did not match expectation
    #[error("Assertion failed: {0}")]
    Assertion(String),

    /// Command client error
    #[error("Device error: {0}")]
    Device(ledger_fil::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Emulator driver / handle error
    #[error("Emulator error: {0}")]
    Emulator(String),
}

impl HarnessError {
    /// Build a timeout error for the provided flow and step
    pub fn timeout(flow: &str, step: usize) -> Self {
        Self::Timeout {
            flow: flow.to_string(),
            step,
        }
    }

    /// Attach flow context to timeouts, other errors are passed through
    pub fn in_flow(self, flow: &str, step: usize) -> Self {
        match self {
            Self::Timeout { .. } => Self::timeout(flow, step),
            e => e,
        }
    }

    /// Attach flow context to timeouts not yet bound to a flow
    pub fn or_flow(self, flow: &str, step: usize) -> Self {
        match self {
            Self::Timeout { flow: f, .. } if f == SESSION_FLOW => Self::timeout(flow, step),
            e => e,
        }
    }
}

impl From<anyhow::Error> for HarnessError {
    fn from(e: anyhow::Error) -> Self {
        Self::Emulator(format!("{e:#}"))
    }
}

/// Device status errors are reported as protocol errors, unanswered
/// requests as session timeouts
impl From<ledger_fil::Error> for HarnessError {
    fn from(e: ledger_fil::Error) -> Self {
        use ledger_fil::Error;

        match e {
            Error::Status { status, message } => Self::Protocol { status, message },
            Error::RequestTimeout | Error::UserTimeout => Self::timeout(SESSION_FLOW, 0),
            e => Self::Device(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors() {
        let e = HarnessError::from(ledger_fil::Error::RequestTimeout);
        assert!(matches!(e, HarnessError::Timeout { ref flow, step: 0 } if flow == SESSION_FLOW));

        let e = HarnessError::from(ledger_fil::Error::UserTimeout).in_flow("sign_basic", 13);
        assert!(matches!(e, HarnessError::Timeout { ref flow, step: 13 } if flow == "sign_basic"));

        let e = HarnessError::from(ledger_fil::Error::Status {
            status: StatusCode::DATA_INVALID,
            message: "Data is invalid".to_string(),
        });
        assert!(matches!(e, HarnessError::Protocol { status, .. } if status == StatusCode::DATA_INVALID));

        assert!(matches!(
            HarnessError::from(ledger_fil::Error::Busy),
            HarnessError::Device(ledger_fil::Error::Busy)
        ));
    }

    #[test]
    fn flow_context() {
        // Unbound timeouts pick up context
        let e = HarnessError::timeout(SESSION_FLOW, 0).or_flow("app_version", 0);
        assert!(matches!(e, HarnessError::Timeout { ref flow, .. } if flow == "app_version"));

        // Flow timeouts keep their original context
        let e = HarnessError::timeout("show_address", 2).or_flow("show_address_outer", 0);
        assert!(matches!(e, HarnessError::Timeout { ref flow, step: 2 } if flow == "show_address"));

        // Other errors pass through
        let e = HarnessError::Assertion("x".to_string()).in_flow("f", 1);
        assert!(matches!(e, HarnessError::Assertion(_)));
    }
}
