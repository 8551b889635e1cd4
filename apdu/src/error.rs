// Copyright (c) 2022-2023 The MobileCoin Foundation

/// APDU encoding / decoding errors
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ApduError {
    /// Derivation path string could not be parsed
    #[error("Invalid derivation path '{0}'")]
    InvalidPath(String),

    /// Derivation path has the wrong number of components
    #[error("Derivation path must have exactly {expected} components (found {actual})")]
    InvalidPathLength { expected: usize, actual: usize },

    /// Response buffer shorter than the encoded fields
    #[error("Response too short (expected at least {expected} bytes, found {actual})")]
    InvalidLength { expected: usize, actual: usize },

    /// Response contained non UTF-8 text
    #[error("Invalid UTF-8 in response field '{0}'")]
    InvalidUtf8(&'static str),

    /// Public key encoding not recognised
    #[error("Invalid public key encoding (prefix: 0x{0:02x})")]
    InvalidKey(u8),

    /// Empty payload where data was required
    #[error("Empty payload")]
    EmptyPayload,
}
