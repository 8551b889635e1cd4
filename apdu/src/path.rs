// Copyright (c) 2022-2023 The MobileCoin Foundation

//! BIP-44 derivation paths for Filecoin accounts
//!
//! Paths always have five components (`m/44'/461'/account'/change/index`).
//! The first three components are hardened regardless of annotation,
//! the remaining components are hardened only when marked with `'`.
//!
//! ## Encoding
//! ```text
//!   0                   1                   2                   3
//!   0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |                      PURPOSE (u32, LE)                        |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |                     COIN TYPE (u32, LE)                       |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |                      ACCOUNT (u32, LE)                        |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |                       CHANGE (u32, LE)                        |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |                    ADDRESS INDEX (u32, LE)                    |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```

use std::{fmt::Display, str::FromStr};

use byteorder::{ByteOrder, LittleEndian};

use crate::ApduError;

/// Hardened derivation flag
pub const HARDENED: u32 = 0x8000_0000;

/// Number of path components
pub const PATH_LEN: usize = 5;

/// Number of leading components that are always hardened
pub const HARDENED_PREFIX: usize = 3;

/// Encoded path length in bytes
pub const PATH_ENCODED_LEN: usize = PATH_LEN * 4;

/// Filecoin BIP-44 derivation path, immutable once constructed
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DerivationPath {
    components: [u32; PATH_LEN],
}

impl DerivationPath {
    /// Create a path from raw component values and explicit hardening markers,
    /// applying the fixed hardening policy to the first three components
    pub fn new(values: [u32; PATH_LEN], hardened: [bool; PATH_LEN]) -> Result<Self, ApduError> {
        let mut components = [0u32; PATH_LEN];

        for (i, (v, h)) in values.iter().zip(hardened.iter()).enumerate() {
            if v & HARDENED != 0 {
                return Err(ApduError::InvalidPath(format!(
                    "component {i} out of range ({v})"
                )));
            }

            components[i] = match i < HARDENED_PREFIX || *h {
                true => v | HARDENED,
                false => *v,
            };
        }

        Ok(Self { components })
    }

    /// Create a standard Filecoin path `m/44'/461'/{account}'/{change}/{index}`
    pub fn filecoin(account: u32, change: u32, index: u32) -> Result<Self, ApduError> {
        Self::new([44, 461, account, change, index], [false; PATH_LEN])
    }

    /// Fetch path components (including hardened flags)
    pub fn components(&self) -> &[u32; PATH_LEN] {
        &self.components
    }

    /// Check whether the component at `index` is hardened
    pub fn is_hardened(&self, index: usize) -> bool {
        self.components
            .get(index)
            .map(|c| c & HARDENED != 0)
            .unwrap_or(false)
    }

    /// Encode path for transmission to the device
    pub fn to_bytes(&self) -> [u8; PATH_ENCODED_LEN] {
        let mut buff = [0u8; PATH_ENCODED_LEN];
        LittleEndian::write_u32_into(&self.components, &mut buff);
        buff
    }

    /// Decode an encoded path
    pub fn from_bytes(buff: &[u8]) -> Result<Self, ApduError> {
        if buff.len() < PATH_ENCODED_LEN {
            return Err(ApduError::InvalidLength {
                expected: PATH_ENCODED_LEN,
                actual: buff.len(),
            });
        }

        let mut components = [0u32; PATH_LEN];
        LittleEndian::read_u32_into(&buff[..PATH_ENCODED_LEN], &mut components);

        // Re-apply the hardening policy to decoded values
        for c in components.iter_mut().take(HARDENED_PREFIX) {
            *c |= HARDENED;
        }

        Ok(Self { components })
    }
}

impl FromStr for DerivationPath {
    type Err = ApduError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let body = trimmed
            .strip_prefix("m/")
            .ok_or_else(|| ApduError::InvalidPath(s.to_string()))?;

        let parts: Vec<_> = body.split('/').collect();
        if parts.len() != PATH_LEN {
            return Err(ApduError::InvalidPathLength {
                expected: PATH_LEN,
                actual: parts.len(),
            });
        }

        let mut values = [0u32; PATH_LEN];
        let mut hardened = [false; PATH_LEN];

        for (i, p) in parts.iter().enumerate() {
            let (n, h) = match p.strip_suffix(['\'', 'h', 'H']) {
                Some(n) => (n, true),
                None => (*p, false),
            };

            values[i] = n
                .parse::<u32>()
                .map_err(|_| ApduError::InvalidPath(s.to_string()))?;
            hardened[i] = h;
        }

        Self::new(values, hardened)
    }
}

impl Display for DerivationPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "m")?;
        for c in &self.components {
            match c & HARDENED != 0 {
                true => write!(f, "/{}'", c & !HARDENED)?,
                false => write!(f, "/{c}")?,
            }
        }
        Ok(())
    }
}
