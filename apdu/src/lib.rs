// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Protocol / APDU definitions for Filecoin app communication
//!
//! This module provides request builders and response decoders for the
//! Filecoin ledger application, along with the canonical transaction digest
//! and BIP-44 derivation path encoding used by the app.
//!
//! All integer path components are little-endian, response framing follows
//! the app's length-prefixed layout (see the per-module diagrams).

pub use ledger_apdu::{APDUAnswer, APDUCommand};

pub mod address;
pub mod app_info;
pub mod digest;
pub mod path;
pub mod sign;
pub mod status;

mod error;
mod helpers;
pub use error::ApduError;

pub use path::DerivationPath;
pub use status::StatusCode;

/// Filecoin APDU Class
pub const FIL_APDU_CLA: u8 = 0x06;

/// Ledger dashboard / BOLOS APDU class (device info)
pub const DEVICE_APDU_CLA: u8 = 0xe0;

/// Maximum payload chunk length for signing requests
pub const CHUNK_SIZE: usize = 250;

/// Filecoin APDU instruction codes
#[derive(Copy, Clone, Debug, PartialEq, num_enum::TryFromPrimitive, strum::Display)]
#[repr(u8)]
pub enum Instruction {
    /// Fetch application version
    GetVersion = 0x00,

    /// Fetch secp256k1 public key and address, optionally displaying it
    GetAddrSecp256k1 = 0x01,

    /// Sign a transaction with secp256k1
    SignSecp256k1 = 0x02,
}

/// Instruction for the device info request (on [DEVICE_APDU_CLA])
pub const INS_DEVICE_INFO: u8 = 0x01;

/// Chunk position for multi-part signing requests (sent as P1)
#[derive(Copy, Clone, Debug, PartialEq, num_enum::TryFromPrimitive, strum::Display)]
#[repr(u8)]
pub enum ChunkType {
    /// First chunk, containing the derivation path
    Init = 0x00,
    /// Intermediate payload chunk
    Add = 0x01,
    /// Final payload chunk
    Last = 0x02,
}

/// Display / confirmation flag for address requests (sent as P1)
#[derive(Copy, Clone, Debug, PartialEq, num_enum::TryFromPrimitive)]
#[repr(u8)]
pub enum Confirm {
    /// Return the address without user interaction
    Silent = 0x00,
    /// Display the address and require user approval
    Display = 0x01,
}

/// Owned APDU command type used throughout this crate
pub type Command = APDUCommand<Vec<u8>>;
