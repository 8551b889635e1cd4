// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Filecoin address encoding

use data_encoding::BASE32_NOPAD;

use ledger_fil_apdu::digest::{address_checksum, address_payload};

use super::MockError;

/// Mainnet network prefix
pub const NETWORK: char = 'f';

/// Address protocols
pub const PROTOCOL_ID: u8 = 0;
pub const PROTOCOL_SECP256K1: u8 = 1;
pub const PROTOCOL_ACTOR: u8 = 2;
pub const PROTOCOL_BLS: u8 = 3;

/// Compute binary and string addresses for a SEC1 secp256k1 public key
pub fn secp256k1_address(public_key: &[u8]) -> (Vec<u8>, String) {
    let payload = address_payload(public_key);

    let mut b = vec![PROTOCOL_SECP256K1];
    b.extend_from_slice(&payload);

    (b, encode(PROTOCOL_SECP256K1, &payload))
}

/// Encode a hashed / key address
fn encode(protocol: u8, payload: &[u8]) -> String {
    let mut b = payload.to_vec();
    b.extend_from_slice(&address_checksum(protocol, payload));

    format!(
        "{NETWORK}{protocol}{}",
        BASE32_NOPAD.encode(&b).to_ascii_lowercase()
    )
}

/// Format a binary address (as found in transactions) as a string
pub fn format_address(b: &[u8]) -> Result<String, MockError> {
    let (protocol, payload) = match b.split_first() {
        Some((p, v)) => (*p, v),
        None => return Err(MockError::InvalidAddress),
    };

    match (protocol, payload.len()) {
        (PROTOCOL_ID, _) => {
            let id = uvarint(payload).ok_or(MockError::InvalidAddress)?;
            Ok(format!("{NETWORK}{PROTOCOL_ID}{id}"))
        }
        (PROTOCOL_SECP256K1, 20) | (PROTOCOL_ACTOR, 20) | (PROTOCOL_BLS, 48) => {
            Ok(encode(protocol, payload))
        }
        _ => Err(MockError::InvalidAddress),
    }
}

/// Decode an unsigned LEB128 varint, requiring the full buffer to be consumed
fn uvarint(b: &[u8]) -> Option<u64> {
    let mut v = 0u64;

    for (i, c) in b.iter().enumerate() {
        if i >= 10 {
            return None;
        }

        v |= ((c & 0x7f) as u64) << (7 * i);

        if c & 0x80 == 0 {
            return match i + 1 == b.len() {
                true => Some(v),
                false => None,
            };
        }
    }

    None
}
