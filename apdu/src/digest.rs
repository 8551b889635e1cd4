// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Helpers for computing Filecoin transaction and address digests
//!
//! Transactions are signed over the blake2b-256 digest of the CID bytes
//! of the CBOR encoded message (CIDv1, dag-cbor codec, blake2b-256 multihash).

use blake2::{
    digest::consts::{U20, U32, U4},
    Blake2b, Digest as _,
};

/// CID prefix for CBOR encoded messages
/// (version 1, dag-cbor 0x71, blake2b-256 0xb220 varint, 32 byte length)
pub const CID_PREFIX: [u8; 6] = [0x01, 0x71, 0xa0, 0xe4, 0x02, 0x20];

type Blake2b256 = Blake2b<U32>;
type Blake2b160 = Blake2b<U20>;
type Blake2b32 = Blake2b<U4>;

/// Compute the canonical signing digest for a CBOR encoded transaction
pub fn transaction_digest(payload: &[u8]) -> [u8; 32] {
    let message_hash = Blake2b256::digest(payload);

    Blake2b256::new()
        .chain_update(CID_PREFIX)
        .chain_update(message_hash)
        .finalize()
        .into()
}

/// Compute the address payload for a secp256k1 public key
pub fn address_payload(public_key: &[u8]) -> [u8; 20] {
    Blake2b160::digest(public_key).into()
}

/// Compute the address checksum over the protocol byte and payload
pub fn address_checksum(protocol: u8, payload: &[u8]) -> [u8; 4] {
    Blake2b32::new()
        .chain_update([protocol])
        .chain_update(payload)
        .finalize()
        .into()
}
