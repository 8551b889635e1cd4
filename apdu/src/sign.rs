// Copyright (c) 2022-2023 The MobileCoin Foundation

//! secp256k1 transaction signing APDUs
//!
//! Signing requests are split into chunks, the first ([ChunkType::Init])
//! containing the encoded [DerivationPath], followed by payload chunks of up
//! to [CHUNK_SIZE] bytes ([ChunkType::Add], then [ChunkType::Last]).
//!
//! ## Response
//! ```text
//!  | R (32) | S (32) | V (1) | DER SIGNATURE ... |
//! ```

use crate::{
    helpers::Reader, ApduError, ChunkType, Command, DerivationPath, Instruction, CHUNK_SIZE,
    FIL_APDU_CLA,
};

/// Build the chunked request sequence for signing `payload` with `path`
pub fn sign_req(path: &DerivationPath, payload: &[u8]) -> Result<Vec<Command>, ApduError> {
    if payload.is_empty() {
        return Err(ApduError::EmptyPayload);
    }

    let mut chunks = vec![Command {
        cla: FIL_APDU_CLA,
        ins: Instruction::SignSecp256k1 as u8,
        p1: ChunkType::Init as u8,
        p2: 0x00,
        data: path.to_bytes().to_vec(),
    }];

    let n = payload.chunks(CHUNK_SIZE).len();
    for (i, c) in payload.chunks(CHUNK_SIZE).enumerate() {
        let p1 = match i + 1 == n {
            true => ChunkType::Last,
            false => ChunkType::Add,
        };

        chunks.push(Command {
            cla: FIL_APDU_CLA,
            ins: Instruction::SignSecp256k1 as u8,
            p1: p1 as u8,
            p2: 0x00,
            data: c.to_vec(),
        });
    }

    Ok(chunks)
}

/// Signature response
#[derive(Clone, Debug, PartialEq)]
pub struct SignatureInfo {
    /// Compact signature R value
    pub r: [u8; 32],
    /// Compact signature S value
    pub s: [u8; 32],
    /// Recovery id
    pub v: u8,
    /// DER encoded signature
    pub der: Vec<u8>,
}

impl SignatureInfo {
    /// Minimum response length (compact signature, recovery id and DER header)
    pub const MIN_LEN: usize = 32 + 32 + 1 + 2;

    /// Decode a signature response
    pub fn decode(buff: &[u8]) -> Result<Self, ApduError> {
        if buff.len() < Self::MIN_LEN {
            return Err(ApduError::InvalidLength {
                expected: Self::MIN_LEN,
                actual: buff.len(),
            });
        }

        let mut r = Reader::new(buff);
        let mut s = Self {
            r: [0u8; 32],
            s: [0u8; 32],
            v: 0,
            der: vec![],
        };

        s.r.copy_from_slice(r.take(32)?);
        s.s.copy_from_slice(r.take(32)?);
        s.v = r.byte()?;
        s.der = r.rest().to_vec();

        Ok(s)
    }

    /// Encode a signature response
    pub fn encode(&self) -> Vec<u8> {
        let mut b = Vec::with_capacity(65 + self.der.len());

        b.extend_from_slice(&self.r);
        b.extend_from_slice(&self.s);
        b.push(self.v);
        b.extend_from_slice(&self.der);

        b
    }
}
