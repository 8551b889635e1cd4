// Copyright (c) 2022-2023 The MobileCoin Foundation

//! secp256k1 address APDUs
//!
//! ## Request
//! P1 selects silent (`0x00`) or on-device confirmation (`0x01`),
//! data contains the encoded [DerivationPath].
//!
//! ## Response
//! ```text
//!  | PUBLIC_KEY (65) | ADDR_LEN | ADDR_BYTES (ADDR_LEN) | ADDR_STR_LEN | ADDR_STR |
//! ```

use crate::{
    helpers::Reader, ApduError, Command, Confirm, DerivationPath, Instruction, FIL_APDU_CLA,
};

/// Uncompressed secp256k1 public key length
pub const PK_LEN: usize = 65;

/// Build address request for the provided path
pub fn address_req(path: &DerivationPath, confirm: Confirm) -> Command {
    Command {
        cla: FIL_APDU_CLA,
        ins: Instruction::GetAddrSecp256k1 as u8,
        p1: confirm as u8,
        p2: 0x00,
        data: path.to_bytes().to_vec(),
    }
}

/// Address response, public key in the encoding returned by the device
#[derive(Clone, Debug, PartialEq)]
pub struct AddressInfo {
    /// Address string (`f1...`)
    pub address: String,
    /// SEC1 public key (`0x04` uncompressed as returned by the app)
    pub public_key: Vec<u8>,
    /// Binary address (protocol byte + payload)
    pub address_bytes: Vec<u8>,
}

impl AddressInfo {
    /// Decode an address response
    pub fn decode(buff: &[u8]) -> Result<Self, ApduError> {
        let mut r = Reader::new(buff);

        let public_key = r.take(PK_LEN)?.to_vec();
        match public_key[0] {
            0x02 | 0x03 | 0x04 => (),
            p => return Err(ApduError::InvalidKey(p)),
        }

        let n = r.byte()? as usize;
        let address_bytes = r.take(n)?.to_vec();

        let n = r.byte()? as usize;
        let address = std::str::from_utf8(r.take(n)?)
            .map_err(|_| ApduError::InvalidUtf8("address"))?
            .to_string();

        Ok(Self {
            address,
            public_key,
            address_bytes,
        })
    }

    /// Encode an address response
    pub fn encode(&self) -> Vec<u8> {
        let mut b = self.public_key.clone();

        b.push(self.address_bytes.len() as u8);
        b.extend_from_slice(&self.address_bytes);

        b.push(self.address.len() as u8);
        b.extend_from_slice(self.address.as_bytes());

        b
    }
}
