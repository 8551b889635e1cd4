// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Mock wallet key derivation and signing

use bip32::{ChildNumber, XPrv};
use bip39::{Language, Mnemonic, Seed};
use k256::ecdsa::SigningKey;

use ledger_fil_apdu::{
    address::AddressInfo, digest::transaction_digest, sign::SignatureInfo, DerivationPath,
};

use super::{address::secp256k1_address, MockError};

/// Default speculos seed phrase
pub const DEFAULT_SEED: &str = "glory promote mansion idle axis finger extra february uncover one trip resource lawn turtle enact monster seven myth punch hobby comfort wild raise skin";

/// Wallet derived from a BIP-39 seed
#[derive(Clone)]
pub struct Wallet {
    seed: Vec<u8>,
}

impl Wallet {
    /// Load a wallet from a seed phrase, or from a `hex:` prefixed seed
    pub fn new(seed: &str) -> anyhow::Result<Self> {
        if let Some(h) = seed.strip_prefix("hex:") {
            return Ok(Self {
                seed: hex::decode(h)?,
            });
        }

        let m = Mnemonic::from_phrase(seed.trim(), Language::English)?;
        let seed = Seed::new(&m, "");

        Ok(Self {
            seed: seed.as_bytes().to_vec(),
        })
    }

    /// Derive the signing key for a path
    pub fn signing_key(&self, path: &DerivationPath) -> Result<SigningKey, MockError> {
        let mut p = bip32::DerivationPath::default();
        for c in path.components() {
            p.push(ChildNumber::from(*c));
        }

        let k = XPrv::derive_from_path(&self.seed, &p).map_err(|_| MockError::Derivation)?;

        Ok(k.private_key().clone())
    }

    /// Fetch the (uncompressed) public key and address for a path
    pub fn address(&self, path: &DerivationPath) -> Result<AddressInfo, MockError> {
        let k = self.signing_key(path)?;

        let public_key = k.verifying_key().to_encoded_point(false).as_bytes().to_vec();
        let (address_bytes, address) = secp256k1_address(&public_key);

        Ok(AddressInfo {
            address,
            public_key,
            address_bytes,
        })
    }

    /// Sign a CBOR encoded message
    pub fn sign(&self, path: &DerivationPath, message: &[u8]) -> Result<SignatureInfo, MockError> {
        let k = self.signing_key(path)?;

        let digest = transaction_digest(message);
        let (sig, recid) = k
            .sign_prehash_recoverable(&digest)
            .map_err(|_| MockError::Signing)?;

        let compact = sig.to_bytes();
        let mut r = [0u8; 32];
        r.copy_from_slice(&compact[..32]);
        let mut s = [0u8; 32];
        s.copy_from_slice(&compact[32..]);

        Ok(SignatureInfo {
            r,
            s,
            v: recid.to_byte(),
            der: sig.to_der().as_bytes().to_vec(),
        })
    }
}
