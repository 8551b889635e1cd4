// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Filecoin message decoding and review formatting

use serde_cbor::Value;

use super::{address::format_address, MockError};

/// Number of fields in an encoded message
pub const MESSAGE_FIELDS: usize = 10;

/// attoFIL per FIL (decimal places)
const FIL_DECIMALS: usize = 18;

/// Decoded Filecoin message
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub to: String,
    pub from: String,
    pub nonce: u64,
    pub value: u128,
    pub gas_limit: i64,
    pub gas_fee_cap: u128,
    pub gas_premium: u128,
    pub method: u64,
    pub params: Vec<u8>,
}

impl Message {
    /// Decode a CBOR encoded message
    pub fn decode(buff: &[u8]) -> Result<Self, MockError> {
        let v: Value = serde_cbor::from_slice(buff).map_err(|_| MockError::UnexpectedType)?;

        let items = match v {
            Value::Array(a) => a,
            _ => return Err(MockError::UnexpectedType),
        };

        if items.len() != MESSAGE_FIELDS {
            return Err(MockError::UnexpectedItems);
        }

        let version = integer(&items[0])?;
        if version != 0 {
            return Err(MockError::UnexpectedVersion);
        }

        let to = format_address(bytes(&items[1])?)?;
        let from = format_address(bytes(&items[2])?)?;
        let nonce = u64::try_from(integer(&items[3])?).map_err(|_| MockError::UnexpectedValue)?;
        let value = bigint(bytes(&items[4])?)?;
        let gas_limit =
            i64::try_from(integer(&items[5])?).map_err(|_| MockError::UnexpectedValue)?;
        let gas_fee_cap = bigint(bytes(&items[6])?)?;
        let gas_premium = bigint(bytes(&items[7])?)?;
        let method = u64::try_from(integer(&items[8])?).map_err(|_| MockError::UnexpectedValue)?;
        let params = bytes(&items[9])?.to_vec();

        Ok(Self {
            to,
            from,
            nonce,
            value,
            gas_limit,
            gas_fee_cap,
            gas_premium,
            method,
            params,
        })
    }

    /// Build review items (title, value), expert fields only included in expert mode
    pub fn review_items(&self, expert: bool) -> Vec<(&'static str, String)> {
        let mut items = vec![
            ("To", self.to.clone()),
            ("From", self.from.clone()),
            ("Value", format_fil(self.value)),
        ];

        if expert {
            items.push(("Gas Limit", self.gas_limit.to_string()));
        }

        items.push(("Gas Fee Cap", format_fil(self.gas_fee_cap)));

        if expert {
            items.push(("Gas Premium", format_fil(self.gas_premium)));
            items.push(("Nonce", self.nonce.to_string()));
        }

        let method = match self.method {
            0 => "Transfer".to_string(),
            m => m.to_string(),
        };
        items.push(("Method", method));

        if expert && !self.params.is_empty() {
            items.push(("Params", hex::encode(&self.params)));
        }

        items
    }
}

fn integer(v: &Value) -> Result<i128, MockError> {
    match v {
        Value::Integer(i) => Ok(*i),
        _ => Err(MockError::UnexpectedType),
    }
}

fn bytes(v: &Value) -> Result<&[u8], MockError> {
    match v {
        Value::Bytes(b) => Ok(b.as_slice()),
        _ => Err(MockError::UnexpectedType),
    }
}

/// Decode a serialized big integer (sign byte followed by big-endian magnitude)
fn bigint(b: &[u8]) -> Result<u128, MockError> {
    let (sign, magnitude) = match b.split_first() {
        Some((s, m)) => (*s, m),
        None => return Ok(0),
    };

    if sign != 0 || magnitude.len() > 16 {
        return Err(MockError::UnexpectedValue);
    }

    Ok(magnitude.iter().fold(0u128, |a, v| (a << 8) | *v as u128))
}

/// Format an attoFIL amount as FIL
pub fn format_fil(atto: u128) -> String {
    let scale = 10u128.pow(FIL_DECIMALS as u32);
    let (whole, frac) = (atto / scale, atto % scale);

    if frac == 0 {
        return format!("FIL {whole}");
    }

    let frac = format!("{frac:0width$}", width = FIL_DECIMALS);
    format!("FIL {whole}.{}", frac.trim_end_matches('0'))
}
