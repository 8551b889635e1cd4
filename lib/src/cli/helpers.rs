// Copyright (c) 2022-2023 The MobileCoin Foundation

/// Variable length hex-encoded argument
#[derive(Clone, PartialEq, Debug)]
pub struct HexData(pub Vec<u8>);

impl std::str::FromStr for HexData {
    type Err = hex::FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches("0x");

        hex::decode(s).map(HexData)
    }
}

impl AsRef<[u8]> for HexData {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Display for HexData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(&self.0))
    }
}

/// Hex-encoded argument loaded from a file where prefixed with `@`
pub async fn load_hex(arg: &str) -> anyhow::Result<HexData> {
    let s = match arg.strip_prefix('@') {
        Some(file_name) => tokio::fs::read_to_string(file_name).await?,
        None => arg.to_string(),
    };

    let v = s.parse::<HexData>()?;

    Ok(v)
}
