// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Application version and device information APDUs
//!
//! ## Version response
//! ```text
//!   0                   1                   2                   3
//!   0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |   TEST_MODE   |     MAJOR     |     MINOR     |     PATCH     |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//!  |  DEV_LOCKED*  |          TARGET_ID* (u32, BE) ...             |
//!  +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//! `*` fields are optional and depend on the app version.
//!
//! ## Device info response
//! ```text
//!  | TARGET_ID (4) | SE_LEN | SE_VERSION | FLAGS_LEN | FLAGS | MCU_LEN | MCU_VERSION |
//! ```

use crate::{
    helpers::Reader, ApduError, Command, Instruction, DEVICE_APDU_CLA, FIL_APDU_CLA,
    INS_DEVICE_INFO,
};

/// Build application version request
pub fn version_req() -> Command {
    Command {
        cla: FIL_APDU_CLA,
        ins: Instruction::GetVersion as u8,
        p1: 0x00,
        p2: 0x00,
        data: vec![],
    }
}

/// Build device info request
pub fn device_info_req() -> Command {
    Command {
        cla: DEVICE_APDU_CLA,
        ins: INS_DEVICE_INFO,
        p1: 0x00,
        p2: 0x00,
        data: vec![],
    }
}

/// Application version information
#[derive(Clone, Debug, PartialEq)]
pub struct VersionInfo {
    /// App compiled in test mode
    pub test_mode: bool,
    /// Major version
    pub major: u8,
    /// Minor version
    pub minor: u8,
    /// Patch version
    pub patch: u8,
    /// Device locked state (if reported)
    pub device_locked: Option<bool>,
    /// Target identifier (if reported)
    pub target_id: Option<[u8; 4]>,
}

impl VersionInfo {
    /// Encoded length of the mandatory fields
    pub const MIN_LEN: usize = 4;

    /// Decode a version response
    pub fn decode(buff: &[u8]) -> Result<Self, ApduError> {
        if buff.len() < Self::MIN_LEN {
            return Err(ApduError::InvalidLength {
                expected: Self::MIN_LEN,
                actual: buff.len(),
            });
        }

        let device_locked = buff.get(4).map(|v| *v == 1);
        let target_id = buff.get(5..9).map(|v| [v[0], v[1], v[2], v[3]]);

        Ok(Self {
            test_mode: buff[0] != 0,
            major: buff[1],
            minor: buff[2],
            patch: buff[3],
            device_locked,
            target_id,
        })
    }

    /// Encode a version response
    pub fn encode(&self) -> Vec<u8> {
        let mut b = vec![self.test_mode as u8, self.major, self.minor, self.patch];

        if let Some(l) = self.device_locked {
            b.push(l as u8);

            if let Some(t) = self.target_id {
                b.extend_from_slice(&t);
            }
        }

        b
    }
}

/// Device (secure element / MCU) information
#[derive(Clone, Debug, PartialEq)]
pub struct DeviceInfo {
    /// Target identifier
    pub target_id: [u8; 4],
    /// Secure element firmware version
    pub se_version: String,
    /// Device flags
    pub flags: Vec<u8>,
    /// MCU firmware version
    pub mcu_version: String,
}

impl DeviceInfo {
    /// Decode a device info response
    pub fn decode(buff: &[u8]) -> Result<Self, ApduError> {
        let mut r = Reader::new(buff);

        let t = r.take(4)?;
        let target_id = [t[0], t[1], t[2], t[3]];

        let n = r.byte()? as usize;
        let se_version = std::str::from_utf8(r.take(n)?)
            .map_err(|_| ApduError::InvalidUtf8("se_version"))?
            .to_string();

        let n = r.byte()? as usize;
        let flags = r.take(n)?.to_vec();

        let n = r.byte()? as usize;
        let mut mcu = r.take(n)?;
        // Some firmware versions include a trailing null
        if let Some((0, rest)) = mcu.split_last() {
            mcu = rest;
        }
        let mcu_version = std::str::from_utf8(mcu)
            .map_err(|_| ApduError::InvalidUtf8("mcu_version"))?
            .to_string();

        Ok(Self {
            target_id,
            se_version,
            flags,
            mcu_version,
        })
    }

    /// Encode a device info response
    pub fn encode(&self) -> Vec<u8> {
        let mut b = self.target_id.to_vec();

        b.push(self.se_version.len() as u8);
        b.extend_from_slice(self.se_version.as_bytes());

        b.push(self.flags.len() as u8);
        b.extend_from_slice(&self.flags);

        b.push(self.mcu_version.len() as u8);
        b.extend_from_slice(self.mcu_version.as_bytes());

        b
    }
}
