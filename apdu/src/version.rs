// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Application version APDUs

use encdec::{Decode, Encode};

use super::{ApduError, ApduStatic, Instruction, SWAP_APDU_CLA};

/// Fetch application version APDU (0 length APDU)
#[derive(Copy, Clone, PartialEq, Debug, Default, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct GetVersionReq;

impl ApduStatic for GetVersionReq {
    const CLA: u8 = SWAP_APDU_CLA;
    const INS: u8 = Instruction::GetVersion as u8;
}

/// Encoded length of [`VersionResp`]
pub const VERSION_RESP_LEN: usize = 3;

/// Application version response APDU
///
/// ## Encoding
///
/// ```text
///  0                   1                   2
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |     MAJOR     |     MINOR     |     PATCH     |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct VersionResp {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl VersionResp {
    /// Create a new [`VersionResp`] APDU
    pub fn new(major: u8, minor: u8, patch: u8) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}
