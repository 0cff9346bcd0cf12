// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Session State APDUs
//!

use encdec::{Decode, DecodeOwned, Encode};
use ledger_proto::ApduError;
use num_enum::TryFromPrimitive;
use strum::{Display, EnumIter, EnumString, EnumVariantNames};

use super::{ApduStatic, Instruction, SWAP_APDU_CLA};

/// Swap session state enumeration
/// used in [`StateResp`] to communicate validation progress
#[derive(
    Copy, Clone, PartialEq, Debug, EnumString, Display, EnumVariantNames, EnumIter, TryFromPrimitive,
)]
#[repr(u8)]
pub enum SwapState {
    Idle = 0x00,
    AwaitingPartner = 0x01,
    PartnerVerified = 0x02,
    TransactionReceived = 0x03,
    SignatureVerified = 0x04,
}

impl Encode for SwapState {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(1)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        if buff.is_empty() {
            return Err(ApduError::InvalidLength);
        }

        buff[0] = *self as u8;
        Ok(1)
    }
}

impl DecodeOwned for SwapState {
    type Output = Self;

    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), ApduError> {
        if buff.is_empty() {
            return Err(ApduError::InvalidLength);
        }

        match Self::try_from(buff[0]) {
            Ok(v) => Ok((v, 1)),
            Err(_) => Err(ApduError::InvalidEncoding),
        }
    }
}

/// Session state request APDU (0 length APDU)
#[derive(Copy, Clone, PartialEq, Debug, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct StateReq;

impl ApduStatic for StateReq {
    const CLA: u8 = SWAP_APDU_CLA;
    const INS: u8 = Instruction::GetState as u8;
}

/// Encoded length of [`StateResp`]
pub const STATE_RESP_LEN: usize = 1;

/// Session state response APDU
///
/// ## Encoding:
/// ```text
///  0 1 2 3 4 5 6 7
/// +-+-+-+-+-+-+-+-+
/// |  SWAP_STATE   |
/// +-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct StateResp {
    /// Current session state
    pub state: SwapState,
}
