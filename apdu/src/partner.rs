// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Partner APDUs, declaring and authenticating the exchange partner for a swap session

use encdec::{Decode, Encode};

use super::{ApduError, ApduStatic, Instruction, SWAP_APDU_CLA};
use crate::helpers::{read_lv, write_lv};

/// Length of an uncompressed SEC1 secp256k1 public key
pub const PARTNER_KEY_LEN: usize = 65;

/// Declare the exchange partner for the active session.
///
/// The partner is not trusted until a [`CheckPartnerReq`] signature by the
/// partner trust root over these exact bytes has been verified.
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   NAME_LEN    |                                               |
/// +-+-+-+-+-+-+-+-+                                               +
/// /                         PARTNER_NAME                          /
/// /                       (variable length)                       /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// /                          PUBLIC_KEY                           /
/// /           (65-byte uncompressed secp256k1 public key)         /
/// |                                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SetPartnerKeyReq<'a> {
    /// Partner display name, raw bytes as declared
    pub name: &'a [u8],
    /// Partner public key
    pub public_key: [u8; PARTNER_KEY_LEN],
}

impl<'a> SetPartnerKeyReq<'a> {
    /// Create a new [`SetPartnerKeyReq`] APDU
    pub fn new<N: AsRef<[u8]> + ?Sized>(name: &'a N, public_key: [u8; PARTNER_KEY_LEN]) -> Self {
        Self {
            name: name.as_ref(),
            public_key,
        }
    }
}

impl<'a> ApduStatic for SetPartnerKeyReq<'a> {
    const CLA: u8 = SWAP_APDU_CLA;
    const INS: u8 = Instruction::SetPartnerKey as u8;
}

impl<'a> Encode for SetPartnerKeyReq<'a> {
    type Error = ApduError;

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        let mut index = 0;

        index += write_lv(self.name, &mut buff[index..])?;

        if buff.len() < index + PARTNER_KEY_LEN {
            return Err(ApduError::InvalidLength);
        }
        buff[index..][..PARTNER_KEY_LEN].copy_from_slice(&self.public_key);
        index += PARTNER_KEY_LEN;

        Ok(index)
    }

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(1 + self.name.len() + PARTNER_KEY_LEN)
    }
}

impl<'a> Decode<'a> for SetPartnerKeyReq<'a> {
    type Output = Self;
    type Error = ApduError;

    fn decode(buff: &'a [u8]) -> Result<(Self, usize), ApduError> {
        let mut index = 0;

        let (name, n) = read_lv(&buff[index..])?;
        index += n;

        if buff.len() < index + PARTNER_KEY_LEN {
            return Err(ApduError::InvalidLength);
        }
        let mut public_key = [0u8; PARTNER_KEY_LEN];
        public_key.copy_from_slice(&buff[index..][..PARTNER_KEY_LEN]);
        index += PARTNER_KEY_LEN;

        Ok((Self { name, public_key }, index))
    }
}

/// Authenticate the declared partner.
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                   SIGNATURE (DER, remainder)                  /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct CheckPartnerReq<'a> {
    /// DER encoded ECDSA signature by the partner trust root
    pub signature: &'a [u8],
}

impl<'a> ApduStatic for CheckPartnerReq<'a> {
    const CLA: u8 = SWAP_APDU_CLA;
    const INS: u8 = Instruction::CheckPartner as u8;
}

impl<'a> Encode for CheckPartnerReq<'a> {
    type Error = ApduError;

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        if buff.len() < self.signature.len() {
            return Err(ApduError::InvalidLength);
        }

        buff[..self.signature.len()].copy_from_slice(self.signature);

        Ok(self.signature.len())
    }

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(self.signature.len())
    }
}

impl<'a> Decode<'a> for CheckPartnerReq<'a> {
    type Output = Self;
    type Error = ApduError;

    fn decode(buff: &'a [u8]) -> Result<(Self, usize), ApduError> {
        Ok((Self { signature: buff }, buff.len()))
    }
}
