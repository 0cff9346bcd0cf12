// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Address check APDUs, proving payout / refund addresses belong to the wallet.
//!
//! Payout and refund checks share an encoding and differ only in instruction
//! code, see [`CheckPayoutAddressReq`] and [`CheckRefundAddressReq`].

use byteorder::{BigEndian, ByteOrder};
use encdec::{Decode, Encode};
use heapless::Vec;

use super::{ApduError, ApduStatic, Instruction, SWAP_APDU_CLA};
use crate::helpers::{read_lv, write_lv};

/// Maximum derivation path depth
pub const MAX_PATH_DEPTH: usize = 10;

/// Hardened derivation flag
pub const HARDENED: u32 = 0x8000_0000;

/// Check an address against a wallet derivation path using a signed currency configuration.
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  CONFIG_LEN   |                                               |
/// +-+-+-+-+-+-+-+-+                                               +
/// /                    CURRENCY_CONFIGURATION                     /
/// /                       (variable length)                       /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |    SIG_LEN    |                                               |
/// +-+-+-+-+-+-+-+-+                                               +
/// /                 CONFIGURATION_SIGNATURE (DER)                 /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  PARAMS_LEN   |                                               |
/// +-+-+-+-+-+-+-+-+                                               +
/// /                   ADDRESS_PARAMETERS (path)                   /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// Configuration and parameters are carried as raw bytes, the configuration
/// must not be interpreted before its signature has been checked.
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct CheckAddressReq<'a, const INS: u8> {
    /// Encoded currency configuration (see [`crate::config::CoinConfig`])
    pub config: &'a [u8],
    /// DER signature over `config` by the configuration issuer
    pub config_signature: &'a [u8],
    /// Encoded [`AddressParams`]
    pub address_params: &'a [u8],
}

/// Check the payout address of the active transaction
pub type CheckPayoutAddressReq<'a> =
    CheckAddressReq<'a, { Instruction::CheckPayoutAddress as u8 }>;

/// Check the refund address of the active transaction
pub type CheckRefundAddressReq<'a> =
    CheckAddressReq<'a, { Instruction::CheckRefundAddress as u8 }>;

impl<'a, const INS: u8> CheckAddressReq<'a, INS> {
    pub fn new(config: &'a [u8], config_signature: &'a [u8], address_params: &'a [u8]) -> Self {
        Self {
            config,
            config_signature,
            address_params,
        }
    }
}

impl<'a, const INS: u8> ApduStatic for CheckAddressReq<'a, INS> {
    const CLA: u8 = SWAP_APDU_CLA;
    const INS: u8 = INS;
}

impl<'a, const INS: u8> Encode for CheckAddressReq<'a, INS> {
    type Error = ApduError;

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        let mut index = 0;

        index += write_lv(self.config, &mut buff[index..])?;
        index += write_lv(self.config_signature, &mut buff[index..])?;
        index += write_lv(self.address_params, &mut buff[index..])?;

        Ok(index)
    }

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(3 + self.config.len() + self.config_signature.len() + self.address_params.len())
    }
}

impl<'a, const INS: u8> Decode<'a> for CheckAddressReq<'a, INS> {
    type Output = Self;
    type Error = ApduError;

    fn decode(buff: &'a [u8]) -> Result<(Self, usize), ApduError> {
        let mut index = 0;

        let (config, n) = read_lv(&buff[index..])?;
        index += n;

        let (config_signature, n) = read_lv(&buff[index..])?;
        index += n;

        let (address_params, n) = read_lv(&buff[index..])?;
        index += n;

        Ok((
            Self {
                config,
                config_signature,
                address_params,
            },
            index,
        ))
    }
}

/// Address derivation parameters, a BIP32 path into the wallet key tree
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |   PATH_LEN    |                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                  PATH[0] (u32 BE, bit 31 hard)                |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// /                              ...                              /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Clone, PartialEq, Debug)]
pub struct AddressParams {
    pub path: Vec<u32, MAX_PATH_DEPTH>,
}

impl AddressParams {
    /// Create address parameters from path components
    pub fn new(path: &[u32]) -> Result<Self, ApduError> {
        if path.is_empty() {
            return Err(ApduError::InvalidLength);
        }

        let path = Vec::from_slice(path).map_err(|_| ApduError::InvalidLength)?;
        Ok(Self { path })
    }

    /// Parse complete address parameters, rejecting trailing bytes
    pub fn parse(buff: &[u8]) -> Result<Self, ApduError> {
        let (p, n) = Self::decode(buff)?;
        if n != buff.len() {
            return Err(ApduError::InvalidLength);
        }
        Ok(p)
    }
}

impl Encode for AddressParams {
    type Error = ApduError;

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        let n = self.encode_len()?;
        if buff.len() < n {
            return Err(ApduError::InvalidLength);
        }

        buff[0] = self.path.len() as u8;
        for (i, c) in self.path.iter().enumerate() {
            BigEndian::write_u32(&mut buff[1 + i * 4..], *c);
        }

        Ok(n)
    }

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(1 + self.path.len() * 4)
    }
}

impl<'a> Decode<'a> for AddressParams {
    type Output = Self;
    type Error = ApduError;

    fn decode(buff: &'a [u8]) -> Result<(Self, usize), ApduError> {
        let depth = match buff.first() {
            Some(v) => *v as usize,
            None => return Err(ApduError::InvalidLength),
        };

        if depth == 0 || depth > MAX_PATH_DEPTH || buff.len() < 1 + depth * 4 {
            return Err(ApduError::InvalidLength);
        }

        let mut path = Vec::new();
        for c in buff[1..][..depth * 4].chunks_exact(4) {
            path.push(BigEndian::read_u32(c))
                .map_err(|_| ApduError::InvalidLength)?;
        }

        Ok((Self { path }, 1 + depth * 4))
    }
}
