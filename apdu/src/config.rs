// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Currency configuration encoding.
//!
//! Configurations are issued (and signed) off-device, the device only
//! decodes a configuration once the issuer signature has been verified.

use byteorder::{BigEndian, ByteOrder};
use encdec::{Decode, Encode};
use heapless::{String, Vec};
use num_enum::TryFromPrimitive;

use super::ApduError;
use crate::helpers::{read_lv, read_lv_str, write_lv};

/// Maximum currency ticker length
pub const MAX_TICKER_LEN: usize = 9;

/// Maximum currency application name length
pub const MAX_APP_NAME_LEN: usize = 15;

/// Maximum base58check version prefix length
pub const MAX_VERSION_LEN: usize = 4;

/// Maximum bech32 human readable part length
pub const MAX_HRP_LEN: usize = 16;

const FORMAT_BASE58_CHECK: u8 = 0x01;
const FORMAT_SEGWIT_V0: u8 = 0x02;

/// Extra id (destination tag / memo) requirement for a currency
#[derive(Copy, Clone, PartialEq, Debug, TryFromPrimitive)]
#[repr(u8)]
pub enum ExtraIdPolicy {
    /// Extra id must be empty
    None = 0x00,
    /// Extra id may be empty or a destination tag
    Optional = 0x01,
    /// Extra id must be a destination tag
    Mandatory = 0x02,
}

/// Base58 alphabet used by a currency
#[derive(Copy, Clone, PartialEq, Debug, TryFromPrimitive)]
#[repr(u8)]
pub enum Base58Alphabet {
    Bitcoin = 0x00,
    Ripple = 0x01,
}

/// Address encoding for a currency, all formats commit to
/// `RIPEMD160(SHA256(compressed public key))`
#[derive(Clone, PartialEq, Debug)]
pub enum AddressFormat {
    /// `base58check(version || key_hash)`
    Base58Check {
        alphabet: Base58Alphabet,
        version: Vec<u8, MAX_VERSION_LEN>,
    },
    /// Bech32 segwit v0 pay-to-witness-public-key-hash
    SegwitV0 { hrp: String<MAX_HRP_LEN> },
}

impl AddressFormat {
    fn tag(&self) -> u8 {
        match self {
            AddressFormat::Base58Check { .. } => FORMAT_BASE58_CHECK,
            AddressFormat::SegwitV0 { .. } => FORMAT_SEGWIT_V0,
        }
    }

    fn params_len(&self) -> usize {
        match self {
            AddressFormat::Base58Check { version, .. } => 2 + version.len(),
            AddressFormat::SegwitV0 { hrp } => 1 + hrp.len(),
        }
    }

    fn encode_params(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        match self {
            AddressFormat::Base58Check { alphabet, version } => {
                if buff.is_empty() {
                    return Err(ApduError::InvalidLength);
                }
                buff[0] = *alphabet as u8;
                Ok(1 + write_lv(version, &mut buff[1..])?)
            }
            AddressFormat::SegwitV0 { hrp } => write_lv(hrp.as_bytes(), buff),
        }
    }

    fn decode_params(tag: u8, buff: &[u8]) -> Result<(Self, usize), ApduError> {
        match tag {
            FORMAT_BASE58_CHECK => {
                let alphabet = match buff.first() {
                    Some(v) => Base58Alphabet::try_from(*v)
                        .map_err(|_| ApduError::InvalidEncoding)?,
                    None => return Err(ApduError::InvalidLength),
                };

                let (v, n) = read_lv(&buff[1..])?;
                if v.is_empty() {
                    return Err(ApduError::InvalidLength);
                }
                let version = Vec::from_slice(v).map_err(|_| ApduError::InvalidLength)?;

                Ok((AddressFormat::Base58Check { alphabet, version }, 1 + n))
            }
            FORMAT_SEGWIT_V0 => {
                let (h, n) = read_lv_str(buff)?;

                // Only canonical (lower-case) human readable parts are accepted
                if h.is_empty()
                    || !h
                        .bytes()
                        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
                {
                    return Err(ApduError::InvalidEncoding);
                }
                let hrp = String::try_from(h).map_err(|_| ApduError::InvalidLength)?;

                Ok((AddressFormat::SegwitV0 { hrp }, n))
            }
            _ => Err(ApduError::InvalidEncoding),
        }
    }
}

/// Currency configuration blob
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  TICKER_LEN   |          TICKER (variable length)             /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// | APP_NAME_LEN  |         APP_NAME (variable length)            /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |    SUB_LEN    |                                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                  COIN_TYPE (u32 BE, SLIP-44)                  |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |    FORMAT     |   EXTRA_ID    |        FORMAT_PARAMS...       /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
///
/// FORMAT 0x01 (base58check): ALPHABET (u8) | VERSION_LEN (u8) | VERSION
/// FORMAT 0x02 (segwit v0):   HRP_LEN (u8) | HRP
/// ```
#[derive(Clone, PartialEq, Debug)]
pub struct CoinConfig<'a> {
    /// Currency ticker, as used in transaction payloads
    pub ticker: &'a str,
    /// Currency application name
    pub app_name: &'a str,
    /// SLIP-44 coin type (without hardened bit)
    pub coin_type: u32,
    /// Address encoding
    pub format: AddressFormat,
    /// Extra id requirement
    pub extra_id: ExtraIdPolicy,
}

impl<'a> CoinConfig<'a> {
    /// Parse a complete configuration blob, rejecting trailing bytes
    pub fn parse(buff: &'a [u8]) -> Result<Self, ApduError> {
        let (c, n) = Self::decode(buff)?;
        if n != buff.len() {
            return Err(ApduError::InvalidLength);
        }
        Ok(c)
    }

    fn sub_len(&self) -> usize {
        4 + 2 + self.format.params_len()
    }
}

impl<'a> Encode for CoinConfig<'a> {
    type Error = ApduError;

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        let mut index = 0;

        index += write_lv(self.ticker.as_bytes(), &mut buff[index..])?;
        index += write_lv(self.app_name.as_bytes(), &mut buff[index..])?;

        let sub_len = self.sub_len();
        if sub_len > u8::MAX as usize || buff.len() < index + 1 + sub_len {
            return Err(ApduError::InvalidLength);
        }

        buff[index] = sub_len as u8;
        index += 1;

        BigEndian::write_u32(&mut buff[index..], self.coin_type);
        index += 4;

        buff[index] = self.format.tag();
        buff[index + 1] = self.extra_id as u8;
        index += 2;

        index += self.format.encode_params(&mut buff[index..])?;

        Ok(index)
    }

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(2 + self.ticker.len() + self.app_name.len() + 1 + self.sub_len())
    }
}

impl<'a> Decode<'a> for CoinConfig<'a> {
    type Output = Self;
    type Error = ApduError;

    fn decode(buff: &'a [u8]) -> Result<(Self, usize), ApduError> {
        let mut index = 0;

        let (ticker, n) = read_lv_str(&buff[index..])?;
        if ticker.is_empty() || ticker.len() > MAX_TICKER_LEN {
            return Err(ApduError::InvalidLength);
        }
        index += n;

        let (app_name, n) = read_lv_str(&buff[index..])?;
        if app_name.is_empty() || app_name.len() > MAX_APP_NAME_LEN {
            return Err(ApduError::InvalidLength);
        }
        index += n;

        let (sub, n) = read_lv(&buff[index..])?;
        index += n;

        // COIN_TYPE, FORMAT, EXTRA_ID
        if sub.len() < 6 {
            return Err(ApduError::InvalidLength);
        }
        let coin_type = BigEndian::read_u32(&sub[..4]);
        let extra_id = ExtraIdPolicy::try_from(sub[5]).map_err(|_| ApduError::InvalidEncoding)?;

        let (format, m) = AddressFormat::decode_params(sub[4], &sub[6..])?;
        if 6 + m != sub.len() {
            return Err(ApduError::InvalidLength);
        }

        Ok((
            Self {
                ticker,
                app_name,
                coin_type,
                format,
                extra_id,
            },
            index,
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn xrp() -> CoinConfig<'static> {
        CoinConfig {
            ticker: "XRP",
            app_name: "XRP",
            coin_type: 144,
            format: AddressFormat::Base58Check {
                alphabet: Base58Alphabet::Ripple,
                version: Vec::from_slice(&[0x00]).unwrap(),
            },
            extra_id: ExtraIdPolicy::Optional,
        }
    }

    #[test]
    fn coin_config_base58() {
        let c = xrp();

        let mut buff = [0u8; 64];
        let n = c.encode(&mut buff).unwrap();
        assert_eq!(n, c.encode_len().unwrap());

        assert_eq!(
            &buff[..n],
            &[
                3, b'X', b'R', b'P', 3, b'X', b'R', b'P', 9, 0, 0, 0, 144, 0x01, 0x01, 0x01, 1,
                0x00
            ]
        );

        assert_eq!(CoinConfig::parse(&buff[..n]).unwrap(), c);
    }

    #[test]
    fn coin_config_segwit() {
        let c = CoinConfig {
            ticker: "BTC",
            app_name: "Bitcoin",
            coin_type: 0,
            format: AddressFormat::SegwitV0 {
                hrp: String::try_from("bc").unwrap(),
            },
            extra_id: ExtraIdPolicy::None,
        };

        let mut buff = [0u8; 64];
        let n = c.encode(&mut buff).unwrap();

        assert_eq!(CoinConfig::parse(&buff[..n]).unwrap(), c);
    }

    #[test]
    fn coin_config_trailing_bytes() {
        let mut buff = [0u8; 64];
        let n = xrp().encode(&mut buff).unwrap();

        assert!(matches!(
            CoinConfig::parse(&buff[..n + 1]),
            Err(ApduError::InvalidLength)
        ));
    }

    #[test]
    fn coin_config_trailing_sub_config() {
        let mut buff = [0u8; 64];
        let n = xrp().encode(&mut buff).unwrap();

        // Extend SUB_LEN to cover a stray byte
        buff[8] += 1;
        buff[n] = 0xaa;

        assert!(matches!(
            CoinConfig::parse(&buff[..n + 1]),
            Err(ApduError::InvalidLength)
        ));
    }

    #[test]
    fn coin_config_unknown_format() {
        let mut buff = [0u8; 64];
        let n = xrp().encode(&mut buff).unwrap();

        buff[13] = 0x07;

        assert!(matches!(
            CoinConfig::parse(&buff[..n]),
            Err(ApduError::InvalidEncoding)
        ));
    }

    #[test]
    fn coin_config_upper_case_hrp() {
        let buff = [
            3, b'B', b'T', b'C', 3, b'B', b'T', b'C', 9, 0, 0, 0, 0, 0x02, 0x00, 2, b'B', b'C',
        ];

        assert!(matches!(
            CoinConfig::parse(&buff),
            Err(ApduError::InvalidEncoding)
        ));
    }

    #[test]
    fn coin_config_empty_ticker() {
        let buff = [0, 3, b'X', b'R', b'P'];

        assert!(matches!(
            CoinConfig::parse(&buff),
            Err(ApduError::InvalidLength)
        ));
    }
}
