// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Transaction APDUs, used to open a swap session and load the partner signed payload.
//!
//! See [ledger_swap_core::engine] for interaction and state machines

use encdec::{Decode, DecodeOwned, Encode};

use super::{ApduError, ApduStatic, Instruction, SWAP_APDU_CLA};
use crate::helpers::{read_lv, write_lv};

/// Length of device transaction identifiers
pub const TRANSACTION_ID_LEN: usize = 10;

/// Device generated transaction identifier, binding a partner payload to a session.
///
/// Identifiers are upper-case ASCII letters, so are both valid bytes and a valid `str`.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct TransactionId([u8; TRANSACTION_ID_LEN]);

impl TransactionId {
    /// Create an identifier from raw bytes, returning `None` unless all bytes are `A..=Z`
    pub fn new(b: [u8; TRANSACTION_ID_LEN]) -> Option<Self> {
        match b.iter().all(|c| c.is_ascii_uppercase()) {
            true => Some(Self(b)),
            false => None,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn as_str(&self) -> &str {
        // Construction guarantees ascii contents
        core::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl core::fmt::Debug for TransactionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl core::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Encode for TransactionId {
    type Error = ApduError;

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(TRANSACTION_ID_LEN)
    }

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        if buff.len() < TRANSACTION_ID_LEN {
            return Err(ApduError::InvalidLength);
        }

        buff[..TRANSACTION_ID_LEN].copy_from_slice(&self.0);
        Ok(TRANSACTION_ID_LEN)
    }
}

impl DecodeOwned for TransactionId {
    type Output = Self;

    type Error = ApduError;

    fn decode_owned(buff: &[u8]) -> Result<(Self::Output, usize), ApduError> {
        if buff.len() < TRANSACTION_ID_LEN {
            return Err(ApduError::InvalidLength);
        }

        let mut b = [0u8; TRANSACTION_ID_LEN];
        b.copy_from_slice(&buff[..TRANSACTION_ID_LEN]);

        match Self::new(b) {
            Some(v) => Ok((v, TRANSACTION_ID_LEN)),
            None => Err(ApduError::InvalidEncoding),
        }
    }
}

/// Start a new swap session (0 length APDU), returns [`TransactionIdResp`]
#[derive(Copy, Clone, PartialEq, Debug, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct StartNewTransactionReq;

impl ApduStatic for StartNewTransactionReq {
    const CLA: u8 = SWAP_APDU_CLA;
    const INS: u8 = Instruction::StartNewTransaction as u8;
}

/// Transaction identifier response APDU
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                                                               |
/// /                        TRANSACTION_ID                         /
/// /                    (10 upper-case ascii bytes)                /
/// |                               +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                               |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug, Encode, Decode)]
#[encdec(error = "ApduError")]
pub struct TransactionIdResp {
    pub id: TransactionId,
}

/// Load the partner signed transaction payload along with the payin fee
/// expected by the host.
///
/// ## Encoding:
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |  PAYLOAD_LEN  |                                               |
/// +-+-+-+-+-+-+-+-+                                               +
/// /                            PAYLOAD                            /
/// /                       (variable length)                       /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |    FEE_LEN    |                                               |
/// +-+-+-+-+-+-+-+-+                                               +
/// /                    FEE (big-endian unsigned)                  /
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct ProcessTransactionReq<'a> {
    /// Serialized `NewTransactionResponse` payload, exactly as signed by the partner
    pub payload: &'a [u8],
    /// Expected payin fee
    pub fee: &'a [u8],
}

impl<'a> ProcessTransactionReq<'a> {
    pub fn new(payload: &'a [u8], fee: &'a [u8]) -> Self {
        Self { payload, fee }
    }
}

impl<'a> ApduStatic for ProcessTransactionReq<'a> {
    const CLA: u8 = SWAP_APDU_CLA;
    const INS: u8 = Instruction::ProcessTransactionResponse as u8;
}

impl<'a> Encode for ProcessTransactionReq<'a> {
    type Error = ApduError;

    fn encode(&self, buff: &mut [u8]) -> Result<usize, ApduError> {
        let mut index = 0;

        index += write_lv(self.payload, &mut buff[index..])?;
        index += write_lv(self.fee, &mut buff[index..])?;

        Ok(index)
    }

    fn encode_len(&self) -> Result<usize, ApduError> {
        Ok(2 + self.payload.len() + self.fee.len())
    }
}

impl<'a> Decode<'a> for ProcessTransactionReq<'a> {
    type Output = Self;
    type Error = ApduError;

    fn decode(buff: &'a [u8]) -> Result<(Self, usize), ApduError> {
        let mut index = 0;

        let (payload, n) = read_lv(&buff[index..])?;
        index += n;

        let (fee, n) = read_lv(&buff[index..])?;
        index += n;

        Ok((Self { payload, fee }, index))
    }
}

/// Check the partner signature over the loaded transaction payload
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
pub struct CheckTransactionSignatureReq<'a> {
    /// DER encoded ECDSA signature
    pub signature: &'a [u8],
}

impl<'a> ApduStatic for CheckTransactionSignatureReq<'a> {
    const CLA: u8 = SWAP_APDU_CLA;
    const INS: u8 = Instruction::CheckTransactionSignature as u8;
}

impl<'a> Encode for CheckTransactionSignatureReq<'a> {
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

impl<'a> Decode<'a> for CheckTransactionSignatureReq<'a> {
    type Output = Self;
    type Error = ApduError;

    fn decode(buff: &'a [u8]) -> Result<(Self, usize), ApduError> {
        Ok((Self { signature: buff }, buff.len()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::encode_decode_apdu;

    #[test]
    fn transaction_id_resp_apdu() {
        let id = TransactionId::new(*b"ABCDEFGHIJ").unwrap();

        let mut buff = [0u8; 32];
        let n = encode_decode_apdu(&mut buff, &TransactionIdResp { id });
        assert_eq!(&buff[..n], b"ABCDEFGHIJ");
    }

    #[test]
    fn transaction_id_rejects_non_letters() {
        assert!(TransactionId::new(*b"ABCDEFGHI1").is_none());
        assert!(TransactionId::new(*b"abcdefghij").is_none());
    }

    #[test]
    fn process_transaction_apdu() {
        let payload = [0x0au8; 180];
        let fee = [0x98, 0x96, 0x80];

        let mut buff = [0u8; 256];
        let n = encode_decode_apdu(&mut buff, &ProcessTransactionReq::new(&payload, &fee));

        assert_eq!(buff[0], 180);
        assert_eq!(buff[181], 3);
        assert_eq!(n, 185);
    }

    #[test]
    fn process_transaction_missing_fee() {
        let buff = [2u8, 0xaa, 0xbb];
        assert!(matches!(
            ProcessTransactionReq::decode(&buff),
            Err(ApduError::InvalidLength)
        ));
    }
}
