// Copyright (c) 2022-2023 The MobileCoin Foundation

use crate::apdu::StatusCode;

/// [Engine][super::Engine] errors
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "thiserror", derive(thiserror::Error))]
#[repr(u8)]
pub enum Error {
    /// Unexpected event
    #[cfg_attr(feature = "thiserror", error("Unexpected event"))]
    UnexpectedEvent = 0x01,

    /// Partner name outside allowed bounds
    #[cfg_attr(feature = "thiserror", error("invalid partner name"))]
    InvalidPartnerName = 0x02,

    /// Partner key is not a valid secp256k1 point
    #[cfg_attr(feature = "thiserror", error("invalid partner key"))]
    InvalidPartnerKey = 0x03,

    /// Signature not DER framed
    #[cfg_attr(feature = "thiserror", error("invalid signature encoding"))]
    InvalidSignatureFormat = 0x04,

    /// Partner credential signature rejected
    #[cfg_attr(feature = "thiserror", error("partner signature verification failed"))]
    PartnerSignatureInvalid = 0x05,

    /// Transaction payload signature rejected
    #[cfg_attr(feature = "thiserror", error("transaction signature verification failed"))]
    TransactionSignatureInvalid = 0x06,

    /// Transaction payload decoding failed
    #[cfg_attr(feature = "thiserror", error("transaction decoding failed"))]
    DeserializationFailed = 0x07,

    /// Payload transaction id does not match session
    #[cfg_attr(feature = "thiserror", error("wrong transaction id"))]
    WrongTransactionId = 0x08,

    /// Fee encoding invalid
    #[cfg_attr(feature = "thiserror", error("invalid fee"))]
    InvalidFee = 0x09,

    /// Declared fee exceeds expected fee
    #[cfg_attr(feature = "thiserror", error("declared fee exceeds expected fee"))]
    FeeExceeded = 0x0a,

    /// Derivation path malformed
    #[cfg_attr(feature = "thiserror", error("invalid derivation path"))]
    InvalidPath = 0x0b,

    /// Address, currency or configuration rejected
    #[cfg_attr(feature = "thiserror", error("invalid address"))]
    InvalidAddress = 0x0c,

    /// Invalid trust root key
    #[cfg_attr(feature = "thiserror", error("invalid trust root"))]
    InvalidTrustRoot = 0x0d,

    /// Response encoding failed
    #[cfg_attr(feature = "thiserror", error("response encoding failed"))]
    EncodingFailed = 0x0e,

    /// Session not ready for completion
    #[cfg_attr(feature = "thiserror", error("session incomplete"))]
    Incomplete = 0x0f,

    /// Unknown / not-yet defined error (placeholder)
    #[cfg_attr(feature = "thiserror", error("unknown"))]
    Unknown = 0xf0,
}

impl Error {
    /// Map an engine error to the status word returned to the host
    pub fn status(&self) -> StatusCode {
        use Error::*;

        match self {
            InvalidPartnerName | InvalidPartnerKey | InvalidSignatureFormat | InvalidFee
            | FeeExceeded | InvalidPath => StatusCode::IncorrectCommandData,
            UnexpectedEvent | Incomplete => StatusCode::InvalidInstruction,
            PartnerSignatureInvalid | TransactionSignatureInvalid => {
                StatusCode::SignVerificationFail
            }
            DeserializationFailed => StatusCode::DeserializationFailed,
            WrongTransactionId => StatusCode::WrongTransactionId,
            InvalidAddress => StatusCode::InvalidAddress,
            InvalidTrustRoot | EncodingFailed | Unknown => StatusCode::InternalError,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn address_failures_share_status() {
        assert_eq!(Error::InvalidAddress.status().to_be_bytes(), [0x6a, 0x83]);
        assert_eq!(Error::UnexpectedEvent.status(), StatusCode::InvalidInstruction);
        assert_eq!(
            Error::PartnerSignatureInvalid.status(),
            Error::TransactionSignatureInvalid.status()
        );
    }
}
