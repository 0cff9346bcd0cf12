// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Swap transaction payload decoding and binding

use alloc::{string::String, vec::Vec};
use core::fmt;

use prost::Message;

use crate::apdu::transaction::TransactionId;

use super::Error;

/// Maximum significant bytes for amounts
pub const MAX_AMOUNT_LEN: usize = 16;

/// Unsigned amount in a currency's atomic unit, decoded from big-endian bytes
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Amount(u128);

impl Amount {
    pub const fn new(v: u128) -> Self {
        Self(v)
    }

    /// Decode a big-endian unsigned amount, leading zeros are ignored
    pub fn from_be_slice(b: &[u8]) -> Option<Self> {
        let start = b.iter().position(|v| *v != 0).unwrap_or(b.len());
        let b = &b[start..];

        if b.len() > MAX_AMOUNT_LEN {
            return None;
        }

        let mut v = [0u8; MAX_AMOUNT_LEN];
        v[MAX_AMOUNT_LEN - b.len()..].copy_from_slice(b);

        Some(Self(u128::from_be_bytes(v)))
    }

    pub fn value(&self) -> u128 {
        self.0
    }
}

impl fmt::Debug for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Partner payload wire object
#[derive(Clone, PartialEq, Message)]
struct NewTransactionResponse {
    #[prost(string, tag = "1")]
    payin_address: String,
    #[prost(string, tag = "2")]
    payin_extra_id: String,
    #[prost(string, tag = "3")]
    refund_address: String,
    #[prost(string, tag = "4")]
    refund_extra_id: String,
    #[prost(string, tag = "5")]
    payout_address: String,
    #[prost(string, tag = "6")]
    payout_extra_id: String,
    #[prost(string, tag = "7")]
    currency_from: String,
    #[prost(string, tag = "8")]
    currency_to: String,
    #[prost(bytes = "vec", tag = "9")]
    amount_to_provider: Vec<u8>,
    #[prost(bytes = "vec", tag = "10")]
    amount_to_wallet: Vec<u8>,
    #[prost(string, tag = "11")]
    device_transaction_id: String,
    #[prost(bytes = "vec", optional, tag = "12")]
    declared_fee: Option<Vec<u8>>,
}

/// Swap transaction decoded from a partner payload.
///
/// Constructed once from the payload bytes and immutable thereafter,
/// always bound to the session [`TransactionId`].
#[derive(Clone, PartialEq, Debug)]
pub struct SwapTransaction {
    payin_address: String,
    payin_extra_id: String,
    refund_address: String,
    refund_extra_id: String,
    payout_address: String,
    payout_extra_id: String,
    currency_from: String,
    currency_to: String,
    amount_to_provider: Amount,
    amount_to_wallet: Amount,
    transaction_id: TransactionId,
    declared_fee: Option<Amount>,
}

impl SwapTransaction {
    /// Decode a partner payload, checking it is bound to the provided session id
    pub fn decode(payload: &[u8], id: &TransactionId) -> Result<Self, Error> {
        let r = NewTransactionResponse::decode(payload).map_err(|_e| {
            #[cfg(feature = "log")]
            log::warn!("payload decode failed: {:?}", _e);

            Error::DeserializationFailed
        })?;

        if r.device_transaction_id.as_bytes() != id.as_bytes() {
            return Err(Error::WrongTransactionId);
        }

        let amount_to_provider =
            Amount::from_be_slice(&r.amount_to_provider).ok_or(Error::DeserializationFailed)?;
        let amount_to_wallet =
            Amount::from_be_slice(&r.amount_to_wallet).ok_or(Error::DeserializationFailed)?;
        let declared_fee = match &r.declared_fee {
            Some(f) => Some(Amount::from_be_slice(f).ok_or(Error::DeserializationFailed)?),
            None => None,
        };

        Ok(Self {
            payin_address: r.payin_address,
            payin_extra_id: r.payin_extra_id,
            refund_address: r.refund_address,
            refund_extra_id: r.refund_extra_id,
            payout_address: r.payout_address,
            payout_extra_id: r.payout_extra_id,
            currency_from: r.currency_from,
            currency_to: r.currency_to,
            amount_to_provider,
            amount_to_wallet,
            transaction_id: *id,
            declared_fee,
        })
    }

    pub fn payin_address(&self) -> &str {
        &self.payin_address
    }

    pub fn payin_extra_id(&self) -> &str {
        &self.payin_extra_id
    }

    pub fn refund_address(&self) -> &str {
        &self.refund_address
    }

    pub fn refund_extra_id(&self) -> &str {
        &self.refund_extra_id
    }

    pub fn payout_address(&self) -> &str {
        &self.payout_address
    }

    pub fn payout_extra_id(&self) -> &str {
        &self.payout_extra_id
    }

    /// Source currency ticker (refund side)
    pub fn currency_from(&self) -> &str {
        &self.currency_from
    }

    /// Destination currency ticker (payout side)
    pub fn currency_to(&self) -> &str {
        &self.currency_to
    }

    pub fn amount_to_provider(&self) -> Amount {
        self.amount_to_provider
    }

    pub fn amount_to_wallet(&self) -> Amount {
        self.amount_to_wallet
    }

    pub fn transaction_id(&self) -> &TransactionId {
        &self.transaction_id
    }

    /// Fee declared by the partner, where provided
    pub fn declared_fee(&self) -> Option<Amount> {
        self.declared_fee
    }
}
