// Copyright (c) 2022-2023 The MobileCoin Foundation

use bitflags::bitflags;

use crate::apdu::transaction::TransactionId;

use super::{
    config::CurrencyConfig,
    partner::{Partner, PartnerClaim},
    transaction::{Amount, SwapTransaction},
    State,
};

bitflags! {
    /// Address checks completed for a verified transaction
    pub struct AddressChecks: u8 {
        /// Payout address proven to belong to the wallet
        const PAYOUT = 1 << 0;
        /// Refund address proven to belong to the wallet
        const REFUND = 1 << 1;
    }
}

/// Witness that the transaction signature was checked against the trusted partner,
/// only constructed by the engine on successful verification
#[derive(Clone, Debug)]
pub(crate) struct SignatureChecked(());

impl SignatureChecked {
    pub(crate) fn new() -> Self {
        Self(())
    }
}

/// Swap session, each state carries only the data valid in that state
#[derive(Clone, Debug)]
pub(crate) enum Session {
    /// No session
    Idle,

    /// Session opened, partner claim optional until declared
    AwaitingPartner {
        id: TransactionId,
        claim: Option<PartnerClaim>,
    },

    /// Partner authenticated
    PartnerVerified { id: TransactionId, partner: Partner },

    /// Transaction decoded and bound, pending signature check
    TransactionReceived {
        partner: Partner,
        tx: SwapTransaction,
        fee: Amount,
        digest: [u8; 32],
    },

    /// Transaction signature verified, address checks permitted
    SignatureVerified {
        partner: Partner,
        tx: SwapTransaction,
        fee: Amount,
        _witness: SignatureChecked,
        checked: AddressChecks,
        /// Verified source currency configuration, from the last refund check
        payin_config: Option<CurrencyConfig>,
    },
}

impl Session {
    /// Fetch the public state for this session
    pub fn state(&self) -> State {
        match self {
            Session::Idle => State::Idle,
            Session::AwaitingPartner { .. } => State::AwaitingPartner,
            Session::PartnerVerified { .. } => State::PartnerVerified,
            Session::TransactionReceived { .. } => State::TransactionReceived,
            Session::SignatureVerified { .. } => State::SignatureVerified,
        }
    }
}
