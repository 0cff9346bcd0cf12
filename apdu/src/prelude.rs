//! Prelude to simplify downstream use of APDU objects
//!

pub use crate::{
    address::{AddressParams, CheckAddressReq, CheckPayoutAddressReq, CheckRefundAddressReq},
    config::{AddressFormat, Base58Alphabet, CoinConfig, ExtraIdPolicy},
    partner::{CheckPartnerReq, SetPartnerKeyReq},
    state::{StateReq, StateResp, SwapState},
    transaction::{
        CheckTransactionSignatureReq, ProcessTransactionReq, StartNewTransactionReq,
        TransactionId, TransactionIdResp,
    },
    version::{GetVersionReq, VersionResp},
    Instruction, StatusCode, Subcommand,
};
