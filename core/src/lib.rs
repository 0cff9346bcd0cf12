// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Hardware wallet swap validation core
//!
//! This provides a common [Engine][engine] validating exchange (swap) transactions
//! proposed by an untrusted partner, for execution on hardware wallets.
//!
//! Interactions with the [Engine][engine] are performed via [Event][engine::Event]s and [Output][engine::Output]s,
//! see [ledger_swap_apdu] for APDU objects and wire encodings.
//!
//! ## Operations
//!
//! Prior to interacting with a hardware wallet the client may issue a
//! [`GetVersionReq`][ledger_swap_apdu::version::GetVersionReq] to fetch the application version,
//! and a [`StateReq`][ledger_swap_apdu::state::StateReq] at any point to fetch the session state.
//!
//! ### Validating a swap
//!
//! Each step must succeed before the next is accepted, any command issued out of order
//! is rejected without affecting the session.
//!
//! 1. Issue [`StartNewTransactionReq`][ledger_swap_apdu::transaction::StartNewTransactionReq]
//!    to open a session, returning a [`TransactionIdResp`][ledger_swap_apdu::transaction::TransactionIdResp]
//!    containing the device transaction id to be embedded in the partner payload
//! 2. Authenticate the partner
//!     1. Issue [`SetPartnerKeyReq`][ledger_swap_apdu::partner::SetPartnerKeyReq] with the partner name and key
//!     2. Issue [`CheckPartnerReq`][ledger_swap_apdu::partner::CheckPartnerReq] with the partner
//!        credential signature by the partner trust root
//! 3. Issue [`ProcessTransactionReq`][ledger_swap_apdu::transaction::ProcessTransactionReq] with the
//!    partner payload and the expected payin fee
//! 4. Issue [`CheckTransactionSignatureReq`][ledger_swap_apdu::transaction::CheckTransactionSignatureReq]
//!    with the partner signature over the payload
//! 5. Prove addresses belong to the wallet
//!     1. Issue [`CheckPayoutAddressReq`][ledger_swap_apdu::address::CheckPayoutAddressReq] with the
//!        signed configuration for the destination currency
//!     2. Issue [`CheckRefundAddressReq`][ledger_swap_apdu::address::CheckRefundAddressReq] with the
//!        signed configuration for the source currency
//!
//! Once both addresses are checked the firmware presents the swap for approval and calls
//! [`Engine::complete`][engine::Engine::complete] to consume the validated session.
//!

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub use ledger_swap_apdu::{self as apdu};

pub mod engine;
