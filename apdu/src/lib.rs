// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Protocol / APDU definitions for hardware wallet swap validation
//!
//! This module provides a protocol specification and reference implementation for communication
//! with the swap validation application, where a host relays a transaction proposed by an
//! exchange partner to the device for verification.
//!
//! Each command is a single APDU with class [`SWAP_APDU_CLA`], an [`Instruction`] code, and the
//! [`Subcommand`] in P1. Variable length fields use a one byte length prefix followed by the
//! field bytes, matching the framing produced by existing exchange clients. Derivation path
//! components and amounts are big-endian, as these are shared with other wallet applications.
//!
//! Failures are reported as a [`StatusCode`] in place of the `0x9000` success word.
//!

#![no_std]

use num_enum::TryFromPrimitive;
use strum::{Display, EnumIter};

pub use ledger_proto::{ApduError, ApduReq, ApduStatic};

pub mod address;
pub mod config;
pub mod partner;
pub mod prelude;
pub mod state;
pub mod transaction;
pub mod version;

mod helpers;

/// Swap APDU Class
pub const SWAP_APDU_CLA: u8 = 0xe0;

/// Swap APDU instruction codes
#[derive(Copy, Clone, Debug, PartialEq, TryFromPrimitive)]
#[repr(u8)]
pub enum Instruction {
    /// Fetch application version
    GetVersion = 0x02,

    /// Start a new swap transaction, returning the device transaction id
    StartNewTransaction = 0x03,

    /// Declare the exchange partner name and public key
    SetPartnerKey = 0x04,

    /// Check the partner declaration against the partner trust root
    CheckPartner = 0x05,

    /// Load the partner-signed transaction payload
    ProcessTransactionResponse = 0x06,

    /// Check the partner signature over the transaction payload
    CheckTransactionSignature = 0x07,

    /// Check the payout address belongs to the wallet
    CheckPayoutAddress = 0x08,

    /// Check the refund address belongs to the wallet
    CheckRefundAddress = 0x09,

    /// Fetch the current session state
    GetState = 0x0b,
}

/// Transaction flavour carried in P1.
///
/// Sell and funding flows (secp256r1 partner keys, raw `R || S` payload
/// signatures, fiat payloads) are not supported and return [`StatusCode::WrongP1`].
#[derive(Copy, Clone, Debug, PartialEq, TryFromPrimitive)]
#[repr(u8)]
pub enum Subcommand {
    /// Crypto to crypto swap
    Swap = 0x00,
}

/// APDU status words
#[derive(Copy, Clone, Debug, PartialEq, Display, EnumIter, TryFromPrimitive)]
#[repr(u16)]
pub enum StatusCode {
    Success = 0x9000,
    IncorrectCommandData = 0x6a80,
    DeserializationFailed = 0x6a81,
    WrongTransactionId = 0x6a82,
    InvalidAddress = 0x6a83,
    InternalError = 0x6a85,
    WrongP1 = 0x6a86,
    InvalidInstruction = 0x6d00,
    ClassNotSupported = 0x6e00,
    SignVerificationFail = 0x9d1a,
}

impl StatusCode {
    /// Status word in wire order
    pub fn to_be_bytes(self) -> [u8; 2] {
        (self as u16).to_be_bytes()
    }
}
