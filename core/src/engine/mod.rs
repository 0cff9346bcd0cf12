// Copyright (c) 2022-2023 The MobileCoin Foundation

//! The [Engine] provides swap validation required by hardware wallets.
//!
//! This handles [Event] inputs and returns [Output] responses to the caller,
//! see [apdu][crate::apdu] for APDU protocol / encoding specifications.

use core::mem;

use k256::ecdsa::VerifyingKey;
use rand_core::{CryptoRngCore, OsRng};
use strum::{Display, EnumIter, EnumString, EnumVariantNames};

use crate::apdu::{
    partner::PARTNER_KEY_LEN,
    state::SwapState,
    transaction::{TransactionId, TRANSACTION_ID_LEN},
    Instruction, StatusCode, Subcommand, SWAP_APDU_CLA,
};

mod error;
pub use error::Error;

mod event;
pub use event::{AddressKind, Event};

mod output;
pub use output::Output;

pub mod address;
pub mod config;
pub mod derivation;
pub mod partner;
pub mod signature;
pub mod transaction;

mod session;
pub use session::AddressChecks;
use session::{Session, SignatureChecked};

use address::PublicKey;
use config::{ConfigTrust, CurrencyConfig};
use derivation::{derive_public_key, DerivationPath};
use partner::{PartnerClaim, PartnerName};
use signature::{sha256, verify_digest};
pub use transaction::{Amount, SwapTransaction};

/// Application version, reported via [`Event::GetVersion`]
pub const VERSION: (u8, u8, u8) = (
    parse_u8(env!("CARGO_PKG_VERSION_MAJOR")),
    parse_u8(env!("CARGO_PKG_VERSION_MINOR")),
    parse_u8(env!("CARGO_PKG_VERSION_PATCH")),
);

const fn parse_u8(s: &str) -> u8 {
    let b = s.as_bytes();
    let mut v = 0u8;
    let mut i = 0;

    while i < b.len() {
        v = v * 10 + (b[i] - b'0');
        i += 1;
    }

    v
}

/// Engine session state enumeration
#[derive(Copy, Clone, PartialEq, Debug, EnumString, Display, EnumVariantNames, EnumIter)]
pub enum State {
    /// No session
    Idle,
    /// Session started, awaiting partner authentication
    AwaitingPartner,
    /// Partner authenticated, awaiting transaction payload
    PartnerVerified,
    /// Transaction loaded, awaiting signature check
    TransactionReceived,
    /// Transaction signature verified, address checks permitted
    SignatureVerified,
}

impl State {
    /// Fetch wire state for [`StateResp`][crate::apdu::state::StateResp] encoding
    pub fn swap_state(&self) -> SwapState {
        match self {
            State::Idle => SwapState::Idle,
            State::AwaitingPartner => SwapState::AwaitingPartner,
            State::PartnerVerified => SwapState::PartnerVerified,
            State::TransactionReceived => SwapState::TransactionReceived,
            State::SignatureVerified => SwapState::SignatureVerified,
        }
    }
}

/// Fixed trust roots, injected at engine construction
#[derive(Clone, Debug)]
pub struct TrustRoots {
    /// Signs partner credentials (name and key)
    pub partner_root: VerifyingKey,
    /// Signs currency configurations
    pub config_root: VerifyingKey,
}

impl TrustRoots {
    /// Load trust roots from SEC1 encoded public keys
    pub fn from_sec1(partner_root: &[u8], config_root: &[u8]) -> Result<Self, Error> {
        Ok(Self {
            partner_root: VerifyingKey::from_sec1_bytes(partner_root)
                .map_err(|_| Error::InvalidTrustRoot)?,
            config_root: VerifyingKey::from_sec1_bytes(config_root)
                .map_err(|_| Error::InvalidTrustRoot)?,
        })
    }
}

/// Validated swap, returned once by [`Engine::complete`]
#[derive(Clone, PartialEq, Debug)]
pub struct ValidatedSwap {
    pub partner_name: PartnerName,
    pub transaction: SwapTransaction,
    /// Payin fee expected by the host
    pub fee: Amount,
    /// Verified source currency configuration, used to build the payin transaction
    pub payin_config: CurrencyConfig,
}

/// [Engine] provides hardware-independent swap validation
///
pub struct Engine<DRV: Driver, RNG: CryptoRngCore = OsRng> {
    session: Session,
    roots: TrustRoots,

    drv: DRV,
    rng: RNG,
}

/// [`Driver`] trait provides platform support for [`Engine`] instances
pub trait Driver {
    /// BIP32 secp256k1 derivation, returning the compressed public key
    fn secp256k1_public_key(&self, path: &[u32]) -> PublicKey;
}

impl<T: Driver> Driver for &mut T {
    fn secp256k1_public_key(&self, path: &[u32]) -> PublicKey {
        T::secp256k1_public_key(self, path)
    }
}

impl<DRV: Driver> Engine<DRV> {
    /// Create a new swap engine instance with the provided driver and trust roots,
    /// using the default [OsRng]
    pub fn new(drv: DRV, roots: TrustRoots) -> Self {
        Self::new_with_rng(drv, roots, OsRng {})
    }
}

impl<DRV: Driver, RNG: CryptoRngCore> Engine<DRV, RNG> {
    /// Create a new swap engine instance with the provided driver, trust roots and rng
    pub fn new_with_rng(drv: DRV, roots: TrustRoots, rng: RNG) -> Self {
        Self {
            session: Session::Idle,
            roots,
            drv,
            rng,
        }
    }

    /// Handle incoming swap events
    #[cfg_attr(feature = "noinline", inline(never))]
    pub fn update(&mut self, evt: &Event) -> Result<Output, Error> {
        #[cfg(feature = "log")]
        log::debug!("event: {:02x?}", evt);

        match evt {
            // Empty event, do nothing
            Event::None => Ok(Output::None),

            Event::GetVersion => Ok(Output::Version {
                major: VERSION.0,
                minor: VERSION.1,
                patch: VERSION.2,
            }),

            Event::GetState => Ok(Output::State {
                state: self.state(),
            }),

            // Start a new session, discarding any existing session
            Event::StartNewTransaction => {
                let id = self.new_transaction_id()?;

                #[cfg(feature = "log")]
                log::debug!("new transaction: {}", id);

                self.session = Session::AwaitingPartner { id, claim: None };

                Ok(Output::TransactionId { id })
            }

            Event::SetPartnerKey { name, public_key } => self.set_partner_key(name, public_key),

            Event::CheckPartner { signature } => self.check_partner(signature),

            Event::ProcessTransaction { payload, fee } => self.process_transaction(payload, fee),

            Event::CheckTransactionSignature { signature } => {
                self.check_transaction_signature(signature)
            }

            Event::CheckAddress {
                kind,
                config,
                config_signature,
                address_params,
            } => self.check_address(*kind, config, config_signature, address_params),
        }
    }

    /// Handle a raw command APDU, writing response data to `resp`
    /// and returning the response length or the failure status.
    pub fn apdu(
        &mut self,
        cla: u8,
        ins: u8,
        p1: u8,
        data: &[u8],
        resp: &mut [u8],
    ) -> Result<usize, StatusCode> {
        if cla != SWAP_APDU_CLA {
            return Err(StatusCode::ClassNotSupported);
        }

        if Instruction::try_from(ins).is_err() {
            return Err(StatusCode::InvalidInstruction);
        }

        if Subcommand::try_from(p1).is_err() {
            return Err(StatusCode::WrongP1);
        }

        let evt = Event::parse(ins, data).map_err(|_e| {
            #[cfg(feature = "log")]
            log::warn!("apdu decode failed (ins: {:02x}): {:?}", ins, _e);

            StatusCode::IncorrectCommandData
        })?;

        // Responses must fit before any session change is applied
        if resp.len() < evt.response_len() {
            #[cfg(feature = "log")]
            log::error!(
                "response buffer too small (ins: {:02x}, {} < {})",
                ins,
                resp.len(),
                evt.response_len()
            );

            return Err(StatusCode::InternalError);
        }

        let output = self.update(&evt).map_err(|e| e.status())?;

        output
            .encode(resp)
            .map_err(|_| StatusCode::InternalError)
    }

    /// Fetch current engine state
    pub fn state(&self) -> State {
        self.session.state()
    }

    /// Fetch the active transaction id
    pub fn transaction_id(&self) -> Option<TransactionId> {
        match &self.session {
            Session::Idle => None,
            Session::AwaitingPartner { id, .. } | Session::PartnerVerified { id, .. } => Some(*id),
            Session::TransactionReceived { tx, .. } | Session::SignatureVerified { tx, .. } => {
                Some(*tx.transaction_id())
            }
        }
    }

    /// Fetch the verified transaction, available once the signature is checked
    pub fn transaction(&self) -> Option<&SwapTransaction> {
        match &self.session {
            Session::SignatureVerified { tx, .. } => Some(tx),
            _ => None,
        }
    }

    /// Fetch the verified partner name, available once the signature is checked
    pub fn partner_name(&self) -> Option<&[u8]> {
        match &self.session {
            Session::SignatureVerified { partner, .. } => Some(partner.name()),
            _ => None,
        }
    }

    /// Fetch the payin fee, available once the signature is checked
    pub fn fee(&self) -> Option<Amount> {
        match &self.session {
            Session::SignatureVerified { fee, .. } => Some(*fee),
            _ => None,
        }
    }

    /// Fetch the verified payin (source currency) configuration, available once the refund is checked
    pub fn payin_config(&self) -> Option<&CurrencyConfig> {
        match &self.session {
            Session::SignatureVerified { payin_config, .. } => payin_config.as_ref(),
            _ => None,
        }
    }

    /// Fetch completed address checks, available once the signature is checked
    pub fn checked(&self) -> Option<AddressChecks> {
        match &self.session {
            Session::SignatureVerified { checked, .. } => Some(*checked),
            _ => None,
        }
    }

    /// Consume a fully validated session (payout and refund checked),
    /// returning the engine to [`State::Idle`].
    ///
    /// Sessions that are not yet complete are left unchanged.
    pub fn complete(&mut self) -> Result<ValidatedSwap, Error> {
        match &self.session {
            Session::SignatureVerified {
                checked,
                payin_config: Some(_),
                ..
            } if checked.is_all() => (),
            _ => return Err(Error::Incomplete),
        }

        match mem::replace(&mut self.session, Session::Idle) {
            Session::SignatureVerified {
                partner,
                tx,
                fee,
                payin_config: Some(payin_config),
                ..
            } => {
                #[cfg(feature = "log")]
                log::info!(
                    "swap {} complete, payin via {}",
                    tx.transaction_id(),
                    payin_config.app_name()
                );

                Ok(ValidatedSwap {
                    partner_name: partner.into_name(),
                    transaction: tx,
                    fee,
                    payin_config,
                })
            }
            _ => Err(Error::Incomplete),
        }
    }

    /// Reset engine state, discarding any session
    pub fn reset(&mut self) {
        self.session = Session::Idle;
    }

    /// Generate a transaction id of upper-case letters via rejection sampling
    fn new_transaction_id(&mut self) -> Result<TransactionId, Error> {
        let mut id = [0u8; TRANSACTION_ID_LEN];

        for c in id.iter_mut() {
            *c = loop {
                let v = (self.rng.next_u32() & 0x1f) as u8;
                if v < 26 {
                    break b'A' + v;
                }
            };
        }

        TransactionId::new(id).ok_or(Error::Unknown)
    }

    #[cfg_attr(feature = "noinline", inline(never))]
    fn set_partner_key(
        &mut self,
        name: &[u8],
        public_key: &[u8; PARTNER_KEY_LEN],
    ) -> Result<Output, Error> {
        // Partner may only be declared once per session
        match &self.session {
            Session::AwaitingPartner { claim: None, .. } => (),
            _ => return Err(self.unexpected("set partner key")),
        }

        let c = PartnerClaim::new(name, public_key)?;

        if let Session::AwaitingPartner { claim, .. } = &mut self.session {
            *claim = Some(c);
        }

        #[cfg(feature = "log")]
        log::debug!("partner declared: {}", partner::display_name(name));

        Ok(Output::None)
    }

    #[cfg_attr(feature = "noinline", inline(never))]
    fn check_partner(&mut self, signature: &[u8]) -> Result<Output, Error> {
        match &self.session {
            Session::AwaitingPartner { claim: Some(_), .. } => (),
            _ => return Err(self.unexpected("check partner")),
        }

        // Session is discarded unless verification succeeds
        let (id, claim) = match mem::replace(&mut self.session, Session::Idle) {
            Session::AwaitingPartner {
                id,
                claim: Some(claim),
            } => (id, claim),
            _ => return Err(Error::Unknown),
        };

        let partner = claim.verify(&self.roots.partner_root, signature).map_err(|e| {
            #[cfg(feature = "log")]
            log::error!("partner rejected: {:?}", e);

            e
        })?;

        #[cfg(feature = "log")]
        log::info!("partner verified: {}", partner::display_name(partner.name()));

        self.session = Session::PartnerVerified { id, partner };

        Ok(Output::None)
    }

    #[cfg_attr(feature = "noinline", inline(never))]
    fn process_transaction(&mut self, payload: &[u8], fee: &[u8]) -> Result<Output, Error> {
        match &self.session {
            Session::PartnerVerified { .. } => (),
            _ => return Err(self.unexpected("process transaction")),
        }

        // Any failure from here discards the session
        let (id, partner) = match mem::replace(&mut self.session, Session::Idle) {
            Session::PartnerVerified { id, partner } => (id, partner),
            _ => return Err(Error::Unknown),
        };

        let fee = Amount::from_be_slice(fee).ok_or(Error::InvalidFee)?;

        let tx = SwapTransaction::decode(payload, &id).map_err(|e| {
            #[cfg(feature = "log")]
            log::error!("transaction rejected: {:?}", e);

            e
        })?;

        if let Some(declared) = tx.declared_fee() {
            if declared > fee {
                #[cfg(feature = "log")]
                log::error!("declared fee {} exceeds expected fee {}", declared, fee);

                return Err(Error::FeeExceeded);
            }
        }

        #[cfg(feature = "log")]
        log::debug!(
            "transaction {} -> {}, to wallet: {}, fee: {}",
            tx.currency_from(),
            tx.currency_to(),
            tx.amount_to_wallet(),
            fee
        );

        self.session = Session::TransactionReceived {
            partner,
            tx,
            fee,
            digest: sha256(payload),
        };

        Ok(Output::None)
    }

    #[cfg_attr(feature = "noinline", inline(never))]
    fn check_transaction_signature(&mut self, signature: &[u8]) -> Result<Output, Error> {
        match &self.session {
            Session::TransactionReceived { .. } => (),
            _ => return Err(self.unexpected("check transaction signature")),
        }

        // Session is discarded unless verification succeeds
        let (partner, tx, fee, digest) = match mem::replace(&mut self.session, Session::Idle) {
            Session::TransactionReceived {
                partner,
                tx,
                fee,
                digest,
            } => (partner, tx, fee, digest),
            _ => return Err(Error::Unknown),
        };

        if !verify_digest(partner.key(), &digest, signature)? {
            #[cfg(feature = "log")]
            log::error!("transaction signature rejected");

            return Err(Error::TransactionSignatureInvalid);
        }

        #[cfg(feature = "log")]
        log::info!("transaction {} signature verified", tx.transaction_id());

        self.session = Session::SignatureVerified {
            partner,
            tx,
            fee,
            _witness: SignatureChecked::new(),
            checked: AddressChecks::empty(),
            payin_config: None,
        };

        Ok(Output::None)
    }

    /// Check a payout / refund address, failures leave the session unchanged
    #[cfg_attr(feature = "noinline", inline(never))]
    fn check_address(
        &mut self,
        kind: AddressKind,
        config: &[u8],
        config_signature: &[u8],
        address_params: &[u8],
    ) -> Result<Output, Error> {
        let tx = match &self.session {
            Session::SignatureVerified { tx, .. } => tx,
            _ => return Err(self.unexpected("check address")),
        };

        let path = DerivationPath::parse(address_params)?;

        // Configurations are verified for every check, never cached
        let currency = ConfigTrust::new(&self.roots.config_root)
            .verify(config, config_signature)
            .map_err(|_| Error::InvalidAddress)?;

        let (ticker, address, extra_id, flag) = match kind {
            AddressKind::Payout => (
                tx.currency_to(),
                tx.payout_address(),
                tx.payout_extra_id(),
                AddressChecks::PAYOUT,
            ),
            AddressKind::Refund => (
                tx.currency_from(),
                tx.refund_address(),
                tx.refund_extra_id(),
                AddressChecks::REFUND,
            ),
        };

        if !currency.ticker().eq_ignore_ascii_case(ticker) {
            #[cfg(feature = "log")]
            log::warn!(
                "{:?} currency mismatch (config: {}, transaction: {})",
                kind,
                currency.ticker(),
                ticker
            );

            return Err(Error::InvalidAddress);
        }

        let pk = derive_public_key(&self.drv, &path, &currency)?;

        if !address::matches(address, extra_id, &pk, &currency) {
            #[cfg(feature = "log")]
            log::warn!("{:?} address mismatch: {}", kind, address);

            return Err(Error::InvalidAddress);
        }

        #[cfg(feature = "log")]
        log::info!("{:?} address verified: {}", kind, address);

        if let Session::SignatureVerified {
            checked,
            payin_config,
            ..
        } = &mut self.session
        {
            *checked |= flag;

            if kind == AddressKind::Refund {
                *payin_config = Some(currency);
            }
        }

        Ok(Output::None)
    }

    fn unexpected(&self, _op: &str) -> Error {
        #[cfg(feature = "log")]
        log::error!("Unexpected {} in state {:?}", _op, self.state());

        Error::UnexpectedEvent
    }
}
