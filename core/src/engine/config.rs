// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Currency configuration trust.
//!
//! Configurations are verified against the issuer root for every use,
//! a [`CurrencyConfig`] only exists once its signature has been checked.

use alloc::vec::Vec;

use heapless::String;
use k256::ecdsa::VerifyingKey;

use crate::apdu::config::{
    AddressFormat, CoinConfig, ExtraIdPolicy, MAX_APP_NAME_LEN, MAX_TICKER_LEN,
};

use super::signature::{sha256, verify_digest};

/// Configuration rejected (signature or encoding), callers report this
/// exactly as an address mismatch
#[derive(Copy, Clone, PartialEq, Debug)]
pub struct Rejected;

/// Verified currency configuration
#[derive(Clone, PartialEq, Debug)]
pub struct CurrencyConfig {
    ticker: String<MAX_TICKER_LEN>,
    app_name: String<MAX_APP_NAME_LEN>,
    coin_type: u32,
    format: AddressFormat,
    extra_id: ExtraIdPolicy,
    /// Signed configuration bytes, as verified
    raw: Vec<u8>,
}

impl CurrencyConfig {
    /// Build a configuration without verification, for codec tests
    #[cfg(test)]
    pub(crate) fn new_unchecked(
        ticker: &str,
        coin_type: u32,
        format: AddressFormat,
        extra_id: ExtraIdPolicy,
    ) -> Self {
        Self {
            ticker: String::try_from(ticker).unwrap(),
            app_name: String::try_from(ticker).unwrap(),
            coin_type,
            format,
            extra_id,
            raw: Vec::new(),
        }
    }

    /// Currency ticker, compared against transaction currencies
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// Currency application responsible for this coin
    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    /// SLIP-44 coin type
    pub fn coin_type(&self) -> u32 {
        self.coin_type
    }

    pub fn format(&self) -> &AddressFormat {
        &self.format
    }

    pub fn extra_id(&self) -> ExtraIdPolicy {
        self.extra_id
    }

    /// Configuration bytes covered by the issuer signature
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }
}

/// Configuration verifier bound to the issuer root key
pub struct ConfigTrust<'a> {
    root: &'a VerifyingKey,
}

impl<'a> ConfigTrust<'a> {
    pub fn new(root: &'a VerifyingKey) -> Self {
        Self { root }
    }

    /// Verify `signature` over the exact `config` bytes, then decode the configuration
    pub fn verify(&self, config: &[u8], signature: &[u8]) -> Result<CurrencyConfig, Rejected> {
        let digest = sha256(config);

        match verify_digest(self.root, &digest, signature) {
            Ok(true) => (),
            _ => {
                #[cfg(feature = "log")]
                log::warn!("currency configuration signature rejected");

                return Err(Rejected);
            }
        }

        let c = CoinConfig::parse(config).map_err(|_e| {
            #[cfg(feature = "log")]
            log::warn!("signed currency configuration malformed: {:?}", _e);

            Rejected
        })?;

        let ticker = String::try_from(c.ticker).map_err(|_| Rejected)?;
        let app_name = String::try_from(c.app_name).map_err(|_| Rejected)?;

        #[cfg(feature = "log")]
        log::debug!(
            "currency configuration: {} ({}), coin type {}",
            c.ticker,
            c.app_name,
            c.coin_type
        );

        Ok(CurrencyConfig {
            ticker,
            app_name,
            coin_type: c.coin_type,
            format: c.format,
            extra_id: c.extra_id,
            raw: Vec::from(config),
        })
    }
}
