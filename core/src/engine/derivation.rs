// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Wallet key derivation for address checks

use heapless::Vec;

use crate::apdu::address::{AddressParams, HARDENED, MAX_PATH_DEPTH};

use super::{address::PublicKey, config::CurrencyConfig, Driver, Error};

/// BIP32 derivation path, decoded from address parameters
#[derive(Clone, PartialEq, Debug)]
pub struct DerivationPath(Vec<u32, MAX_PATH_DEPTH>);

impl DerivationPath {
    /// Parse encoded address parameters
    pub fn parse(buff: &[u8]) -> Result<Self, Error> {
        let p = AddressParams::parse(buff).map_err(|_| Error::InvalidPath)?;
        Ok(Self(p.path))
    }

    pub fn components(&self) -> &[u32] {
        &self.0
    }

    /// SLIP-44 coin type, the hardened second path component
    pub fn coin_type(&self) -> Option<u32> {
        match self.0.get(1) {
            Some(c) if c & HARDENED != 0 => Some(c & !HARDENED),
            _ => None,
        }
    }
}

/// Derive the wallet public key for `path`, which must belong to the `currency` key tree
pub fn derive_public_key<DRV: Driver>(
    drv: &DRV,
    path: &DerivationPath,
    currency: &CurrencyConfig,
) -> Result<PublicKey, Error> {
    if path.coin_type() != Some(currency.coin_type()) {
        #[cfg(feature = "log")]
        log::warn!(
            "derivation path {:08x?} outside coin type {}",
            path.components(),
            currency.coin_type()
        );

        return Err(Error::InvalidAddress);
    }

    Ok(drv.secp256k1_public_key(path.components()))
}
