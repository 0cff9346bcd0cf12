// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Address encoding and matching for verified currency configurations.
//!
//! Decoding failures are reported as a mismatch rather than an error,
//! candidate addresses come from the partner and are untrusted.

use alloc::{string::String, vec::Vec};

use bech32::{segwit, Hrp};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use crate::apdu::config::{AddressFormat, Base58Alphabet, ExtraIdPolicy};

use super::{config::CurrencyConfig, Error};

/// Compressed secp256k1 public key
pub type PublicKey = [u8; 33];

/// `RIPEMD160(SHA256(pk))` key hash
pub fn key_hash(pk: &PublicKey) -> [u8; 20] {
    Ripemd160::digest(Sha256::digest(pk)).into()
}

fn alphabet(a: Base58Alphabet) -> &'static bs58::Alphabet {
    match a {
        Base58Alphabet::Bitcoin => bs58::Alphabet::BITCOIN,
        Base58Alphabet::Ripple => bs58::Alphabet::RIPPLE,
    }
}

/// Encode a public key to the canonical address for a currency
pub fn encode(pk: &PublicKey, config: &CurrencyConfig) -> Result<String, Error> {
    let h = key_hash(pk);

    match config.format() {
        AddressFormat::Base58Check {
            alphabet: a,
            version,
        } => {
            let mut d = Vec::with_capacity(version.len() + h.len());
            d.extend_from_slice(version);
            d.extend_from_slice(&h);

            Ok(bs58::encode(d)
                .with_alphabet(alphabet(*a))
                .with_check()
                .into_string())
        }
        AddressFormat::SegwitV0 { hrp } => {
            let hrp = Hrp::parse(hrp).map_err(|_| Error::InvalidAddress)?;
            segwit::encode(hrp, segwit::VERSION_0, &h).map_err(|_| Error::EncodingFailed)
        }
    }
}

/// Check a candidate address and extra id match the public key under the
/// provided currency rules
pub fn matches(address: &str, extra_id: &str, pk: &PublicKey, config: &CurrencyConfig) -> bool {
    if !extra_id_valid(config.extra_id(), extra_id) {
        #[cfg(feature = "log")]
        log::warn!("extra id invalid for policy {:?}", config.extra_id());

        return false;
    }

    let h = key_hash(pk);

    match config.format() {
        AddressFormat::Base58Check {
            alphabet: a,
            version,
        } => {
            let d = match bs58::decode(address)
                .with_alphabet(alphabet(*a))
                .with_check(None)
                .into_vec()
            {
                Ok(v) => v,
                Err(_) => return false,
            };

            d.len() == version.len() + h.len() && d.starts_with(version) && d[version.len()..] == h
        }
        AddressFormat::SegwitV0 { hrp } => {
            let expected = match Hrp::parse(hrp) {
                Ok(v) => v,
                Err(_) => return false,
            };

            match segwit::decode(address) {
                Ok((a, v, p)) => a == expected && v == segwit::VERSION_0 && p[..] == h,
                Err(_) => false,
            }
        }
    }
}

/// Check an extra id (destination tag) is well formed for the policy
pub fn extra_id_valid(policy: ExtraIdPolicy, extra_id: &str) -> bool {
    match (policy, extra_id.is_empty()) {
        (ExtraIdPolicy::None, empty) => empty,
        (ExtraIdPolicy::Optional, true) => true,
        (ExtraIdPolicy::Mandatory, true) => false,
        (_, false) => is_canonical_u32(extra_id),
    }
}

/// Canonical unsigned decimal, no sign or leading zeros
fn is_canonical_u32(s: &str) -> bool {
    if !s.bytes().all(|c| c.is_ascii_digit()) {
        return false;
    }
    if s.len() > 1 && s.starts_with('0') {
        return false;
    }

    s.parse::<u32>().is_ok()
}
