// Copyright (c) 2022-2023 The MobileCoin Foundation

//! ECDSA (secp256k1, SHA-256) signature checks shared by partner,
//! transaction and configuration verification.

use k256::ecdsa::{signature::hazmat::PrehashVerifier, Signature, VerifyingKey};
use sha2::{Digest, Sha256};

use super::Error;

/// Minimum DER signature length
pub const MIN_DER_LEN: usize = 8;

/// Maximum DER signature length
pub const MAX_DER_LEN: usize = 72;

const DER_SEQUENCE: u8 = 0x30;

/// Compute the SHA-256 digest of the provided data
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Check outer DER framing, prior to any signature parsing
pub fn check_der_framing(sig: &[u8]) -> Result<(), Error> {
    if sig.len() < MIN_DER_LEN || sig.len() > MAX_DER_LEN {
        return Err(Error::InvalidSignatureFormat);
    }

    if sig[0] != DER_SEQUENCE || sig[1] as usize + 2 != sig.len() {
        return Err(Error::InvalidSignatureFormat);
    }

    Ok(())
}

/// Verify a DER signature over a SHA-256 digest.
///
/// Returns `Ok(false)` for well framed signatures that do not verify,
/// high-S signatures are not accepted.
pub fn verify_digest(key: &VerifyingKey, digest: &[u8; 32], sig: &[u8]) -> Result<bool, Error> {
    check_der_framing(sig)?;

    let sig = match Signature::from_der(sig) {
        Ok(v) => v,
        Err(_) => return Ok(false),
    };

    // Malleable encodings are rejected
    if sig.normalize_s().is_some() {
        return Ok(false);
    }

    Ok(key.verify_prehash(digest, &sig).is_ok())
}
