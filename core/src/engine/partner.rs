// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Partner identity claims and verification against the partner trust root

use heapless::Vec;
use k256::ecdsa::VerifyingKey;
use sha2::{Digest, Sha256};

use crate::apdu::partner::PARTNER_KEY_LEN;

use super::{signature::verify_digest, Error};

/// Minimum partner name length
pub const MIN_PARTNER_NAME_LEN: usize = 3;

/// Maximum partner name length
pub const MAX_PARTNER_NAME_LEN: usize = 15;

/// Partner display name, raw bytes as declared
pub type PartnerName = Vec<u8, MAX_PARTNER_NAME_LEN>;

/// Printable form of a partner name for logs and displays
pub fn display_name(name: &[u8]) -> &str {
    core::str::from_utf8(name).unwrap_or("<binary>")
}

/// Declared (untrusted) partner identity
#[derive(Clone, Debug)]
pub struct PartnerClaim {
    name: PartnerName,
    key: VerifyingKey,
    digest: [u8; 32],
}

impl PartnerClaim {
    /// Create a partner claim from the declared name and uncompressed key
    pub fn new(name: &[u8], public_key: &[u8; PARTNER_KEY_LEN]) -> Result<Self, Error> {
        if name.len() < MIN_PARTNER_NAME_LEN || name.len() > MAX_PARTNER_NAME_LEN {
            return Err(Error::InvalidPartnerName);
        }

        // Require uncompressed SEC1 points
        if public_key[0] != 0x04 {
            return Err(Error::InvalidPartnerKey);
        }
        let key = VerifyingKey::from_sec1_bytes(public_key).map_err(|_| Error::InvalidPartnerKey)?;

        // Credential digest, covering the declaration exactly as framed on the wire
        let mut h = Sha256::new();
        h.update([name.len() as u8]);
        h.update(name);
        h.update(public_key);

        let name = PartnerName::from_slice(name).map_err(|_| Error::InvalidPartnerName)?;

        Ok(Self {
            name,
            key,
            digest: h.finalize().into(),
        })
    }

    /// Fetch the declared partner name
    pub fn name(&self) -> &[u8] {
        &self.name
    }

    /// Verify the credential signature by the partner root,
    /// returning a trusted [`Partner`] on success
    pub fn verify(self, root: &VerifyingKey, signature: &[u8]) -> Result<Partner, Error> {
        match verify_digest(root, &self.digest, signature)? {
            true => Ok(Partner {
                name: self.name,
                key: self.key,
            }),
            false => Err(Error::PartnerSignatureInvalid),
        }
    }
}

/// Trusted partner, only constructed by verifying a [`PartnerClaim`]
#[derive(Clone, Debug)]
pub struct Partner {
    name: PartnerName,
    key: VerifyingKey,
}

impl Partner {
    pub fn name(&self) -> &[u8] {
        &self.name
    }

    pub fn key(&self) -> &VerifyingKey {
        &self.key
    }

    pub fn into_name(self) -> PartnerName {
        self.name
    }
}

#[cfg(test)]
mod test {
    use k256::ecdsa::{signature::hazmat::PrehashSigner, Signature, SigningKey};

    use super::*;

    fn partner_key() -> [u8; PARTNER_KEY_LEN] {
        let sk = SigningKey::from_slice(&[0x22; 32]).unwrap();
        let p = sk.verifying_key().to_encoded_point(false);

        let mut k = [0u8; PARTNER_KEY_LEN];
        k.copy_from_slice(p.as_bytes());
        k
    }

    #[test]
    fn name_bounds() {
        let k = partner_key();

        assert!(PartnerClaim::new(b"ABC", &k).is_ok());
        assert!(PartnerClaim::new(b"ABCDEFGHIJKLMNO", &k).is_ok());

        assert_eq!(
            PartnerClaim::new(b"AB", &k).err(),
            Some(Error::InvalidPartnerName)
        );
        assert_eq!(
            PartnerClaim::new(b"ABCDEFGHIJKLMNOP", &k).err(),
            Some(Error::InvalidPartnerName)
        );
    }

    #[test]
    fn binary_name() {
        let k = partner_key();

        let c = PartnerClaim::new(&[0xff, 0x00, 0x80, 0x41], &k).unwrap();
        assert_eq!(c.name(), &[0xffu8, 0x00, 0x80, 0x41][..]);
        assert_eq!(display_name(c.name()), "<binary>");
        assert_eq!(display_name(b"SWAP_TEST"), "SWAP_TEST");
    }

    #[test]
    fn invalid_key() {
        let mut k = partner_key();
        k[0] = 0x02;
        assert_eq!(
            PartnerClaim::new(b"SWAP_TEST", &k).err(),
            Some(Error::InvalidPartnerKey)
        );

        let k = [0x04; PARTNER_KEY_LEN];
        assert_eq!(
            PartnerClaim::new(b"SWAP_TEST", &k).err(),
            Some(Error::InvalidPartnerKey)
        );
    }

    #[test]
    fn verify_credential() {
        let root = SigningKey::from_slice(&[0x11; 32]).unwrap();
        let k = partner_key();

        // Sign name_len || name || key
        let mut data = alloc::vec::Vec::new();
        data.push(9u8);
        data.extend_from_slice(b"SWAP_TEST");
        data.extend_from_slice(&k);

        let digest: [u8; 32] = Sha256::digest(&data).into();
        let sig: Signature = root.sign_prehash(&digest).unwrap();

        let claim = PartnerClaim::new(b"SWAP_TEST", &k).unwrap();
        let p = claim
            .clone()
            .verify(root.verifying_key(), sig.to_der().as_bytes())
            .unwrap();
        assert_eq!(p.name(), b"SWAP_TEST");

        // Signature by another key is rejected
        let other = SigningKey::from_slice(&[0x33; 32]).unwrap();
        assert_eq!(
            claim
                .verify(other.verifying_key(), sig.to_der().as_bytes())
                .err(),
            Some(Error::PartnerSignatureInvalid)
        );
    }
}
