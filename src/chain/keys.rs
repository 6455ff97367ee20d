// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Campus Wallet

//! Keypair generation and signer resolution.
//!
//! Addresses are derived from secp256k1 keys the Ethereum way:
//! keccak256 of the uncompressed public key (without the 0x04 prefix),
//! last 20 bytes, hex encoded with a 0x prefix.
//!
//! Private keys are stored as 0x-prefixed hex in the embedded database.
//! This is the custodial trust boundary of the whole service: whoever can
//! read the database can spend user funds. See DESIGN.md before changing
//! the storage format.

use alloy::{primitives::keccak256, signers::local::PrivateKeySigner};
use k256::ecdsa::SigningKey;
use k256::elliptic_curve::rand_core::OsRng;

use super::error::ChainError;

/// Generate a fresh secp256k1 keypair.
///
/// Returns `(address, private_key_hex)`. Entropy comes from the operating
/// system's secure randomness source; if that source is unavailable the
/// process aborts rather than falling back to weaker randomness.
pub fn generate_keypair() -> (String, String) {
    let signing_key = SigningKey::random(&mut OsRng);
    let private_key_hex = format!("0x{}", alloy::hex::encode(signing_key.to_bytes()));
    let address = derive_address(&signing_key);
    (address, private_key_hex)
}

/// Derive the Ethereum-format address for a signing key.
fn derive_address(key: &SigningKey) -> String {
    let verifying_key = key.verifying_key();
    // Uncompressed public key is 65 bytes: 0x04 prefix + x + y coordinates
    let public_key_uncompressed = verifying_key.to_encoded_point(false);
    let hash = keccak256(&public_key_uncompressed.as_bytes()[1..]);
    // Address is the last 20 bytes of the 32-byte hash
    format!("0x{}", alloy::hex::encode(&hash[12..]))
}

/// Re-derive the public address from stored signing material.
///
/// Deterministic: the same private key always yields the same address.
pub fn address_from_private_key(private_key_hex: &str) -> Result<String, ChainError> {
    let key_bytes = decode_key_hex(private_key_hex)?;
    let signing_key = SigningKey::from_slice(&key_bytes)
        .map_err(|e| ChainError::InvalidCredential(format!("not a valid secp256k1 key: {e}")))?;
    Ok(derive_address(&signing_key))
}

/// Reconstruct a transaction signer from stored signing material.
///
/// The caller binds the signer to a chain connection; signing and submission
/// then happen in the same call path.
pub fn resolve_signer(private_key_hex: &str) -> Result<PrivateKeySigner, ChainError> {
    let key_bytes = decode_key_hex(private_key_hex)?;
    PrivateKeySigner::from_slice(&key_bytes)
        .map_err(|e| ChainError::InvalidCredential(format!("not a valid signing key: {e}")))
}

/// Check that a resolved signer matches a stored address.
///
/// Stored signing material and its derived address must always belong to the
/// same keypair; a mismatch means the stored row is corrupt.
pub fn signer_matches_address(signer: &PrivateKeySigner, address: &str) -> bool {
    let derived = format!("{:#x}", signer.address());
    derived.eq_ignore_ascii_case(address)
}

fn decode_key_hex(private_key_hex: &str) -> Result<Vec<u8>, ChainError> {
    let trimmed = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);
    let bytes = alloy::hex::decode(trimmed)
        .map_err(|e| ChainError::InvalidCredential(format!("key is not valid hex: {e}")))?;
    if bytes.len() != 32 {
        return Err(ChainError::InvalidCredential(format!(
            "key must be 32 bytes, got {}",
            bytes.len()
        )));
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_address_is_ethereum_format() {
        let (address, private_key_hex) = generate_keypair();

        assert!(address.starts_with("0x"));
        assert_eq!(address.len(), 42, "address must be 0x + 40 hex chars");
        assert!(address[2..].chars().all(|c| c.is_ascii_hexdigit()));

        assert!(private_key_hex.starts_with("0x"));
        assert_eq!(private_key_hex.len(), 66, "key must be 0x + 64 hex chars");
    }

    #[test]
    fn generated_keypairs_are_unique() {
        let mut addresses = std::collections::HashSet::new();
        for _ in 0..10 {
            let (address, _) = generate_keypair();
            assert!(addresses.insert(address), "duplicate address generated");
        }
    }

    #[test]
    fn address_rederivation_is_deterministic() {
        let (address, private_key_hex) = generate_keypair();

        for _ in 0..3 {
            let rederived = address_from_private_key(&private_key_hex).unwrap();
            assert_eq!(rederived, address);
        }
    }

    #[test]
    fn resolved_signer_agrees_with_derived_address() {
        let (address, private_key_hex) = generate_keypair();
        let signer = resolve_signer(&private_key_hex).unwrap();
        assert!(signer_matches_address(&signer, &address));
    }

    #[test]
    fn signer_mismatch_is_detected() {
        let (_, key_a) = generate_keypair();
        let (address_b, _) = generate_keypair();
        let signer = resolve_signer(&key_a).unwrap();
        assert!(!signer_matches_address(&signer, &address_b));
    }

    #[test]
    fn malformed_keys_are_rejected() {
        assert!(matches!(
            resolve_signer("0xzz"),
            Err(ChainError::InvalidCredential(_))
        ));
        assert!(matches!(
            resolve_signer("0x1234"),
            Err(ChainError::InvalidCredential(_))
        ));
        // All-zero key is not a valid scalar
        let zeros = format!("0x{}", "00".repeat(32));
        assert!(matches!(
            resolve_signer(&zeros),
            Err(ChainError::InvalidCredential(_))
        ));
    }
}
