// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Wallet signature recovery (EIP-191 `personal_sign`).
//!
//! A signed request proves its provenance by carrying a 65-byte
//! `r || s || v` signature over a message. The message is framed as
//!
//! ```text
//! "\x19Ethereum Signed Message:\n" + decimal(len(message)) + message
//! ```
//!
//! hashed with keccak-256, and the secp256k1 public key is recovered from
//! the signature. The signer address is the last 20 bytes of the keccak-256
//! hash of the uncompressed public key.
//!
//! Everything here is pure: no I/O, no state.

use alloy::primitives::{keccak256, Address, B256};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use k256::elliptic_curve::sec1::ToEncodedPoint;

/// Framing prefix applied before hashing.
pub const MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Length of an `r || s || v` signature.
pub const SIGNATURE_LENGTH: usize = 65;

/// Signature recovery failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("invalid signature length: got {0}, want {SIGNATURE_LENGTH}")]
    InvalidLength(usize),

    #[error("signature is not valid hex")]
    InvalidHex,

    #[error("invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    #[error("failed to recover public key")]
    Recovery,
}

/// Frame `message` with the EIP-191 prefix and its decimal byte length.
pub fn prefixed_message(message: &str) -> Vec<u8> {
    let length = message.len().to_string();
    let mut framed = Vec::with_capacity(MESSAGE_PREFIX.len() + length.len() + message.len());
    framed.extend_from_slice(MESSAGE_PREFIX.as_bytes());
    framed.extend_from_slice(length.as_bytes());
    framed.extend_from_slice(message.as_bytes());
    framed
}

/// Keccak-256 of the framed message.
pub fn message_hash(message: &str) -> B256 {
    keccak256(prefixed_message(message))
}

/// Recover the address that produced `signature` over `message`.
pub fn recover_address(message: &str, signature: &[u8]) -> Result<Address, SignatureError> {
    if signature.len() != SIGNATURE_LENGTH {
        return Err(SignatureError::InvalidLength(signature.len()));
    }

    // Wallets emit v as either {0,1} or {27,28}.
    let mut v = signature[64];
    if v < 27 {
        v += 27;
    }
    let recovery_id = match v {
        27 | 28 => RecoveryId::from_byte(v - 27).ok_or(SignatureError::InvalidRecoveryId(v))?,
        other => return Err(SignatureError::InvalidRecoveryId(other)),
    };

    let signature = Signature::from_slice(&signature[..64]).map_err(|_| SignatureError::Recovery)?;
    let hash = message_hash(message);

    let key = VerifyingKey::recover_from_prehash(hash.as_slice(), &signature, recovery_id)
        .map_err(|_| SignatureError::Recovery)?;

    Ok(address_from_key(&key))
}

/// Same as [`recover_address`] for an optionally `0x`-prefixed hex signature.
pub fn recover_address_hex(message: &str, signature: &str) -> Result<Address, SignatureError> {
    let trimmed = signature.trim();
    let hex = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let bytes = alloy::hex::decode(hex).map_err(|_| SignatureError::InvalidHex)?;
    recover_address(message, &bytes)
}

/// Check that `address` signed `message`.
///
/// Returns `Ok(false)` when a different key signed; recovery failures are
/// propagated. Callers must treat both as unauthorized.
pub fn verify(address: &str, message: &str, signature: &str) -> Result<bool, SignatureError> {
    let recovered = recover_address_hex(message, signature)?;
    Ok(address.trim().eq_ignore_ascii_case(&recovered.to_string()))
}

/// Derive the account address of a secp256k1 public key.
pub fn address_from_key(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    // Skip the 0x04 uncompressed-point tag.
    let hash = keccak256(&point.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}

#[cfg(test)]
pub(crate) mod test_keys {
    //! Well-known development keys and a signing helper for tests.

    use alloy::signers::{local::PrivateKeySigner, SignerSync};

    /// Development key #0; its address is the admin in test configs.
    pub const ADMIN_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    /// Development key #1.
    pub const USER_KEY: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

    pub fn signer(key: &str) -> PrivateKeySigner {
        key.parse().expect("valid development key")
    }

    pub fn address(key: &str) -> String {
        signer(key).address().to_string()
    }

    /// Raw 65-byte `r || s || v` signature with v in {27, 28}.
    pub fn sign_bytes(key: &str, message: &str) -> [u8; 65] {
        signer(key)
            .sign_message_sync(message.as_bytes())
            .expect("signing succeeds")
            .as_bytes()
    }

    /// `0x`-prefixed hex signature, as a wallet would send it.
    pub fn sign(key: &str, message: &str) -> String {
        format!("0x{}", alloy::hex::encode(sign_bytes(key, message)))
    }
}
