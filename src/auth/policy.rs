// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authorization decisions for signed requests.

use std::collections::HashSet;

use alloy::primitives::Address;

use super::{signature, AuthError};
use crate::config::AppConfig;

/// An admin whose signature over the challenge was verified for this request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminIdentity {
    pub address: Address,
}

/// Admin allow-list plus the challenge message admins sign.
///
/// Built once at startup and shared read-only. Addresses are held as parsed
/// 20-byte values, so membership is independent of hex casing, matching
/// [`signature::verify`].
#[derive(Debug, Clone)]
pub struct AdminPolicy {
    admins: HashSet<Address>,
    challenge: String,
}

impl AdminPolicy {
    pub fn new(admins: impl IntoIterator<Item = Address>, challenge: impl Into<String>) -> Self {
        Self {
            admins: admins.into_iter().collect(),
            challenge: challenge.into(),
        }
    }

    /// Build the policy from a validated configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        let admins = config.admin_wallets.iter().filter_map(|wallet| {
            match wallet.parse::<Address>() {
                Ok(address) => Some(address),
                Err(_) => {
                    tracing::warn!(wallet = %wallet, "Ignoring malformed admin wallet");
                    None
                }
            }
        });
        Self::new(admins, config.admin_challenge())
    }

    pub fn is_admin(&self, address: &Address) -> bool {
        self.admins.contains(address)
    }

    pub fn challenge(&self) -> &str {
        &self.challenge
    }

    /// Recover the signer of the challenge and require allow-list membership.
    pub fn authorize(&self, signature: &str) -> Result<AdminIdentity, AuthError> {
        if signature.trim().is_empty() {
            return Err(AuthError::MissingSignature);
        }

        let address = signature::recover_address_hex(&self.challenge, signature)?;
        if !self.is_admin(&address) {
            tracing::warn!(%address, "Rejected admin request from non-admin signer");
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(AdminIdentity { address })
    }
}

/// Prove that `claimed` signed `message`, returning the recovered address.
///
/// Mismatched signers and unrecoverable signatures are both rejected.
pub fn authenticate(claimed: &str, message: &str, signature: &str) -> Result<Address, AuthError> {
    let recovered = signature::recover_address_hex(message, signature)?;
    if !claimed.trim().eq_ignore_ascii_case(&recovered.to_string()) {
        return Err(AuthError::SignerMismatch);
    }
    Ok(recovered)
}
