// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Wallet signatures are the only identity proof. There are no passwords,
//! sessions or tokens.
//!
//! ## Auth Flow
//!
//! 1. The client signs a canonical message (see [`messages`]) with its wallet
//! 2. The request carries the claimed address and the signature
//! 3. The server recovers the signer ([`signature`]) and:
//!    - for user writes, requires the signer to equal the claimed address
//!    - for `/admin` routes, requires the signer of the challenge message
//!      to be on the configured allow-list ([`policy`])
//!
//! ## Security
//!
//! - Signature checks happen before any storage write
//! - The admin challenge is a fixed string, so a captured admin signature
//!   stays valid until the challenge is rotated in configuration

pub mod error;
pub mod extractor;
pub mod messages;
pub mod middleware;
pub mod policy;
pub mod signature;

pub use error::AuthError;
pub use extractor::AdminOnly;
pub use policy::{authenticate, AdminIdentity, AdminPolicy};
pub use signature::SignatureError;
