// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Chain App Hub - App Listings Marketplace Backend
//!
//! Developers list apps by paying a listing fee; users boost, review and
//! engage with them. Every write is authorized by an EIP-191 wallet
//! signature, and admins curate through a signed challenge.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Signature recovery and admin authorization
//! - `ledger` - Boosts and engagement points
//! - `listing` - App registry and reviews
//! - `modules` - Optional features enabled by configuration
//! - `storage` - Embedded redb database

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod ledger;
pub mod listing;
pub mod models;
pub mod modules;
pub mod state;
pub mod storage;
