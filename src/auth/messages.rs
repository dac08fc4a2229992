// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Canonical messages signed by clients for each write action.
//!
//! Each message encodes the parameters of the action, so a captured
//! signature cannot be replayed against a different app, amount or rating.

pub fn boost(app_id: u64, amount: &str, token_symbol: &str) -> String {
    format!("Boost app {app_id} with {amount} {token_symbol}")
}

pub fn engagement(app_id: u64, action: &str) -> String {
    format!("Engage with app {app_id} with action {action}")
}

pub fn review(app_id: u64, rating: u8) -> String {
    format!("Review app {app_id} with rating {rating}")
}

pub fn listing(app_name: &str, listing_tx_hash: &str) -> String {
    format!("List app {app_name} with tx {listing_tx_hash}")
}
