// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Repository layer providing typed access to the database.
//!
//! Each repository provides reads for a specific entity type. Writes that
//! must compose with other writes take a [`redb::WriteTransaction`] so the
//! caller decides the transaction boundary.

pub mod apps;
pub mod boosts;
pub mod points;
pub mod reviews;
pub mod transactions;

pub use apps::{AppImageRecord, AppLinks, AppRecord, AppRepository, NewApp, NewAppImage};
pub use boosts::{BoostRecord, BoostRepository, NewBoost};
pub use points::{NewPoint, PointRecord, PointRepository};
pub use reviews::{NewReview, ReviewRecord, ReviewRepository};
pub use transactions::{TransactionRecord, TransactionRepository, TxStatus, TxType};

/// Outcome of an idempotent write keyed by a unique value.
#[derive(Debug, Clone, PartialEq)]
pub enum Upsert<T> {
    /// No row held the key; this one was inserted.
    Created(T),
    /// A row already held the key and was reused or updated.
    Existing(T),
}

impl<T> Upsert<T> {
    pub fn is_created(&self) -> bool {
        matches!(self, Upsert::Created(_))
    }

    pub fn get(&self) -> &T {
        match self {
            Upsert::Created(v) | Upsert::Existing(v) => v,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Upsert::Created(v) | Upsert::Existing(v) => v,
        }
    }
}

/// Lowercase key form for addresses and hashes so lookups ignore hex casing.
pub(crate) fn normalize_hex(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}
