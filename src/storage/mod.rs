// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Persistent state lives in a single embedded redb file (`DB_PATH`). Rows
//! are JSON-encoded with serde; unique constraints are encoded as separate
//! index tables written in the same transaction as the row they protect.
//!
//! ## Layout
//!
//! - [`database`]: table definitions, the [`Database`] handle, transaction
//!   helpers and per-module schema migrations
//! - [`repository`]: typed records and repositories per entity
//!
//! ## Important Notes
//!
//! - Writes that must be atomic together go through one [`Database::write`]
//!   call; returning `Err` from the closure rolls everything back
//! - Module tables exist only after the module has migrated

pub mod database;
pub mod repository;

pub use database::{
    Database, EntityKind, MigrationOutcome, SchemaMigration, StorageError, StorageResult,
    CORE_ENTITIES,
};
pub use repository::{
    AppImageRecord, AppLinks, AppRecord, AppRepository, BoostRecord, BoostRepository, NewApp,
    NewAppImage, NewBoost, NewPoint, NewReview, PointRecord, PointRepository, ReviewRecord,
    ReviewRepository, TransactionRecord, TransactionRepository, TxStatus, TxType, Upsert,
};
