// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded marketplace database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! Core tables, created on open:
//!
//! - `sequences`: entity name → last allocated id
//! - `apps`: app id → serialized AppRecord
//! - `app_images`: image id → serialized AppImageRecord
//! - `app_image_order`: (app id, order) → image id
//! - `transactions`: tx hash → serialized TransactionRecord
//! - `schema_migrations`: module name → serialized SchemaMigration
//!
//! Module tables, created only when the owning module migrates:
//!
//! - `boosts`: boost id → serialized BoostRecord
//! - `boost_tx_index`: tx hash → boost id
//! - `engagement_points`: point id → serialized PointRecord
//! - `reviews`: review id → serialized ReviewRecord
//! - `review_keys`: (app id, lowercase user address) → review id
//!
//! redb runs one write transaction at a time, so every check-then-write
//! sequence done inside [`Database::write`] is serialized.

use std::path::Path;

use chrono::{DateTime, Utc};
use redb::{
    Key, ReadTransaction, ReadableDatabase, ReadableTable, TableDefinition, TableError, Value,
    WriteTransaction,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Table Definitions
// =============================================================================

/// Id allocation: entity name → last id handed out.
pub(crate) const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences");

pub(crate) const APPS: TableDefinition<u64, &[u8]> = TableDefinition::new("apps");

pub(crate) const APP_IMAGES: TableDefinition<u64, &[u8]> = TableDefinition::new("app_images");

/// Unique index enforcing one image per (app, order) slot.
pub(crate) const APP_IMAGE_ORDER: TableDefinition<(u64, u32), u64> =
    TableDefinition::new("app_image_order");

/// Primary table keyed by tx hash, which is the unit of idempotency.
pub(crate) const TRANSACTIONS: TableDefinition<&str, &[u8]> = TableDefinition::new("transactions");

pub(crate) const SCHEMA_MIGRATIONS: TableDefinition<&str, &[u8]> =
    TableDefinition::new("schema_migrations");

pub(crate) const BOOSTS: TableDefinition<u64, &[u8]> = TableDefinition::new("boosts");

/// Unique index: a transaction hash funds at most one boost.
pub(crate) const BOOST_TX_INDEX: TableDefinition<&str, u64> = TableDefinition::new("boost_tx_index");

pub(crate) const POINTS: TableDefinition<u64, &[u8]> = TableDefinition::new("engagement_points");

pub(crate) const REVIEWS: TableDefinition<u64, &[u8]> = TableDefinition::new("reviews");

/// Unique index: one review per (app, user). User is lowercase hex.
pub(crate) const REVIEW_KEYS: TableDefinition<(u64, &str), u64> =
    TableDefinition::new("review_keys");

/// Schema version recorded with each module migration.
pub const SCHEMA_VERSION: u32 = 1;

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

// =============================================================================
// Entities
// =============================================================================

/// Persisted entity kinds a module can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    App,
    AppImage,
    Transaction,
    Boost,
    EngagementPoint,
    Review,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::App => "app",
            EntityKind::AppImage => "appImage",
            EntityKind::Transaction => "transaction",
            EntityKind::Boost => "boost",
            EntityKind::EngagementPoint => "engagementPoint",
            EntityKind::Review => "review",
        }
    }

    /// Create every table backing this entity, including its unique indexes.
    fn create_tables(self, txn: &WriteTransaction) -> StorageResult<()> {
        match self {
            EntityKind::App => {
                let _ = txn.open_table(APPS)?;
            }
            EntityKind::AppImage => {
                let _ = txn.open_table(APP_IMAGES)?;
                let _ = txn.open_table(APP_IMAGE_ORDER)?;
            }
            EntityKind::Transaction => {
                let _ = txn.open_table(TRANSACTIONS)?;
            }
            EntityKind::Boost => {
                let _ = txn.open_table(BOOSTS)?;
                let _ = txn.open_table(BOOST_TX_INDEX)?;
            }
            EntityKind::EngagementPoint => {
                let _ = txn.open_table(POINTS)?;
            }
            EntityKind::Review => {
                let _ = txn.open_table(REVIEWS)?;
                let _ = txn.open_table(REVIEW_KEYS)?;
            }
        }
        Ok(())
    }

    /// Whether the primary table for this entity exists.
    fn tables_exist(self, txn: &ReadTransaction) -> StorageResult<bool> {
        match self {
            EntityKind::App => table_exists(txn, APPS),
            EntityKind::AppImage => table_exists(txn, APP_IMAGES),
            EntityKind::Transaction => table_exists(txn, TRANSACTIONS),
            EntityKind::Boost => table_exists(txn, BOOSTS),
            EntityKind::EngagementPoint => table_exists(txn, POINTS),
            EntityKind::Review => table_exists(txn, REVIEWS),
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entities every deployment has, regardless of module flags.
pub const CORE_ENTITIES: &[EntityKind] = &[EntityKind::App, EntityKind::AppImage, EntityKind::Transaction];

fn table_exists<K: Key + 'static, V: Value + 'static>(
    txn: &ReadTransaction,
    definition: TableDefinition<K, V>,
) -> StorageResult<bool> {
    match txn.open_table(definition) {
        Ok(_) => Ok(true),
        Err(TableError::TableDoesNotExist(_)) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Record of a module's schema having been applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SchemaMigration {
    pub module: String,
    pub entities: Vec<EntityKind>,
    pub version: u32,
    pub applied_at: DateTime<Utc>,
}

/// Result of a migration attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    Applied,
    AlreadyApplied,
}

// =============================================================================
// Row Helpers
// =============================================================================

pub(crate) fn encode<T: Serialize>(value: &T) -> StorageResult<Vec<u8>> {
    Ok(serde_json::to_vec(value)?)
}

pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> StorageResult<T> {
    Ok(serde_json::from_slice(bytes)?)
}

/// Allocate the next id for `sequence`. Ids start at 1.
pub(crate) fn next_id(txn: &WriteTransaction, sequence: &str) -> StorageResult<u64> {
    let mut table = txn.open_table(SEQUENCES)?;
    let next = table.get(sequence)?.map(|v| v.value()).unwrap_or(0) + 1;
    table.insert(sequence, next)?;
    Ok(next)
}

// =============================================================================
// Database
// =============================================================================

/// Embedded ACID marketplace database.
pub struct Database {
    db: redb::Database,
}

impl Database {
    /// Open (or create) the database at the given path and ensure the core
    /// tables exist.
    pub fn open(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let db = redb::Database::create(path)?;

        // Pre-create core tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(SEQUENCES)?;
            let _ = write_txn.open_table(SCHEMA_MIGRATIONS)?;
            for entity in CORE_ENTITIES {
                entity.create_tables(&write_txn)?;
            }
        }
        write_txn.commit()?;

        tracing::debug!(path = %path.display(), "Opened database");
        Ok(Self { db })
    }

    /// Run `f` inside one write transaction.
    ///
    /// Commits when `f` returns `Ok`; aborts otherwise so none of its writes
    /// become visible.
    pub fn write<T, E>(&self, f: impl FnOnce(&WriteTransaction) -> Result<T, E>) -> Result<T, E>
    where
        E: From<StorageError>,
    {
        let txn = self.db.begin_write().map_err(StorageError::from)?;
        match f(&txn) {
            Ok(value) => {
                txn.commit().map_err(StorageError::from)?;
                Ok(value)
            }
            Err(e) => {
                if let Err(abort_err) = txn.abort() {
                    tracing::warn!(error = %abort_err, "Failed to abort write transaction");
                }
                Err(e)
            }
        }
    }

    /// Run `f` against a consistent read snapshot.
    pub fn read<T>(&self, f: impl FnOnce(&ReadTransaction) -> StorageResult<T>) -> StorageResult<T> {
        let txn = self.db.begin_read()?;
        f(&txn)
    }

    // =========================================================================
    // Schema Migrations
    // =========================================================================

    /// Create the tables for `entities` and record the migration of `module`.
    ///
    /// Idempotent: a module that already has a migration row is skipped.
    pub fn migrate_module(&self, module: &str, entities: &[EntityKind]) -> StorageResult<MigrationOutcome> {
        self.write(|txn| -> StorageResult<MigrationOutcome> {
            let mut migrations = txn.open_table(SCHEMA_MIGRATIONS)?;
            if migrations.get(module)?.is_some() {
                tracing::info!(module, "Schema already migrated, skipping");
                return Ok(MigrationOutcome::AlreadyApplied);
            }

            for entity in entities {
                entity.create_tables(txn)?;
            }

            let record = SchemaMigration {
                module: module.to_string(),
                entities: entities.to_vec(),
                version: SCHEMA_VERSION,
                applied_at: Utc::now(),
            };
            migrations.insert(module, encode(&record)?.as_slice())?;

            tracing::info!(module, entities = ?entities, "Schema migrated");
            Ok(MigrationOutcome::Applied)
        })
    }

    /// Migration record for `module`, if it has been migrated.
    pub fn migration(&self, module: &str) -> StorageResult<Option<SchemaMigration>> {
        self.read(|txn| {
            let table = txn.open_table(SCHEMA_MIGRATIONS)?;
            let migration = match table.get(module)? {
                Some(value) => Some(decode(value.value())?),
                None => None,
            };
            Ok(migration)
        })
    }

    pub fn is_migrated(&self, module: &str) -> StorageResult<bool> {
        Ok(self.migration(module)?.is_some())
    }

    /// Whether the tables backing `entity` exist in this database.
    pub fn has_entity(&self, entity: EntityKind) -> StorageResult<bool> {
        self.read(|txn| entity.tables_exist(txn))
    }
}

// =============================================================================
// Tests
// =============================================================================
