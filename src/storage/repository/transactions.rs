// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Transaction repository for recorded on-chain payments.
//!
//! The transaction hash is the unit of idempotency: the same hash always maps
//! to one row, whichever workflow sees it first.

use chrono::{DateTime, Utc};
use redb::{ReadableTable, WriteTransaction};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{normalize_hex, Upsert};
use crate::storage::database::{decode, encode, Database, StorageError, StorageResult, TRANSACTIONS};

/// Transaction status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    /// Claimed but not yet confirmed
    #[default]
    Pending,
    /// Confirmed in a block
    Confirmed,
    /// Failed or reverted
    Failed,
}

/// What a transaction paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TxType {
    Listing,
    Boosting,
}

/// Stored transaction record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    /// Transaction hash, lowercase
    pub hash: String,
    pub from_address: String,
    pub to_address: String,
    /// Amount in human-readable format
    pub value: String,
    pub token_symbol: String,
    #[serde(rename = "type")]
    pub tx_type: TxType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_id: Option<u64>,
    pub status: TxStatus,
    pub created_at: DateTime<Utc>,
}

impl TransactionRecord {
    /// A transaction the client reports as already confirmed on chain.
    #[allow(clippy::too_many_arguments)]
    pub fn confirmed(
        hash: &str,
        from_address: &str,
        to_address: &str,
        value: String,
        token_symbol: &str,
        tx_type: TxType,
        app_id: Option<u64>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            hash: normalize_hex(hash),
            from_address: from_address.to_string(),
            to_address: to_address.to_string(),
            value,
            token_symbol: token_symbol.to_string(),
            tx_type,
            app_id,
            status: TxStatus::Confirmed,
            created_at: now,
        }
    }
}

/// Repository for transaction operations.
pub struct TransactionRepository<'a> {
    db: &'a Database,
}

impl<'a> TransactionRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Look up a transaction by hash.
    pub fn get(&self, hash: &str) -> StorageResult<Option<TransactionRecord>> {
        let key = normalize_hex(hash);
        self.db.read(|txn| {
            let table = txn.open_table(TRANSACTIONS)?;
            let record = match table.get(key.as_str())? {
                Some(value) => Some(decode(value.value())?),
                None => None,
            };
            Ok(record)
        })
    }

    /// Return the row holding `record.hash`, inserting `record` if none does.
    pub fn insert_or_fetch(
        txn: &WriteTransaction,
        record: TransactionRecord,
    ) -> StorageResult<Upsert<TransactionRecord>> {
        let mut table = txn.open_table(TRANSACTIONS)?;
        let existing = match table.get(record.hash.as_str())? {
            Some(value) => Some(decode::<TransactionRecord>(value.value())?),
            None => None,
        };
        if let Some(existing) = existing {
            tracing::debug!(hash = %existing.hash, "Reusing recorded transaction");
            return Ok(Upsert::Existing(existing));
        }

        table.insert(record.hash.as_str(), encode(&record)?.as_slice())?;
        Ok(Upsert::Created(record))
    }

    /// Associate a recorded transaction with the app it paid for.
    pub fn bind_app(txn: &WriteTransaction, hash: &str, app_id: u64) -> StorageResult<TransactionRecord> {
        let key = normalize_hex(hash);
        let mut table = txn.open_table(TRANSACTIONS)?;
        let mut record: TransactionRecord = match table.get(key.as_str())? {
            Some(value) => decode(value.value())?,
            None => return Err(StorageError::NotFound(format!("Transaction {key}"))),
        };

        record.app_id = Some(app_id);
        table.insert(key.as_str(), encode(&record)?.as_slice())?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::database::tests::temp_db;

    fn sample(hash: &str) -> TransactionRecord {
        TransactionRecord::confirmed(
            hash,
            "0x1111111111111111111111111111111111111111",
            "0x2222222222222222222222222222222222222222",
            "10".into(),
            "TST",
            TxType::Boosting,
            Some(1),
            Utc::now(),
        )
    }

    #[test]
    fn insert_or_fetch_dedupes_by_hash() {
        let (db, _dir) = temp_db();

        let first = db
            .write(|txn| TransactionRepository::insert_or_fetch(txn, sample("0xAAA")))
            .unwrap();
        assert!(first.is_created());

        let mut other = sample("0xaaa");
        other.value = "99".into();
        let second = db
            .write(|txn| TransactionRepository::insert_or_fetch(txn, other))
            .unwrap();
        assert!(!second.is_created());
        assert_eq!(second.get().value, "10");

        let stored = TransactionRepository::new(&db).get("0xAaA").unwrap().unwrap();
        assert_eq!(stored.hash, "0xaaa");
    }

    #[test]
    fn bind_app_sets_app_id() {
        let (db, _dir) = temp_db();
        let mut record = sample("0xbbb");
        record.app_id = None;
        db.write(|txn| TransactionRepository::insert_or_fetch(txn, record))
            .unwrap();

        let bound = db
            .write(|txn| TransactionRepository::bind_app(txn, "0xbbb", 7))
            .unwrap();
        assert_eq!(bound.app_id, Some(7));

        let missing = db.write(|txn| TransactionRepository::bind_app(txn, "0xccc", 7));
        assert!(matches!(missing, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn serializes_type_field() {
        let json = serde_json::to_value(sample("0xddd")).unwrap();
        assert_eq!(json["type"], "boosting");
        assert_eq!(json["status"], "confirmed");
        assert_eq!(json["tokenSymbol"], "TST");
    }
}
