// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Boost repository.

use chrono::{DateTime, Utc};
use redb::{ReadableTable, WriteTransaction};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::normalize_hex;
use crate::storage::database::{
    decode, encode, next_id, Database, StorageError, StorageResult, BOOSTS, BOOST_TX_INDEX,
};

/// A paid, time-bounded ranking signal for an app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoostRecord {
    pub id: u64,
    pub app_id: u64,
    pub user_address: String,
    /// Decimal string as signed by the booster
    pub amount: String,
    pub token_symbol: String,
    pub tx_hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl BoostRecord {
    /// Active strictly before `expires_at`.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBoost {
    pub app_id: u64,
    pub user_address: String,
    pub amount: String,
    pub token_symbol: String,
    pub tx_hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

pub struct BoostRepository<'a> {
    db: &'a Database,
}

impl<'a> BoostRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// All boosts in creation order.
    pub fn list(&self) -> StorageResult<Vec<BoostRecord>> {
        self.db.read(|txn| {
            let table = txn.open_table(BOOSTS)?;
            let mut boosts = Vec::new();
            for entry in table.iter()? {
                let (_, value) = entry?;
                boosts.push(decode(value.value())?);
            }
            Ok(boosts)
        })
    }

    /// Boost funded by `tx_hash`, if any.
    pub fn find_by_tx(txn: &WriteTransaction, tx_hash: &str) -> StorageResult<Option<BoostRecord>> {
        let key = normalize_hex(tx_hash);
        let index = txn.open_table(BOOST_TX_INDEX)?;
        let Some(id) = index.get(key.as_str())?.map(|v| v.value()) else {
            return Ok(None);
        };

        let boosts = txn.open_table(BOOSTS)?;
        let boost = match boosts.get(id)? {
            Some(value) => Some(decode(value.value())?),
            None => None,
        };
        Ok(boost)
    }

    /// Insert a boost. A tx hash already funding a boost is a `Conflict`.
    pub fn insert(txn: &WriteTransaction, new: NewBoost) -> StorageResult<BoostRecord> {
        let tx_hash = normalize_hex(&new.tx_hash);
        if Self::find_by_tx(txn, &tx_hash)?.is_some() {
            return Err(StorageError::Conflict(format!(
                "Transaction {tx_hash} already funds a boost"
            )));
        }

        let id = next_id(txn, "boosts")?;
        let boost = BoostRecord {
            id,
            app_id: new.app_id,
            user_address: new.user_address,
            amount: new.amount,
            token_symbol: new.token_symbol,
            tx_hash,
            created_at: new.created_at,
            expires_at: new.expires_at,
        };

        let mut boosts = txn.open_table(BOOSTS)?;
        boosts.insert(id, encode(&boost)?.as_slice())?;
        let mut index = txn.open_table(BOOST_TX_INDEX)?;
        index.insert(boost.tx_hash.as_str(), id)?;
        Ok(boost)
    }
}
