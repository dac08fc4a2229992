// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Engagement point repository. Rows are append-only.

use chrono::{DateTime, Utc};
use redb::{ReadableTable, WriteTransaction};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::storage::database::{decode, encode, next_id, Database, StorageResult, POINTS};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PointRecord {
    pub id: u64,
    pub app_id: u64,
    pub user_address: String,
    pub amount: u32,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPoint {
    pub app_id: u64,
    pub user_address: String,
    pub amount: u32,
    pub action: String,
    pub tx_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct PointRepository<'a> {
    db: &'a Database,
}

impl<'a> PointRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// All points in insertion order.
    pub fn list(&self) -> StorageResult<Vec<PointRecord>> {
        self.db.read(|txn| {
            let table = txn.open_table(POINTS)?;
            let mut points = Vec::new();
            for entry in table.iter()? {
                let (_, value) = entry?;
                points.push(decode(value.value())?);
            }
            Ok(points)
        })
    }

    pub fn insert(txn: &WriteTransaction, new: NewPoint) -> StorageResult<PointRecord> {
        let id = next_id(txn, "engagement_points")?;
        let point = PointRecord {
            id,
            app_id: new.app_id,
            user_address: new.user_address,
            amount: new.amount,
            action: new.action,
            tx_hash: new.tx_hash,
            created_at: new.created_at,
        };

        let mut table = txn.open_table(POINTS)?;
        table.insert(id, encode(&point)?.as_slice())?;
        Ok(point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::database::tests::temp_db;
    use crate::storage::database::EntityKind;

    #[test]
    fn list_preserves_insertion_order() {
        let (db, _dir) = temp_db();
        db.migrate_module("poe", &[EntityKind::EngagementPoint]).unwrap();

        for (user, action) in [("0xb", "use"), ("0xa", "visit")] {
            db.write(|txn| {
                PointRepository::insert(
                    txn,
                    NewPoint {
                        app_id: 1,
                        user_address: user.into(),
                        amount: 1,
                        action: action.into(),
                        tx_hash: None,
                        created_at: Utc::now(),
                    },
                )
            })
            .unwrap();
        }

        let users: Vec<String> = PointRepository::new(&db)
            .list()
            .unwrap()
            .into_iter()
            .map(|p| p.user_address)
            .collect();
        assert_eq!(users, vec!["0xb", "0xa"]);
    }
}
