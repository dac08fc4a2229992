// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Review repository. At most one review exists per (app, user) pair.

use chrono::{DateTime, Utc};
use redb::{ReadableTable, WriteTransaction};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{normalize_hex, Upsert};
use crate::storage::database::{
    decode, encode, next_id, Database, StorageError, StorageResult, REVIEWS, REVIEW_KEYS,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    pub id: u64,
    pub app_id: u64,
    pub user_address: String,
    /// 1 to 5
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub signature: String,
    pub hidden: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub app_id: u64,
    pub user_address: String,
    pub rating: u8,
    pub comment: Option<String>,
    pub signature: String,
}

pub struct ReviewRepository<'a> {
    db: &'a Database,
}

impl<'a> ReviewRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn get(&self, id: u64) -> StorageResult<Option<ReviewRecord>> {
        self.db.read(|txn| {
            let table = txn.open_table(REVIEWS)?;
            let review = match table.get(id)? {
                Some(value) => Some(decode(value.value())?),
                None => None,
            };
            Ok(review)
        })
    }

    /// Reviews of an app, hidden included, in creation order.
    pub fn list_for_app(&self, app_id: u64) -> StorageResult<Vec<ReviewRecord>> {
        self.db.read(|txn| {
            let table = txn.open_table(REVIEWS)?;
            let mut reviews = Vec::new();
            for entry in table.iter()? {
                let (_, value) = entry?;
                let review: ReviewRecord = decode(value.value())?;
                if review.app_id == app_id {
                    reviews.push(review);
                }
            }
            Ok(reviews)
        })
    }

    /// Set the hidden flag. `updated_at` moves only when the flag changes.
    pub fn set_hidden(&self, id: u64, hidden: bool, now: DateTime<Utc>) -> StorageResult<ReviewRecord> {
        self.db.write(|txn| -> StorageResult<ReviewRecord> {
            let mut table = txn.open_table(REVIEWS)?;
            let mut review: ReviewRecord = match table.get(id)? {
                Some(value) => decode(value.value())?,
                None => return Err(StorageError::NotFound(format!("Review {id}"))),
            };

            if review.hidden == hidden {
                return Ok(review);
            }
            review.hidden = hidden;
            review.updated_at = now;
            table.insert(id, encode(&review)?.as_slice())?;
            Ok(review)
        })
    }

    /// Insert the review, or update rating, comment and signature of the
    /// existing review by the same user for the same app.
    ///
    /// The hidden flag of an existing review is kept.
    pub fn upsert(
        txn: &WriteTransaction,
        new: NewReview,
        now: DateTime<Utc>,
    ) -> StorageResult<Upsert<ReviewRecord>> {
        let user_key = normalize_hex(&new.user_address);
        let existing_id = {
            let keys = txn.open_table(REVIEW_KEYS)?;
            let id = keys.get((new.app_id, user_key.as_str()))?.map(|v| v.value());
            id
        };

        let mut table = txn.open_table(REVIEWS)?;

        if let Some(id) = existing_id {
            let mut review: ReviewRecord = match table.get(id)? {
                Some(value) => decode(value.value())?,
                None => return Err(StorageError::NotFound(format!("Review {id}"))),
            };
            review.rating = new.rating;
            review.comment = new.comment;
            review.signature = new.signature;
            review.updated_at = now;
            table.insert(id, encode(&review)?.as_slice())?;
            return Ok(Upsert::Existing(review));
        }

        let id = next_id(txn, "reviews")?;
        let review = ReviewRecord {
            id,
            app_id: new.app_id,
            user_address: new.user_address,
            rating: new.rating,
            comment: new.comment,
            signature: new.signature,
            hidden: false,
            created_at: now,
            updated_at: now,
        };
        table.insert(id, encode(&review)?.as_slice())?;
        drop(table);

        let mut keys = txn.open_table(REVIEW_KEYS)?;
        keys.insert((review.app_id, user_key.as_str()), id)?;
        Ok(Upsert::Created(review))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::database::tests::temp_db;
    use crate::storage::database::EntityKind;

    fn new_review(user: &str, rating: u8) -> NewReview {
        NewReview {
            app_id: 1,
            user_address: user.into(),
            rating,
            comment: Some(format!("rated {rating}")),
            signature: "0xsig".into(),
        }
    }

    #[test]
    fn second_review_by_same_user_updates() {
        let (db, _dir) = temp_db();
        db.migrate_module("reviews", &[EntityKind::Review]).unwrap();
        let now = Utc::now();

        let first = db
            .write(|txn| ReviewRepository::upsert(txn, new_review("0xAbC", 2), now))
            .unwrap();
        assert!(first.is_created());

        let second = db
            .write(|txn| ReviewRepository::upsert(txn, new_review("0xabc", 5), now))
            .unwrap();
        assert!(!second.is_created());
        assert_eq!(second.get().id, first.get().id);

        let reviews = ReviewRepository::new(&db).list_for_app(1).unwrap();
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].rating, 5);
    }

    #[test]
    fn update_keeps_hidden_flag() {
        let (db, _dir) = temp_db();
        db.migrate_module("reviews", &[EntityKind::Review]).unwrap();
        let now = Utc::now();

        let review = db
            .write(|txn| ReviewRepository::upsert(txn, new_review("0xabc", 2), now))
            .unwrap()
            .into_inner();
        let repo = ReviewRepository::new(&db);
        repo.set_hidden(review.id, true, now).unwrap();

        let updated = db
            .write(|txn| ReviewRepository::upsert(txn, new_review("0xabc", 4), now))
            .unwrap()
            .into_inner();
        assert!(updated.hidden);
        assert!(matches!(
            repo.set_hidden(99, true, now),
            Err(StorageError::NotFound(_))
        ));
    }

    #[test]
    fn repeated_hide_keeps_timestamp() {
        let (db, _dir) = temp_db();
        db.migrate_module("reviews", &[EntityKind::Review]).unwrap();
        let now = Utc::now();
        let review = db
            .write(|txn| ReviewRepository::upsert(txn, new_review("0xabc", 3), now))
            .unwrap()
            .into_inner();
        let repo = ReviewRepository::new(&db);

        let unchanged = repo
            .set_hidden(review.id, false, now + chrono::Duration::seconds(1))
            .unwrap();
        assert_eq!(unchanged, review);

        let hidden = repo
            .set_hidden(review.id, true, now + chrono::Duration::seconds(2))
            .unwrap();
        assert_eq!(hidden.updated_at, now + chrono::Duration::seconds(2));
        let again = repo
            .set_hidden(review.id, true, now + chrono::Duration::seconds(3))
            .unwrap();
        assert_eq!(again, hidden);
    }
}
