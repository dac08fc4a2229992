// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! App listing repository.
//!
//! ## Storage Layout
//!
//! ```text
//! apps            : app id → AppRecord
//! app_images      : image id → AppImageRecord
//! app_image_order : (app id, order) → image id
//! ```
//!
//! Image bytes live outside the database; only their metadata is stored.

use chrono::{DateTime, Utc};
use redb::{ReadableTable, WriteTransaction};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::storage::database::{
    decode, encode, next_id, Database, StorageError, StorageResult, APPS, APP_IMAGES,
    APP_IMAGE_ORDER,
};

/// External links shown on an app page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discord: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telegram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
}

/// Stored app listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppRecord {
    pub id: u64,
    pub name: String,
    pub description: String,
    /// Checksummed developer address
    pub developer_address: String,
    pub tags: Vec<String>,
    pub featured: bool,
    pub hidden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_path: Option<String>,
    pub listing_tx_hash: String,
    pub contract_addresses: Vec<String>,
    pub links: AppLinks,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when listing a new app.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewApp {
    pub name: String,
    pub description: String,
    pub developer_address: String,
    pub tags: Vec<String>,
    pub logo_path: Option<String>,
    pub contract_addresses: Vec<String>,
    pub links: AppLinks,
}

/// Stored screenshot metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppImageRecord {
    pub id: u64,
    pub app_id: u64,
    pub filename: String,
    pub image_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppImage {
    pub filename: String,
    pub image_path: String,
    pub description: Option<String>,
    pub order: u32,
}

/// Repository for app operations.
pub struct AppRepository<'a> {
    db: &'a Database,
}

impl<'a> AppRepository<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    pub fn get(&self, id: u64) -> StorageResult<Option<AppRecord>> {
        self.db.read(|txn| {
            let table = txn.open_table(APPS)?;
            let app = match table.get(id)? {
                Some(value) => Some(decode(value.value())?),
                None => None,
            };
            Ok(app)
        })
    }

    /// Get an app, failing with `NotFound` when it does not exist.
    pub fn require(&self, id: u64) -> StorageResult<AppRecord> {
        self.get(id)?
            .ok_or_else(|| StorageError::NotFound(format!("App {id}")))
    }

    /// All apps, hidden included, ordered by id.
    pub fn list(&self) -> StorageResult<Vec<AppRecord>> {
        self.db.read(|txn| {
            let table = txn.open_table(APPS)?;
            let mut apps = Vec::new();
            for entry in table.iter()? {
                let (_, value) = entry?;
                apps.push(decode(value.value())?);
            }
            Ok(apps)
        })
    }

    /// Images of an app in display order.
    pub fn images(&self, app_id: u64) -> StorageResult<Vec<AppImageRecord>> {
        self.db.read(|txn| {
            let order = txn.open_table(APP_IMAGE_ORDER)?;
            let images = txn.open_table(APP_IMAGES)?;
            let mut result = Vec::new();
            for entry in order.range((app_id, 0u32)..=(app_id, u32::MAX))? {
                let (_, image_id) = entry?;
                if let Some(value) = images.get(image_id.value())? {
                    result.push(decode(value.value())?);
                }
            }
            Ok(result)
        })
    }

    /// Apply `change` to an app and persist it. `NotFound` for unknown ids.
    ///
    /// A change that leaves the record as it was writes nothing and keeps
    /// `updated_at`.
    pub fn update(
        &self,
        id: u64,
        now: DateTime<Utc>,
        change: impl FnOnce(&mut AppRecord),
    ) -> StorageResult<AppRecord> {
        self.db.write(|txn| -> StorageResult<AppRecord> {
            let mut table = txn.open_table(APPS)?;
            let mut app: AppRecord = match table.get(id)? {
                Some(value) => decode(value.value())?,
                None => return Err(StorageError::NotFound(format!("App {id}"))),
            };

            let before = app.clone();
            change(&mut app);
            if app == before {
                return Ok(app);
            }
            app.updated_at = now;
            table.insert(id, encode(&app)?.as_slice())?;
            Ok(app)
        })
    }

    /// Look up an app inside an open write transaction.
    pub fn get_in(txn: &WriteTransaction, id: u64) -> StorageResult<Option<AppRecord>> {
        let table = txn.open_table(APPS)?;
        let app = match table.get(id)? {
            Some(value) => Some(decode(value.value())?),
            None => None,
        };
        Ok(app)
    }

    /// Insert a new app and return it with its allocated id.
    pub fn insert(
        txn: &WriteTransaction,
        new: NewApp,
        listing_tx_hash: &str,
        now: DateTime<Utc>,
    ) -> StorageResult<AppRecord> {
        let id = next_id(txn, "apps")?;
        let app = AppRecord {
            id,
            name: new.name,
            description: new.description,
            developer_address: new.developer_address,
            tags: new.tags,
            featured: false,
            hidden: false,
            logo_path: new.logo_path,
            listing_tx_hash: listing_tx_hash.to_string(),
            contract_addresses: new.contract_addresses,
            links: new.links,
            created_at: now,
            updated_at: now,
        };

        let mut table = txn.open_table(APPS)?;
        table.insert(id, encode(&app)?.as_slice())?;
        Ok(app)
    }

    /// Insert image metadata. A second image in the same order slot of the
    /// same app is a `Conflict`.
    pub fn insert_image(
        txn: &WriteTransaction,
        app_id: u64,
        image: NewAppImage,
    ) -> StorageResult<AppImageRecord> {
        {
            let order = txn.open_table(APP_IMAGE_ORDER)?;
            if order.get((app_id, image.order))?.is_some() {
                return Err(StorageError::Conflict(format!(
                    "App {app_id} already has an image at position {}",
                    image.order
                )));
            }
        }

        let id = next_id(txn, "app_images")?;
        let record = AppImageRecord {
            id,
            app_id,
            filename: image.filename,
            image_path: image.image_path,
            description: image.description,
            order: image.order,
        };

        let mut images = txn.open_table(APP_IMAGES)?;
        images.insert(id, encode(&record)?.as_slice())?;
        let mut order = txn.open_table(APP_IMAGE_ORDER)?;
        order.insert((app_id, record.order), id)?;
        Ok(record)
    }
}
