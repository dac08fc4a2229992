// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Listing Service
//!
//! App registration and curation.
//!
//! Creating an app records the listing fee transaction, the app and its image
//! metadata in a single write transaction. Any failure, including a duplicate
//! image position, leaves neither the app nor the transaction behind.

pub mod reviews;

use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::{authenticate, messages};
use crate::config::AppConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::storage::{
    AppImageRecord, AppRecord, AppRepository, Database, NewApp, NewAppImage, TransactionRecord,
    TransactionRepository, TxType,
};

pub use reviews::{AppReviews, ReviewInput};

/// A validated app creation request.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateAppInput {
    pub app: NewApp,
    pub listing_tx_hash: String,
    pub signature: String,
    pub images: Vec<NewAppImage>,
}

/// An app with its images in display order.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppDetails {
    pub app: AppRecord,
    pub images: Vec<AppImageRecord>,
}

/// Filters for the public app list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppFilter {
    pub featured: Option<bool>,
    pub tag: Option<String>,
}

pub struct ListingService<'a> {
    db: &'a Database,
    config: &'a AppConfig,
}

impl<'a> ListingService<'a> {
    pub fn new(db: &'a Database, config: &'a AppConfig) -> Self {
        Self { db, config }
    }

    /// List a new app paid for by `listing_tx_hash`.
    ///
    /// Fee amount, token and recipient come from configuration. A listing
    /// transaction that already paid for an app is a conflict.
    pub fn create_app(&self, input: CreateAppInput, now: DateTime<Utc>) -> ServiceResult<AppDetails> {
        let CreateAppInput {
            mut app,
            listing_tx_hash,
            signature,
            images,
        } = input;

        if app.name.trim().is_empty() {
            return Err(ServiceError::validation("name is required"));
        }
        if app.description.trim().is_empty() {
            return Err(ServiceError::validation("description is required"));
        }
        if listing_tx_hash.trim().is_empty() {
            return Err(ServiceError::validation("listingTxHash is required"));
        }
        for contract in &app.contract_addresses {
            if contract.trim().parse::<Address>().is_err() {
                return Err(ServiceError::validation(format!(
                    "contract address {contract} is not a valid address"
                )));
            }
        }

        let message = messages::listing(&app.name, &listing_tx_hash);
        let developer = authenticate(&app.developer_address, &message, &signature)?;
        app.developer_address = developer.to_string();
        app.tags = normalize_tags(app.tags);

        let fee = &self.config.listing_fee;
        let platform_address = self.config.platform_address();

        let details = self.db.write(|txn| -> ServiceResult<AppDetails> {
            let tx = TransactionRepository::insert_or_fetch(
                txn,
                TransactionRecord::confirmed(
                    &listing_tx_hash,
                    &app.developer_address,
                    platform_address,
                    fee.amount.clone(),
                    &fee.token,
                    TxType::Listing,
                    None,
                    now,
                ),
            )?
            .into_inner();
            if tx.tx_type != TxType::Listing || tx.app_id.is_some() {
                return Err(ServiceError::Conflict(format!(
                    "Transaction {} has already been used",
                    tx.hash
                )));
            }

            let record = AppRepository::insert(txn, app, &tx.hash, now)?;
            TransactionRepository::bind_app(txn, &tx.hash, record.id)?;

            let mut stored = Vec::with_capacity(images.len());
            for image in images {
                stored.push(AppRepository::insert_image(txn, record.id, image)?);
            }
            stored.sort_by_key(|i| i.order);

            Ok(AppDetails {
                app: record,
                images: stored,
            })
        })?;

        tracing::info!(
            app_id = details.app.id,
            developer = %details.app.developer_address,
            tx_hash = %details.app.listing_tx_hash,
            images = details.images.len(),
            "App listed"
        );
        Ok(details)
    }

    /// A visible app with its images. Hidden apps are reported as not found.
    pub fn get_app(&self, id: u64) -> ServiceResult<AppDetails> {
        let repo = AppRepository::new(self.db);
        let app = repo
            .get(id)?
            .filter(|a| !a.hidden)
            .ok_or_else(|| ServiceError::NotFound(format!("App {id} not found")))?;
        let images = repo.images(id)?;
        Ok(AppDetails { app, images })
    }

    /// Visible apps matching `filter`, ordered by id.
    pub fn list_apps(&self, filter: &AppFilter) -> ServiceResult<Vec<AppRecord>> {
        let tag = filter.tag.as_deref().map(str::trim).filter(|t| !t.is_empty());
        let apps = AppRepository::new(self.db)
            .list()?
            .into_iter()
            .filter(|a| !a.hidden)
            .filter(|a| filter.featured.map_or(true, |f| a.featured == f))
            .filter(|a| tag.map_or(true, |t| a.tags.iter().any(|x| x.eq_ignore_ascii_case(t))))
            .collect();
        Ok(apps)
    }

    pub fn set_featured(&self, id: u64, featured: bool, now: DateTime<Utc>) -> ServiceResult<AppRecord> {
        let app = AppRepository::new(self.db).update(id, now, |a| a.featured = featured)?;
        tracing::info!(app_id = id, featured, "App featured flag updated");
        Ok(app)
    }

    pub fn set_hidden(&self, id: u64, hidden: bool, now: DateTime<Utc>) -> ServiceResult<AppRecord> {
        let app = AppRepository::new(self.db).update(id, now, |a| a.hidden = hidden)?;
        tracing::info!(app_id = id, hidden, "App hidden flag updated");
        Ok(app)
    }
}

/// Trim tags, drop empty ones and duplicates (case-insensitive), keeping order.
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut result: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !result.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            result.push(tag.to_string());
        }
    }
    result
}
