// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Signed app reviews, one per user and app.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::ListingService;
use crate::auth::{authenticate, messages};
use crate::error::{ServiceError, ServiceResult};
use crate::storage::{AppRepository, NewReview, ReviewRecord, ReviewRepository, Upsert};

/// A validated review submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewInput {
    pub app_id: u64,
    pub rating: i64,
    pub comment: Option<String>,
    pub user_address: String,
    pub signature: String,
}

/// Visible reviews of an app with their aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppReviews {
    pub app_id: u64,
    pub reviews: Vec<ReviewRecord>,
    pub count: usize,
    /// Mean rating over visible reviews; absent when there are none
    pub average_rating: Option<f64>,
}

impl ListingService<'_> {
    /// Create the caller's review of an app, or update it if one exists.
    pub fn submit_review(&self, input: ReviewInput, now: DateTime<Utc>) -> ServiceResult<Upsert<ReviewRecord>> {
        let rating = u8::try_from(input.rating)
            .ok()
            .filter(|r| (1..=5).contains(r))
            .ok_or_else(|| ServiceError::validation("rating must be between 1 and 5"))?;

        let message = messages::review(input.app_id, rating);
        let signer = authenticate(&input.user_address, &message, &input.signature)?;
        let comment = input
            .comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        let result = self.db.write(|txn| -> ServiceResult<Upsert<ReviewRecord>> {
            if AppRepository::get_in(txn, input.app_id)?.is_none() {
                return Err(ServiceError::NotFound(format!("App {} not found", input.app_id)));
            }

            let review = ReviewRepository::upsert(
                txn,
                NewReview {
                    app_id: input.app_id,
                    user_address: signer.to_string(),
                    rating,
                    comment,
                    signature: input.signature.clone(),
                },
                now,
            )?;
            Ok(review)
        })?;

        tracing::info!(
            review_id = result.get().id,
            app_id = input.app_id,
            rating,
            created = result.is_created(),
            "Review saved"
        );
        Ok(result)
    }

    /// Visible reviews of an app. Hidden reviews count toward neither the
    /// list nor the average.
    pub fn app_reviews(&self, app_id: u64) -> ServiceResult<AppReviews> {
        AppRepository::new(self.db).require(app_id)?;

        let reviews: Vec<ReviewRecord> = ReviewRepository::new(self.db)
            .list_for_app(app_id)?
            .into_iter()
            .filter(|r| !r.hidden)
            .collect();

        let count = reviews.len();
        let average_rating = (count > 0).then(|| {
            let sum: u32 = reviews.iter().map(|r| u32::from(r.rating)).sum();
            f64::from(sum) / count as f64
        });

        Ok(AppReviews {
            app_id,
            reviews,
            count,
            average_rating,
        })
    }

    pub fn hide_review(&self, review_id: u64, hidden: bool, now: DateTime<Utc>) -> ServiceResult<ReviewRecord> {
        let review = ReviewRepository::new(self.db).set_hidden(review_id, hidden, now)?;
        tracing::info!(review_id, hidden, "Review visibility updated");
        Ok(review)
    }
}
