// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use crate::{
    auth::AdminOnly,
    error::ApiError,
    listing::{AppReviews, ListingService},
    models::{HideReviewRequest, ReviewRequest},
    state::AppState,
    storage::ReviewRecord,
};

/// Create the caller's review, or replace it if they already reviewed the app.
#[utoipa::path(
    post,
    path = "/review",
    request_body = ReviewRequest,
    tag = "Reviews",
    responses(
        (status = 201, description = "Review created", body = ReviewRecord),
        (status = 200, description = "Existing review updated", body = ReviewRecord),
        (status = 400, description = "Missing fields or rating outside 1-5"),
        (status = 401, description = "Signature does not match userAddress"),
        (status = 404, description = "Unknown app")
    )
)]
pub async fn submit_review(
    State(state): State<AppState>,
    request: Result<Json<ReviewRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ReviewRecord>), ApiError> {
    let Json(request) = request?;
    let input = request.into_input()?;
    let service = ListingService::new(&state.db, &state.config);
    let outcome = service.submit_review(input, Utc::now())?;

    let status = if outcome.is_created() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(outcome.into_inner())))
}

#[utoipa::path(
    get,
    path = "/reviews/{app_id}",
    params(
        ("app_id" = u64, Path, description = "App identifier")
    ),
    tag = "Reviews",
    responses(
        (status = 200, body = AppReviews),
        (status = 404, description = "Unknown app")
    )
)]
pub async fn app_reviews(
    Path(app_id): Path<u64>,
    State(state): State<AppState>,
) -> Result<Json<AppReviews>, ApiError> {
    let service = ListingService::new(&state.db, &state.config);
    Ok(Json(service.app_reviews(app_id)?))
}

#[utoipa::path(
    post,
    path = "/admin/review/hide",
    request_body = HideReviewRequest,
    tag = "Admin",
    responses(
        (status = 200, body = ReviewRecord),
        (status = 400, description = "Malformed body or missing reviewId"),
        (status = 401, description = "Missing or invalid admin signature"),
        (status = 403, description = "Signer is not an admin"),
        (status = 404, description = "Unknown review")
    )
)]
pub async fn hide_review(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
    request: Result<Json<HideReviewRequest>, JsonRejection>,
) -> Result<Json<ReviewRecord>, ApiError> {
    let Json(request) = request?;
    let (review_id, hidden) = request.into_parts()?;
    let service = ListingService::new(&state.db, &state.config);
    let review = service.hide_review(review_id, hidden, Utc::now())?;
    tracing::info!(admin = %admin.address, review_id, hidden, "Admin changed review visibility");
    Ok(Json(review))
}
