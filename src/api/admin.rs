// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admin-only API endpoints for marketplace curation.
//!
//! Every route here is mounted under `/admin` behind the signature middleware
//! and additionally extracts [`AdminOnly`], so a handler never runs without a
//! verified admin.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::Utc;

use crate::{
    auth::AdminOnly,
    error::ApiError,
    listing::ListingService,
    models::{AdminVerifyResponse, FeatureAppRequest, HideAppRequest},
    state::AppState,
    storage::AppRecord,
};

#[utoipa::path(
    post,
    path = "/admin/feature",
    request_body = FeatureAppRequest,
    tag = "Admin",
    responses(
        (status = 200, body = AppRecord),
        (status = 400, description = "Malformed body or missing appId"),
        (status = 401, description = "Missing or invalid admin signature"),
        (status = 403, description = "Signer is not an admin"),
        (status = 404, description = "Unknown app")
    )
)]
pub async fn feature_app(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
    request: Result<Json<FeatureAppRequest>, JsonRejection>,
) -> Result<Json<AppRecord>, ApiError> {
    let Json(request) = request?;
    let (app_id, featured) = request.into_parts()?;
    let service = ListingService::new(&state.db, &state.config);
    let app = service.set_featured(app_id, featured, Utc::now())?;
    tracing::info!(admin = %admin.address, app_id, featured, "Admin changed featured flag");
    Ok(Json(app))
}

#[utoipa::path(
    post,
    path = "/admin/hide",
    request_body = HideAppRequest,
    tag = "Admin",
    responses(
        (status = 200, body = AppRecord),
        (status = 400, description = "Malformed body or missing appId"),
        (status = 401, description = "Missing or invalid admin signature"),
        (status = 403, description = "Signer is not an admin"),
        (status = 404, description = "Unknown app")
    )
)]
pub async fn hide_app(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
    request: Result<Json<HideAppRequest>, JsonRejection>,
) -> Result<Json<AppRecord>, ApiError> {
    let Json(request) = request?;
    let (app_id, hidden) = request.into_parts()?;
    let service = ListingService::new(&state.db, &state.config);
    let app = service.set_hidden(app_id, hidden, Utc::now())?;
    tracing::info!(admin = %admin.address, app_id, hidden, "Admin changed hidden flag");
    Ok(Json(app))
}

/// Confirms the caller's admin signature and echoes the admin address.
#[utoipa::path(
    get,
    path = "/admin/verify",
    tag = "Admin",
    responses(
        (status = 200, body = AdminVerifyResponse),
        (status = 401, description = "Missing or invalid admin signature"),
        (status = 403, description = "Signer is not an admin")
    )
)]
pub async fn verify_admin(AdminOnly(admin): AdminOnly) -> Json<AdminVerifyResponse> {
    Json(AdminVerifyResponse {
        address: admin.address.to_string(),
        is_admin: true,
    })
}
