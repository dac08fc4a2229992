// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use crate::{
    error::ApiError,
    listing::{AppDetails, ListingService},
    models::{AppsQuery, CreateAppRequest},
    state::AppState,
    storage::AppRecord,
};

#[utoipa::path(
    get,
    path = "/apps",
    params(AppsQuery),
    tag = "Apps",
    responses((status = 200, body = [AppRecord]))
)]
pub async fn list_apps(
    State(state): State<AppState>,
    Query(query): Query<AppsQuery>,
) -> Result<Json<Vec<AppRecord>>, ApiError> {
    let service = ListingService::new(&state.db, &state.config);
    Ok(Json(service.list_apps(&query.into())?))
}

#[utoipa::path(
    post,
    path = "/apps",
    request_body = CreateAppRequest,
    tag = "Apps",
    responses(
        (status = 201, body = AppDetails),
        (status = 400, description = "Missing or invalid fields"),
        (status = 401, description = "Signature does not match developerAddress"),
        (status = 409, description = "Listing transaction already used or duplicate image order")
    )
)]
pub async fn create_app(
    State(state): State<AppState>,
    request: Result<Json<CreateAppRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AppDetails>), ApiError> {
    let Json(request) = request?;
    let input = request.into_input(&state.config.storage.images_path)?;
    let service = ListingService::new(&state.db, &state.config);
    let details = service.create_app(input, Utc::now())?;
    Ok((StatusCode::CREATED, Json(details)))
}

#[utoipa::path(
    get,
    path = "/apps/{id}",
    params(
        ("id" = u64, Path, description = "App identifier")
    ),
    tag = "Apps",
    responses(
        (status = 200, body = AppDetails),
        (status = 404, description = "Unknown or hidden app")
    )
)]
pub async fn get_app(
    Path(id): Path<u64>,
    State(state): State<AppState>,
) -> Result<Json<AppDetails>, ApiError> {
    let service = ListingService::new(&state.db, &state.config);
    Ok(Json(service.get_app(id)?))
}
