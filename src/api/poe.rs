// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Proof-of-engagement endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use crate::{
    error::ApiError,
    ledger::{
        AppContributions, Contributor, EngagementLedger, DEFAULT_CONTRIBUTIONS_LIMIT,
        DEFAULT_LEADERBOARD_LIMIT,
    },
    models::{EngageRequest, LimitQuery},
    state::AppState,
    storage::PointRecord,
};

#[utoipa::path(
    post,
    path = "/engage",
    request_body = EngageRequest,
    tag = "Engagement",
    responses(
        (status = 201, body = PointRecord),
        (status = 400, description = "Missing fields"),
        (status = 401, description = "Signature does not match userAddress"),
        (status = 404, description = "Unknown app")
    )
)]
pub async fn engage(
    State(state): State<AppState>,
    request: Result<Json<EngageRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<PointRecord>), ApiError> {
    let Json(request) = request?;
    let input = request.into_input()?;
    let ledger = EngagementLedger::new(&state.db, &state.config);
    let point = ledger.record_engagement(input, Utc::now())?;
    Ok((StatusCode::CREATED, Json(point)))
}

#[utoipa::path(
    get,
    path = "/leaderboard",
    params(LimitQuery),
    tag = "Engagement",
    responses((status = 200, body = [Contributor]))
)]
pub async fn leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<Contributor>>, ApiError> {
    let ledger = EngagementLedger::new(&state.db, &state.config);
    let limit = query.limit.unwrap_or(DEFAULT_LEADERBOARD_LIMIT);
    Ok(Json(ledger.leaderboard(limit)?))
}

#[utoipa::path(
    get,
    path = "/contributions/{app_id}",
    params(
        ("app_id" = u64, Path, description = "App identifier"),
        LimitQuery
    ),
    tag = "Engagement",
    responses(
        (status = 200, body = AppContributions),
        (status = 404, description = "Unknown app")
    )
)]
pub async fn contributions(
    Path(app_id): Path<u64>,
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<AppContributions>, ApiError> {
    let ledger = EngagementLedger::new(&state.db, &state.config);
    let limit = query.limit.unwrap_or(DEFAULT_CONTRIBUTIONS_LIMIT);
    Ok(Json(ledger.contributions(app_id, limit)?))
}
