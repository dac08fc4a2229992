// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Boost endpoints, mounted only when the `boosting` module is active.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use crate::{
    error::ApiError,
    ledger::{BoostedApp, EngagementLedger},
    models::BoostRequest,
    state::AppState,
    storage::BoostRecord,
};

/// Record a paid boost.
///
/// Resubmitting the same boost (same tx, app and signer) returns the stored
/// boost with 200 instead of 201.
#[utoipa::path(
    post,
    path = "/boost",
    request_body = BoostRequest,
    tag = "Boosting",
    responses(
        (status = 201, description = "Boost recorded", body = BoostRecord),
        (status = 200, description = "Boost already recorded", body = BoostRecord),
        (status = 400, description = "Malformed body, missing fields or non-positive amount"),
        (status = 401, description = "Signature does not match userAddress"),
        (status = 404, description = "Unknown app"),
        (status = 409, description = "Transaction already used")
    )
)]
pub async fn boost(
    State(state): State<AppState>,
    request: Result<Json<BoostRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BoostRecord>), ApiError> {
    let Json(request) = request?;
    let input = request.into_input()?;
    let ledger = EngagementLedger::new(&state.db, &state.config);
    let outcome = ledger.record_boost(input, Utc::now())?;

    let status = if outcome.is_created() {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(outcome.into_inner())))
}

/// Apps with at least one unexpired boost, highest total first.
#[utoipa::path(
    get,
    path = "/boosted",
    tag = "Boosting",
    responses((status = 200, body = [BoostedApp]))
)]
pub async fn boosted(State(state): State<AppState>) -> Result<Json<Vec<BoostedApp>>, ApiError> {
    let ledger = EngagementLedger::new(&state.db, &state.config);
    Ok(Json(ledger.boosted_apps(Utc::now())?))
}
