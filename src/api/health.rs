// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::modules::ModuleStatus;
use crate::state::AppState;
use crate::storage::EntityKind;

/// Health check response with individual component status.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Overall health status ("ok" or "degraded").
    pub status: String,
    /// Database availability ("ok" or "unavailable").
    pub database: String,
    /// Activation outcome of every known module.
    pub modules: Vec<ModuleStatus>,
}

/// Check that the database answers a read.
fn check_database(state: &AppState) -> bool {
    match state.db.has_entity(EntityKind::App) {
        Ok(present) => present,
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            false
        }
    }
}

/// Health check endpoint handler.
///
/// Returns 200 when the database is readable, 503 otherwise. Module failures
/// are reported but do not make the service unhealthy.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let db_ok = check_database(&state);

    let response = HealthResponse {
        status: if db_ok { "ok" } else { "degraded" }.to_string(),
        database: if db_ok { "ok" } else { "unavailable" }.to_string(),
        modules: state.modules.statuses(),
    };

    let status = if db_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}
