// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{extract::State, Json};

use crate::config::PublicConfig;
use crate::state::AppState;

/// Marketplace settings clients need to render and pay. Admin wallets and
/// the fee split are never included.
#[utoipa::path(
    get,
    path = "/config",
    tag = "Config",
    responses((status = 200, body = PublicConfig))
)]
pub async fn public_config(State(state): State<AppState>) -> Json<PublicConfig> {
    Json(state.config.public())
}
