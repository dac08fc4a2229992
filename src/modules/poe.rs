// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Proof of engagement: points for visiting, using and sharing apps.

use axum::routing::{get, post};

use super::{Module, RouteError, RouteScope, RouteSpec};
use crate::api::poe;
use crate::config::AppConfig;
use crate::storage::{Database, EntityKind};

const ENGAGE: RouteSpec = RouteSpec::post("/engage");
const LEADERBOARD: RouteSpec = RouteSpec::get("/leaderboard");
const CONTRIBUTIONS: RouteSpec = RouteSpec::get("/contributions/{app_id}");

pub struct PoeModule;

impl Module for PoeModule {
    fn name(&self) -> &'static str {
        "poe"
    }

    fn required_entities(&self) -> &'static [EntityKind] {
        &[EntityKind::EngagementPoint]
    }

    fn routes(&self) -> &'static [RouteSpec] {
        const ROUTES: &[RouteSpec] = &[ENGAGE, LEADERBOARD, CONTRIBUTIONS];
        ROUTES
    }

    fn register_routes(&self, scope: &mut RouteScope, _db: &Database, _config: &AppConfig) -> Result<(), RouteError> {
        scope.add(ENGAGE, post(poe::engage))?;
        scope.add(LEADERBOARD, get(poe::leaderboard))?;
        scope.add(CONTRIBUTIONS, get(poe::contributions))
    }
}
