// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Paid boosts that raise an app's visibility for one month.

use axum::routing::{get, post};

use super::{Module, RouteError, RouteScope, RouteSpec};
use crate::api::boosting;
use crate::config::AppConfig;
use crate::storage::{Database, EntityKind};

const BOOST: RouteSpec = RouteSpec::post("/boost");
const BOOSTED: RouteSpec = RouteSpec::get("/boosted");

pub struct BoostingModule;

impl Module for BoostingModule {
    fn name(&self) -> &'static str {
        "boosting"
    }

    fn required_entities(&self) -> &'static [EntityKind] {
        &[EntityKind::Boost]
    }

    fn routes(&self) -> &'static [RouteSpec] {
        const ROUTES: &[RouteSpec] = &[BOOST, BOOSTED];
        ROUTES
    }

    fn register_routes(&self, scope: &mut RouteScope, _db: &Database, config: &AppConfig) -> Result<(), RouteError> {
        tracing::info!(
            platform = config.boosting_fee_split.platform,
            deployer = config.boosting_fee_split.deployer,
            "Boost fee split"
        );
        scope.add(BOOST, post(boosting::boost))?;
        scope.add(BOOSTED, get(boosting::boosted))
    }
}
