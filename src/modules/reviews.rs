// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::routing::{get, post};

use super::{Module, RouteError, RouteScope, RouteSpec};
use crate::api::reviews;
use crate::config::AppConfig;
use crate::storage::{Database, EntityKind};

const SUBMIT: RouteSpec = RouteSpec::post("/review");
const LIST: RouteSpec = RouteSpec::get("/reviews/{app_id}");
const HIDE: RouteSpec = RouteSpec::admin_post("/admin/review/hide");

/// One signed rating per user and app, with admin moderation.
pub struct ReviewsModule;

impl Module for ReviewsModule {
    fn name(&self) -> &'static str {
        "reviews"
    }

    fn required_entities(&self) -> &'static [EntityKind] {
        &[EntityKind::Review]
    }

    fn routes(&self) -> &'static [RouteSpec] {
        const ROUTES: &[RouteSpec] = &[SUBMIT, LIST, HIDE];
        ROUTES
    }

    fn register_routes(&self, scope: &mut RouteScope, _db: &Database, _config: &AppConfig) -> Result<(), RouteError> {
        scope.add(SUBMIT, post(reviews::submit_review))?;
        scope.add(LIST, get(reviews::app_reviews))?;
        scope.add(HIDE, post(reviews::hide_review))
    }
}
