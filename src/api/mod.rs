// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use axum::{
    body::Body,
    http::Request,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::middleware::require_admin,
    config::{AppConfig, ListingFeeConfig, LogoConfig, ModuleFlags, PublicConfig},
    ledger::{AppContributions, BoostedApp, Contributor},
    listing::{AppDetails, AppReviews},
    models::{
        AdminVerifyResponse, AppImageRequest, BoostRequest, CreateAppRequest, EngageRequest,
        FeatureAppRequest, HideAppRequest, HideReviewRequest, ReviewRequest,
    },
    modules::{ModuleRegistry, ModuleState, ModuleStatus, RouteError, RouteScope, RouteSpec, ADMIN_PREFIX},
    state::AppState,
    storage::{
        AppImageRecord, AppLinks, AppRecord, BoostRecord, Database, EntityKind, PointRecord,
        ReviewRecord, TransactionRecord, TxStatus, TxType,
    },
};

pub mod admin;
pub mod apps;
pub mod boosting;
pub mod config;
pub mod health;
pub mod poe;
pub mod reviews;

/// Routes served regardless of which modules are enabled.
const HEALTH: RouteSpec = RouteSpec::get("/health");
const CONFIG: RouteSpec = RouteSpec::get("/config");
const LIST_APPS: RouteSpec = RouteSpec::get("/apps");
const CREATE_APP: RouteSpec = RouteSpec::post("/apps");
const GET_APP: RouteSpec = RouteSpec::get("/apps/{id}");
const FEATURE_APP: RouteSpec = RouteSpec::admin_post("/admin/feature");
const HIDE_APP: RouteSpec = RouteSpec::admin_post("/admin/hide");
const VERIFY_ADMIN: RouteSpec = RouteSpec::admin_get("/admin/verify");

fn core_routes(scope: &mut RouteScope) -> Result<(), RouteError> {
    scope.add(HEALTH, get(health::health))?;
    scope.add(CONFIG, get(config::public_config))?;
    scope.add(LIST_APPS, get(apps::list_apps))?;
    scope.add(CREATE_APP, post(apps::create_app))?;
    scope.add(GET_APP, get(apps::get_app))?;
    scope.add(FEATURE_APP, post(admin::feature_app))?;
    scope.add(HIDE_APP, post(admin::hide_app))?;
    scope.add(VERIFY_ADMIN, get(admin::verify_admin))
}

/// Activate the enabled modules and assemble the full HTTP service.
///
/// `base_path`, when set, nests every API route under that prefix. The
/// documentation routes stay at the root.
pub fn build(
    config: AppConfig,
    db: Database,
    base_path: Option<&str>,
) -> Result<(Router, AppState), RouteError> {
    let mut scope = RouteScope::new();
    core_routes(&mut scope)?;

    let mut modules = ModuleRegistry::builtin(&config.enable_modules);
    modules.activate(&db, &config, &mut scope);

    let state = AppState::new(Arc::new(config), Arc::new(db), modules);
    Ok((router(scope, state.clone(), base_path), state))
}

fn router(scope: RouteScope, state: AppState, base_path: Option<&str>) -> Router {
    let (public, admin) = scope.into_routers();
    let admin = admin.route_layer(middleware::from_fn_with_state(
        state.clone(),
        require_admin,
    ));

    let routes = public.nest(ADMIN_PREFIX, admin).with_state(state);
    let routes = match base_path.map(|p| p.trim_end_matches('/')) {
        Some(prefix) if prefix.starts_with('/') => Router::new().nest(prefix, routes),
        _ => routes,
    };

    routes
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("-");
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        config::public_config,
        apps::list_apps,
        apps::create_app,
        apps::get_app,
        admin::feature_app,
        admin::hide_app,
        admin::verify_admin,
        boosting::boost,
        boosting::boosted,
        poe::engage,
        poe::leaderboard,
        poe::contributions,
        reviews::submit_review,
        reviews::app_reviews,
        reviews::hide_review
    ),
    components(
        schemas(
            health::HealthResponse,
            ModuleStatus,
            ModuleState,
            EntityKind,
            PublicConfig,
            LogoConfig,
            ListingFeeConfig,
            ModuleFlags,
            AppRecord,
            AppLinks,
            AppImageRecord,
            AppDetails,
            TransactionRecord,
            TxStatus,
            TxType,
            BoostRecord,
            BoostedApp,
            PointRecord,
            Contributor,
            AppContributions,
            ReviewRecord,
            AppReviews,
            CreateAppRequest,
            AppImageRequest,
            BoostRequest,
            EngageRequest,
            ReviewRequest,
            FeatureAppRequest,
            HideAppRequest,
            HideReviewRequest,
            AdminVerifyResponse
        )
    ),
    tags(
        (name = "Health", description = "Service and module status"),
        (name = "Config", description = "Public marketplace settings"),
        (name = "Apps", description = "App listings"),
        (name = "Boosting", description = "Paid boosts"),
        (name = "Engagement", description = "Proof-of-engagement points and rankings"),
        (name = "Reviews", description = "User reviews"),
        (name = "Admin", description = "Curation, requires X-Admin-Signature")
    )
)]
struct ApiDoc;
