// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Optional Modules
//!
//! A module is a feature unit that owns persisted entities and contributes
//! routes. Which modules run is decided once at startup by `enableModules`.
//!
//! ## Activation
//!
//! ```text
//! Unregistered ──migrate──▶ SchemaMigrated ──register_routes──▶ RoutesActive
//! ```
//!
//! - Disabled modules stay `Unregistered`: no tables, no routes
//! - Routes are staged in a scratch [`RouteScope`] and merged only when every
//!   staged route is declared by the module and collides with nothing
//! - A failing module is logged and recorded on its status; the others
//!   still activate

pub mod boosting;
pub mod poe;
pub mod reviews;

use std::collections::HashSet;
use std::fmt;

use axum::{routing::MethodRouter, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::config::{AppConfig, ModuleFlags};
use crate::state::AppState;
use crate::storage::{Database, EntityKind, StorageError};

// =============================================================================
// Routes
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteMethod {
    Get,
    Post,
}

impl fmt::Display for RouteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteMethod::Get => f.write_str("GET"),
            RouteMethod::Post => f.write_str("POST"),
        }
    }
}

/// A route a module (or the core) declares it will serve.
///
/// Admin routes use their full `/admin/...` path and are mounted behind the
/// admin signature middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RouteSpec {
    pub method: RouteMethod,
    pub path: &'static str,
    pub admin: bool,
}

impl RouteSpec {
    pub const fn get(path: &'static str) -> Self {
        Self {
            method: RouteMethod::Get,
            path,
            admin: false,
        }
    }

    pub const fn post(path: &'static str) -> Self {
        Self {
            method: RouteMethod::Post,
            path,
            admin: false,
        }
    }

    pub const fn admin_post(path: &'static str) -> Self {
        Self {
            method: RouteMethod::Post,
            path,
            admin: true,
        }
    }

    pub const fn admin_get(path: &'static str) -> Self {
        Self {
            method: RouteMethod::Get,
            path,
            admin: true,
        }
    }
}

impl fmt::Display for RouteSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}

/// Prefix every admin route lives under.
pub const ADMIN_PREFIX: &str = "/admin";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("route {0} was registered but not declared")]
    Undeclared(String),

    #[error("declared route {0} was not registered")]
    Missing(String),

    #[error("route {0} is already registered")]
    Conflict(String),

    #[error("admin route {0} must live under {ADMIN_PREFIX}")]
    AdminPath(String),
}

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("schema migration failed: {0}")]
    Storage(#[from] StorageError),

    #[error("{0}")]
    Rejected(String),
}

/// Public and admin routers being assembled, plus the routes they hold.
pub struct RouteScope {
    public: Router<AppState>,
    admin: Router<AppState>,
    registered: Vec<RouteSpec>,
}

impl Default for RouteScope {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteScope {
    pub fn new() -> Self {
        Self {
            public: Router::new(),
            admin: Router::new(),
            registered: Vec::new(),
        }
    }

    fn holds(&self, spec: &RouteSpec) -> bool {
        self.registered
            .iter()
            .any(|r| r.method == spec.method && r.path == spec.path)
    }

    pub fn routes(&self) -> &[RouteSpec] {
        &self.registered
    }

    /// Mount `handler` for `spec`.
    pub fn add(&mut self, spec: RouteSpec, handler: MethodRouter<AppState>) -> Result<(), RouteError> {
        if self.holds(&spec) {
            return Err(RouteError::Conflict(spec.to_string()));
        }

        if spec.admin {
            let relative = spec
                .path
                .strip_prefix(ADMIN_PREFIX)
                .filter(|p| p.starts_with('/'))
                .ok_or_else(|| RouteError::AdminPath(spec.to_string()))?;
            self.admin = std::mem::take(&mut self.admin).route(relative, handler);
        } else {
            self.public = std::mem::take(&mut self.public).route(spec.path, handler);
        }

        self.registered.push(spec);
        Ok(())
    }

    /// Merge a staged scope. Nothing is merged if any staged route is
    /// already present.
    pub fn absorb(&mut self, staged: RouteScope) -> Result<(), RouteError> {
        if let Some(clash) = staged.registered.iter().find(|r| self.holds(r)) {
            return Err(RouteError::Conflict(clash.to_string()));
        }

        self.public = std::mem::take(&mut self.public).merge(staged.public);
        self.admin = std::mem::take(&mut self.admin).merge(staged.admin);
        self.registered.extend(staged.registered);
        Ok(())
    }

    /// Split into the public router and the router to nest under `/admin`.
    pub fn into_routers(self) -> (Router<AppState>, Router<AppState>) {
        (self.public, self.admin)
    }
}

// =============================================================================
// Module Contract
// =============================================================================

/// An optional feature unit.
pub trait Module: Send + Sync {
    /// Name matching the `enableModules` key.
    fn name(&self) -> &'static str;

    fn required_entities(&self) -> &'static [EntityKind];

    /// Every route this module contributes.
    fn routes(&self) -> &'static [RouteSpec];

    /// Create this module's tables. Must be idempotent.
    fn migrate(&self, db: &Database) -> Result<(), MigrationError> {
        db.migrate_module(self.name(), self.required_entities())?;
        Ok(())
    }

    /// Add this module's declared routes to `scope`.
    fn register_routes(
        &self,
        scope: &mut RouteScope,
        db: &Database,
        config: &AppConfig,
    ) -> Result<(), RouteError>;
}

// =============================================================================
// Registry
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ModuleState {
    Unregistered,
    SchemaMigrated,
    RoutesActive,
}

/// Activation outcome of one module, as reported by `/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModuleStatus {
    pub name: String,
    pub enabled: bool,
    pub state: ModuleState,
    pub entities: Vec<EntityKind>,
    pub routes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

struct ModuleEntry {
    module: Box<dyn Module>,
    enabled: bool,
    state: ModuleState,
    error: Option<String>,
}

/// The fixed set of modules known to this build and their activation state.
pub struct ModuleRegistry {
    entries: Vec<ModuleEntry>,
}

impl ModuleRegistry {
    pub fn new(modules: Vec<Box<dyn Module>>, flags: &ModuleFlags) -> Self {
        let mut seen = HashSet::new();
        let entries = modules
            .into_iter()
            .filter(|m| {
                let fresh = seen.insert(m.name());
                if !fresh {
                    tracing::warn!(module = m.name(), "Duplicate module ignored");
                }
                fresh
            })
            .map(|module| ModuleEntry {
                enabled: flags.is_enabled(module.name()),
                module,
                state: ModuleState::Unregistered,
                error: None,
            })
            .collect();
        Self { entries }
    }

    /// Registry of the modules shipped with the service.
    pub fn builtin(flags: &ModuleFlags) -> Self {
        Self::new(
            vec![
                Box::new(boosting::BoostingModule),
                Box::new(poe::PoeModule),
                Box::new(reviews::ReviewsModule),
            ],
            flags,
        )
    }

    /// Migrate and mount every enabled module into `scope`.
    pub fn activate(&mut self, db: &Database, config: &AppConfig, scope: &mut RouteScope) {
        for entry in &mut self.entries {
            let name = entry.module.name();
            if !entry.enabled {
                tracing::info!(module = name, "Module disabled");
                continue;
            }

            if let Err(e) = entry.module.migrate(db) {
                tracing::error!(module = name, error = %e, "Module migration failed");
                entry.error = Some(e.to_string());
                continue;
            }
            entry.state = ModuleState::SchemaMigrated;

            match stage_routes(entry.module.as_ref(), db, config).and_then(|staged| scope.absorb(staged)) {
                Ok(()) => {
                    entry.state = ModuleState::RoutesActive;
                    tracing::info!(
                        module = name,
                        routes = entry.module.routes().len(),
                        "Module activated"
                    );
                }
                Err(e) => {
                    tracing::error!(module = name, error = %e, "Module route registration failed");
                    entry.error = Some(e.to_string());
                }
            }
        }
    }

    pub fn statuses(&self) -> Vec<ModuleStatus> {
        self.entries
            .iter()
            .map(|e| ModuleStatus {
                name: e.module.name().to_string(),
                enabled: e.enabled,
                state: e.state,
                entities: e.module.required_entities().to_vec(),
                routes: e.module.routes().iter().map(ToString::to_string).collect(),
                error: e.error.clone(),
            })
            .collect()
    }
}

/// Let `module` register into a scratch scope and check the result against
/// its declared routes.
fn stage_routes(module: &dyn Module, db: &Database, config: &AppConfig) -> Result<RouteScope, RouteError> {
    let mut staged = RouteScope::new();
    module.register_routes(&mut staged, db, config)?;

    let declared = module.routes();
    if let Some(extra) = staged.routes().iter().find(|r| !declared.contains(r)) {
        return Err(RouteError::Undeclared(extra.to_string()));
    }
    if let Some(missing) = declared.iter().find(|d| !staged.routes().contains(d)) {
        return Err(RouteError::Missing(missing.to_string()));
    }
    Ok(staged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::sample_config;
    use crate::storage::database::tests::temp_db;
    use axum::routing::get;

    const ALL: ModuleFlags = ModuleFlags {
        poe: true,
        boosting: true,
        reviews: true,
    };

    async fn ok() -> &'static str {
        "ok"
    }

    /// Stand-in for a module whose migration always fails.
    struct BrokenMigration;

    impl Module for BrokenMigration {
        fn name(&self) -> &'static str {
            "reviews"
        }
        fn required_entities(&self) -> &'static [EntityKind] {
            &[EntityKind::Review]
        }
        fn routes(&self) -> &'static [RouteSpec] {
            const ROUTES: &[RouteSpec] = &[RouteSpec::get("/broken")];
            ROUTES
        }
        fn migrate(&self, _db: &Database) -> Result<(), MigrationError> {
            Err(MigrationError::Rejected("disk full".into()))
        }
        fn register_routes(&self, scope: &mut RouteScope, _: &Database, _: &AppConfig) -> Result<(), RouteError> {
            scope.add(RouteSpec::get("/broken"), get(ok))
        }
    }

    /// Registers a route it never declared.
    struct Sneaky;

    impl Module for Sneaky {
        fn name(&self) -> &'static str {
            "poe"
        }
        fn required_entities(&self) -> &'static [EntityKind] {
            &[EntityKind::EngagementPoint]
        }
        fn routes(&self) -> &'static [RouteSpec] {
            const ROUTES: &[RouteSpec] = &[RouteSpec::get("/declared")];
            ROUTES
        }
        fn register_routes(&self, scope: &mut RouteScope, _: &Database, _: &AppConfig) -> Result<(), RouteError> {
            scope.add(RouteSpec::get("/declared"), get(ok))?;
            scope.add(RouteSpec::get("/undeclared"), get(ok))
        }
    }

    fn status<'a>(statuses: &'a [ModuleStatus], name: &str) -> &'a ModuleStatus {
        statuses.iter().find(|s| s.name == name).unwrap()
    }

    fn active(registry: &ModuleRegistry, name: &str) -> bool {
        status(&registry.statuses(), name).state == ModuleState::RoutesActive
    }

    #[test]
    fn disabled_modules_stay_unregistered() {
        let (db, _dir) = temp_db();
        let flags = ModuleFlags {
            boosting: true,
            ..Default::default()
        };
        let mut registry = ModuleRegistry::builtin(&flags);
        let mut scope = RouteScope::new();
        registry.activate(&db, &sample_config(flags), &mut scope);

        assert!(active(&registry, "boosting"));
        assert!(!active(&registry, "poe"));
        assert!(!active(&registry, "reviews"));
        assert!(db.has_entity(EntityKind::Boost).unwrap());
        assert!(!db.has_entity(EntityKind::EngagementPoint).unwrap());
        assert!(!db.has_entity(EntityKind::Review).unwrap());

        let statuses = registry.statuses();
        assert_eq!(status(&statuses, "poe").state, ModuleState::Unregistered);
        assert!(!status(&statuses, "poe").enabled);
        assert_eq!(
            status(&statuses, "boosting").routes,
            vec!["POST /boost".to_string(), "GET /boosted".to_string()]
        );
    }

    #[test]
    fn failed_migration_does_not_block_other_modules() {
        let (db, _dir) = temp_db();
        let mut registry = ModuleRegistry::new(
            vec![
                Box::new(boosting::BoostingModule),
                Box::new(BrokenMigration),
                Box::new(poe::PoeModule),
            ],
            &ALL,
        );
        let mut scope = RouteScope::new();
        registry.activate(&db, &sample_config(ALL), &mut scope);

        assert!(active(&registry, "boosting"));
        assert!(active(&registry, "poe"));
        assert!(!active(&registry, "reviews"));

        let statuses = registry.statuses();
        let broken = status(&statuses, "reviews");
        assert_eq!(broken.state, ModuleState::Unregistered);
        assert_eq!(broken.error.as_deref(), Some("disk full"));
        assert!(!scope.routes().iter().any(|r| r.path == "/broken"));
    }

    #[test]
    fn undeclared_routes_are_rejected_whole() {
        let (db, _dir) = temp_db();
        let mut registry = ModuleRegistry::new(vec![Box::new(Sneaky)], &ALL);
        let mut scope = RouteScope::new();
        registry.activate(&db, &sample_config(ALL), &mut scope);

        let statuses = registry.statuses();
        let sneaky = status(&statuses, "poe");
        assert_eq!(sneaky.state, ModuleState::SchemaMigrated);
        assert!(sneaky.error.as_deref().unwrap().contains("/undeclared"));
        assert!(scope.routes().is_empty(), "no staged route may leak");
    }

    #[test]
    fn colliding_module_routes_conflict() {
        let (db, _dir) = temp_db();
        let mut scope = RouteScope::new();
        scope.add(RouteSpec::post("/boost"), axum::routing::post(ok)).unwrap();

        let mut registry = ModuleRegistry::new(vec![Box::new(boosting::BoostingModule)], &ALL);
        registry.activate(&db, &sample_config(ALL), &mut scope);

        assert!(!active(&registry, "boosting"));
        let statuses = registry.statuses();
        assert!(matches!(
            status(&statuses, "boosting").error.as_deref(),
            Some(e) if e.contains("already registered")
        ));
        assert_eq!(scope.routes().len(), 1);
    }

    #[test]
    fn activation_is_idempotent_across_restarts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("restart.redb");

        for _ in 0..2 {
            let db = Database::open(&path).unwrap();
            let mut registry = ModuleRegistry::builtin(&ALL);
            let mut scope = RouteScope::new();
            registry.activate(&db, &sample_config(ALL), &mut scope);
            assert!(registry.statuses().iter().all(|s| s.state == ModuleState::RoutesActive));
        }
    }

    #[test]
    fn admin_routes_need_admin_prefix() {
        let mut scope = RouteScope::new();
        let bad = scope.add(RouteSpec::admin_post("/review/hide"), axum::routing::post(ok));
        assert!(matches!(bad, Err(RouteError::AdminPath(_))));

        scope
            .add(RouteSpec::admin_post("/admin/review/hide"), axum::routing::post(ok))
            .unwrap();
        let dup = scope.add(RouteSpec::admin_post("/admin/review/hide"), axum::routing::post(ok));
        assert!(matches!(dup, Err(RouteError::Conflict(_))));
    }
}
