// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::AdminPolicy;
use crate::config::AppConfig;
use crate::modules::ModuleRegistry;
use crate::storage::Database;

/// Shared handler state. Everything here is immutable after startup; all
/// mutable state lives in the database.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: Arc<Database>,
    pub admin: Arc<AdminPolicy>,
    pub modules: Arc<ModuleRegistry>,
}

impl AppState {
    pub fn new(config: Arc<AppConfig>, db: Arc<Database>, modules: ModuleRegistry) -> Self {
        let admin = AdminPolicy::from_config(&config);
        Self {
            config,
            db,
            admin: Arc::new(admin),
            modules: Arc::new(modules),
        }
    }
}
