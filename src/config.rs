// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Process settings come from the environment; marketplace settings come from
//! a JSON file loaded once at startup and shared read-only afterwards.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `CONFIG_PATH` | Path to the marketplace JSON config | `/config/config.json` |
//! | `DB_PATH` | Path to the redb database file | `./appstore.redb` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `API_BASE_PATH` | Optional prefix for every route | empty |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::path::Path;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Environment variable name for the marketplace config file.
pub const CONFIG_PATH_ENV: &str = "CONFIG_PATH";

/// Default config file location (mounted by the deployment).
pub const DEFAULT_CONFIG_PATH: &str = "/config/config.json";

/// Environment variable name for the database file.
pub const DB_PATH_ENV: &str = "DB_PATH";

/// Default database location.
pub const DEFAULT_DB_PATH: &str = "./appstore.redb";

pub const HOST_ENV: &str = "HOST";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const PORT_ENV: &str = "PORT";
pub const DEFAULT_PORT: u16 = 8080;

/// Optional prefix under which all routes are nested (e.g. `/api`).
pub const API_BASE_PATH_ENV: &str = "API_BASE_PATH";

/// `json` for structured logs, anything else for human-readable output.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Log filter used when `RUST_LOG` is not set.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Message admins sign when no `adminChallenge` is configured.
pub const DEFAULT_ADMIN_CHALLENGE: &str = "message";

/// Recipient recorded on transactions when no `platformAddress` is configured.
pub const DEFAULT_PLATFORM_ADDRESS: &str = "platform_address";

/// Configuration loading and validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LogoConfig {
    #[serde(default)]
    pub light: String,
    #[serde(default)]
    pub dark: String,
}

/// Percentage split of boosting fees. Never exposed publicly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplitConfig {
    pub platform: u32,
    pub deployer: u32,
}

/// Module activation flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ModuleFlags {
    #[serde(default)]
    pub poe: bool,
    #[serde(default)]
    pub boosting: bool,
    #[serde(default)]
    pub reviews: bool,
}

impl ModuleFlags {
    /// Look up a flag by module name. Unknown modules are disabled.
    pub fn is_enabled(&self, module: &str) -> bool {
        match module {
            "poe" => self.poe,
            "boosting" => self.boosting,
            "reviews" => self.reviews,
            _ => false,
        }
    }
}

/// Listing fee charged to developers, as a decimal string plus token symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ListingFeeConfig {
    pub amount: String,
    pub token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageConfig {
    #[serde(default)]
    pub images_path: String,
}

/// Full marketplace configuration as read from `config.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub chain_name: String,
    #[serde(default)]
    pub primary_token: String,
    pub rpc_url: String,
    pub explorer_url: String,
    #[serde(default)]
    pub logos: LogoConfig,
    #[serde(default)]
    pub boosting_fee_split: FeeSplitConfig,
    #[serde(default)]
    pub enable_modules: ModuleFlags,
    #[serde(default)]
    pub admin_wallets: Vec<String>,
    pub listing_fee: ListingFeeConfig,
    #[serde(default)]
    pub backend_url: String,
    #[serde(default)]
    pub storage: StorageConfig,
    /// Message admins sign in the `X-Admin-Signature` header.
    #[serde(default)]
    pub admin_challenge: Option<String>,
    /// Address recorded as the recipient of listing and boosting payments.
    #[serde(default)]
    pub platform_address: Option<String>,
}

/// Subset of [`AppConfig`] that is safe to hand to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicConfig {
    pub chain_name: String,
    pub primary_token: String,
    pub rpc_url: String,
    pub explorer_url: String,
    pub logos: LogoConfig,
    pub enable_modules: ModuleFlags,
    pub listing_fee: ListingFeeConfig,
}

impl AppConfig {
    /// Read, parse and validate the config file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_json(&data)
    }

    /// Parse and validate a config document.
    pub fn from_json(data: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the rest of the service relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chain_name.trim().is_empty() {
            return Err(ConfigError::Invalid("chainName is required".into()));
        }

        for (field, value) in [("rpcUrl", &self.rpc_url), ("explorerUrl", &self.explorer_url)] {
            url::Url::parse(value)
                .map_err(|e| ConfigError::Invalid(format!("{field} is not a valid URL: {e}")))?;
        }

        let split = &self.boosting_fee_split;
        if split.platform.checked_add(split.deployer) != Some(100) {
            return Err(ConfigError::Invalid(format!(
                "boostingFeeSplit must add up to 100 (got platform: {}, deployer: {})",
                split.platform, split.deployer
            )));
        }

        if self.admin_wallets.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one adminWallet must be defined".into(),
            ));
        }
        for wallet in &self.admin_wallets {
            wallet.parse::<Address>().map_err(|_| {
                ConfigError::Invalid(format!("adminWallets entry {wallet} is not an address"))
            })?;
        }

        let fee = self
            .listing_fee
            .amount
            .parse::<f64>()
            .map_err(|_| ConfigError::Invalid("listingFee.amount must be a decimal".into()))?;
        if !fee.is_finite() || fee < 0.0 {
            return Err(ConfigError::Invalid(
                "listingFee.amount must be non-negative".into(),
            ));
        }
        if self.listing_fee.token.trim().is_empty() {
            return Err(ConfigError::Invalid("listingFee.token is required".into()));
        }

        Ok(())
    }

    /// Public-safe view of the configuration.
    pub fn public(&self) -> PublicConfig {
        PublicConfig {
            chain_name: self.chain_name.clone(),
            primary_token: self.primary_token.clone(),
            rpc_url: self.rpc_url.clone(),
            explorer_url: self.explorer_url.clone(),
            logos: self.logos.clone(),
            enable_modules: self.enable_modules,
            listing_fee: self.listing_fee.clone(),
        }
    }

    pub fn admin_challenge(&self) -> &str {
        self.admin_challenge
            .as_deref()
            .unwrap_or(DEFAULT_ADMIN_CHALLENGE)
    }

    pub fn platform_address(&self) -> &str {
        self.platform_address
            .as_deref()
            .unwrap_or(DEFAULT_PLATFORM_ADDRESS)
    }
}
