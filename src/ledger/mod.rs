// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Engagement Ledger
//!
//! Append-only records of economically meaningful actions: boosts paid for
//! with an on-chain transaction, and engagement points earned by using apps.
//!
//! ## Write Path
//!
//! 1. Field validation
//! 2. Signature over the canonical action message; the recovered signer must
//!    equal the claimed address
//! 3. One write transaction: referenced app must exist, dedup checks, inserts
//!
//! ## Boost Lifetime
//!
//! A boost expires one calendar month after creation and counts toward
//! rankings only while `expires_at > now`.

pub mod action;

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Months, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::{authenticate, messages};
use crate::config::AppConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::storage::{
    AppRecord, AppRepository, BoostRecord, BoostRepository, Database, NewBoost, NewPoint,
    PointRecord, PointRepository, TransactionRecord, TransactionRepository, TxType, Upsert,
};

pub use action::EngagementAction;

pub const DEFAULT_LEADERBOARD_LIMIT: usize = 100;
pub const DEFAULT_CONTRIBUTIONS_LIMIT: usize = 50;

/// A validated boost request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoostInput {
    pub app_id: u64,
    /// Decimal string, signed and stored exactly as received
    pub amount: String,
    pub token_symbol: String,
    pub tx_hash: String,
    pub user_address: String,
    pub signature: String,
}

/// A validated engagement request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngagementInput {
    pub app_id: u64,
    pub action: String,
    pub user_address: String,
    pub signature: String,
    pub tx_hash: Option<String>,
}

/// An app with its currently active boost total.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoostedApp {
    pub app: AppRecord,
    pub total_boost: f64,
    pub active_boosts: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Contributor {
    pub user_address: String,
    pub total_points: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AppContributions {
    pub app_id: u64,
    pub app_name: String,
    pub contributors: Vec<Contributor>,
}

/// Boost and engagement-point operations.
pub struct EngagementLedger<'a> {
    db: &'a Database,
    config: &'a AppConfig,
}

impl<'a> EngagementLedger<'a> {
    pub fn new(db: &'a Database, config: &'a AppConfig) -> Self {
        Self { db, config }
    }

    /// Record a boost funded by `input.tx_hash`.
    ///
    /// Retrying with the same hash, app and signer returns the boost recorded
    /// the first time as `Upsert::Existing`. Any other reuse of the hash is a
    /// conflict.
    pub fn record_boost(&self, input: BoostInput, now: DateTime<Utc>) -> ServiceResult<Upsert<BoostRecord>> {
        if parse_amount(&input.amount).is_none() {
            return Err(ServiceError::validation("amount must be a positive decimal"));
        }
        if input.token_symbol.trim().is_empty() {
            return Err(ServiceError::validation("tokenSymbol is required"));
        }
        if input.tx_hash.trim().is_empty() {
            return Err(ServiceError::validation("txHash is required"));
        }

        let message = messages::boost(input.app_id, &input.amount, &input.token_symbol);
        let signer = authenticate(&input.user_address, &message, &input.signature)?;
        let signer = signer.to_string();

        let expires_at = now
            .checked_add_months(Months::new(1))
            .ok_or_else(|| ServiceError::validation("boost expiry is out of range"))?;
        let platform_address = self.config.platform_address();

        let result = self.db.write(|txn| -> ServiceResult<Upsert<BoostRecord>> {
            if AppRepository::get_in(txn, input.app_id)?.is_none() {
                return Err(ServiceError::NotFound(format!("App {} not found", input.app_id)));
            }

            if let Some(existing) = BoostRepository::find_by_tx(txn, &input.tx_hash)? {
                if existing.app_id == input.app_id
                    && existing.user_address.eq_ignore_ascii_case(&signer)
                {
                    return Ok(Upsert::Existing(existing));
                }
                return Err(ServiceError::Conflict(format!(
                    "Transaction {} already funds another boost",
                    existing.tx_hash
                )));
            }

            let tx = TransactionRepository::insert_or_fetch(
                txn,
                TransactionRecord::confirmed(
                    &input.tx_hash,
                    &signer,
                    platform_address,
                    input.amount.clone(),
                    &input.token_symbol,
                    TxType::Boosting,
                    Some(input.app_id),
                    now,
                ),
            )?;
            if tx.get().tx_type != TxType::Boosting {
                return Err(ServiceError::Conflict(format!(
                    "Transaction {} was recorded as a listing payment",
                    tx.get().hash
                )));
            }

            let boost = BoostRepository::insert(
                txn,
                NewBoost {
                    app_id: input.app_id,
                    user_address: signer.clone(),
                    amount: input.amount.clone(),
                    token_symbol: input.token_symbol.clone(),
                    tx_hash: input.tx_hash.clone(),
                    created_at: now,
                    expires_at,
                },
            )?;
            Ok(Upsert::Created(boost))
        })?;

        match &result {
            Upsert::Created(boost) => tracing::info!(
                boost_id = boost.id,
                app_id = boost.app_id,
                amount = %boost.amount,
                tx_hash = %boost.tx_hash,
                "Boost recorded"
            ),
            Upsert::Existing(boost) => tracing::info!(
                boost_id = boost.id,
                tx_hash = %boost.tx_hash,
                "Boost replay returned existing record"
            ),
        }
        Ok(result)
    }

    /// Credit engagement points for a signed action.
    pub fn record_engagement(&self, input: EngagementInput, now: DateTime<Utc>) -> ServiceResult<PointRecord> {
        if input.action.trim().is_empty() {
            return Err(ServiceError::validation("action is required"));
        }

        let message = messages::engagement(input.app_id, &input.action);
        let signer = authenticate(&input.user_address, &message, &input.signature)?;
        let action = EngagementAction::parse(&input.action);

        let point = self.db.write(|txn| -> ServiceResult<PointRecord> {
            if AppRepository::get_in(txn, input.app_id)?.is_none() {
                return Err(ServiceError::NotFound(format!("App {} not found", input.app_id)));
            }

            let point = PointRepository::insert(
                txn,
                NewPoint {
                    app_id: input.app_id,
                    user_address: signer.to_string(),
                    amount: action.points(),
                    action: action.to_string(),
                    tx_hash: input.tx_hash.clone().filter(|h| !h.trim().is_empty()),
                    created_at: now,
                },
            )?;
            Ok(point)
        })?;

        tracing::info!(
            point_id = point.id,
            app_id = point.app_id,
            action = %point.action,
            amount = point.amount,
            "Engagement recorded"
        );
        Ok(point)
    }

    /// Apps with at least one active boost, highest total first.
    ///
    /// Hidden apps are included; ties are broken by app id.
    pub fn boosted_apps(&self, now: DateTime<Utc>) -> ServiceResult<Vec<BoostedApp>> {
        let mut totals: BTreeMap<u64, (f64, usize)> = BTreeMap::new();
        for boost in BoostRepository::new(self.db).list()? {
            if !boost.is_active(now) {
                continue;
            }
            let Some(amount) = parse_amount(&boost.amount) else {
                tracing::warn!(boost_id = boost.id, amount = %boost.amount, "Skipping boost with unparseable amount");
                continue;
            };
            let entry = totals.entry(boost.app_id).or_insert((0.0, 0));
            entry.0 += amount;
            entry.1 += 1;
        }

        let apps = AppRepository::new(self.db);
        let mut boosted = Vec::with_capacity(totals.len());
        for (app_id, (total_boost, active_boosts)) in totals {
            match apps.get(app_id)? {
                Some(app) => boosted.push(BoostedApp {
                    app,
                    total_boost,
                    active_boosts,
                }),
                None => tracing::warn!(app_id, "Boost references a missing app"),
            }
        }

        // Stable sort keeps ascending app id among equal totals
        boosted.sort_by(|a, b| b.total_boost.total_cmp(&a.total_boost));
        Ok(boosted)
    }

    /// Users ranked by total points across all apps.
    pub fn leaderboard(&self, limit: usize) -> ServiceResult<Vec<Contributor>> {
        let points = PointRepository::new(self.db).list()?;
        Ok(rank_contributors(points.iter(), limit))
    }

    /// Users ranked by points earned on one app.
    pub fn contributions(&self, app_id: u64, limit: usize) -> ServiceResult<AppContributions> {
        let app = AppRepository::new(self.db).require(app_id)?;
        let points = PointRepository::new(self.db).list()?;
        let contributors = rank_contributors(points.iter().filter(|p| p.app_id == app_id), limit);

        Ok(AppContributions {
            app_id,
            app_name: app.name,
            contributors,
        })
    }
}

/// Parse a plain positive decimal such as `"1.50"`.
///
/// Signs, exponents and spellings like `inf` are rejected.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let (whole, fraction) = raw.split_once('.').unwrap_or((raw, ""));
    let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !digits(whole) || !digits(fraction) {
        return None;
    }
    let value: f64 = raw.parse().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}

/// Sum points per user, descending. Users with equal totals keep the order
/// in which they first earned points.
fn rank_contributors<'p>(points: impl Iterator<Item = &'p PointRecord>, limit: usize) -> Vec<Contributor> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut contributors: Vec<Contributor> = Vec::new();

    for point in points {
        let key = point.user_address.to_ascii_lowercase();
        let slot = *index.entry(key).or_insert_with(|| {
            contributors.push(Contributor {
                user_address: point.user_address.clone(),
                total_points: 0,
            });
            contributors.len() - 1
        });
        contributors[slot].total_points += u64::from(point.amount);
    }

    contributors.sort_by(|a, b| b.total_points.cmp(&a.total_points));
    contributors.truncate(limit);
    contributors
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::signature::test_keys::*;
    use crate::config::tests::sample_config;
    use crate::config::ModuleFlags;
    use crate::storage::database::tests::temp_db;
    use crate::storage::repository::apps::tests::seed_app;
    use crate::storage::EntityKind;
    use chrono::{Duration, TimeZone};

    const OTHER_KEY: &str = "0x5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a";

    fn setup() -> (Database, tempfile::TempDir, AppConfig) {
        let (db, dir) = temp_db();
        db.migrate_module("boosting", &[EntityKind::Boost]).unwrap();
        db.migrate_module("poe", &[EntityKind::EngagementPoint]).unwrap();
        let config = sample_config(ModuleFlags {
            poe: true,
            boosting: true,
            reviews: false,
        });
        (db, dir, config)
    }

    fn boost_input(key: &str, app_id: u64, amount: &str, tx_hash: &str) -> BoostInput {
        let message = messages::boost(app_id, amount, "TST");
        BoostInput {
            app_id,
            amount: amount.into(),
            token_symbol: "TST".into(),
            tx_hash: tx_hash.into(),
            user_address: address(key),
            signature: sign(key, &message),
        }
    }

    fn engage_input(key: &str, app_id: u64, action: &str) -> EngagementInput {
        EngagementInput {
            app_id,
            action: action.into(),
            user_address: address(key),
            signature: sign(key, &messages::engagement(app_id, action)),
            tx_hash: None,
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn boost_expires_one_calendar_month_later() {
        let (db, _dir, config) = setup();
        let app = seed_app(&db, "Alpha");
        let ledger = EngagementLedger::new(&db, &config);

        let boost = ledger
            .record_boost(boost_input(USER_KEY, app.id, "2", "0xb1"), t0())
            .unwrap()
            .into_inner();
        assert_eq!(boost.expires_at, Utc.with_ymd_and_hms(2026, 4, 15, 12, 0, 0).unwrap());
        assert_eq!(boost.user_address, address(USER_KEY));

        let just_before = boost.expires_at - Duration::seconds(1);
        assert_eq!(ledger.boosted_apps(just_before).unwrap().len(), 1);
        assert!(ledger.boosted_apps(boost.expires_at).unwrap().is_empty());
    }

    #[test]
    fn end_of_month_expiry_clamps() {
        let (db, _dir, config) = setup();
        let app = seed_app(&db, "Alpha");
        let ledger = EngagementLedger::new(&db, &config);
        let jan31 = Utc.with_ymd_and_hms(2026, 1, 31, 8, 0, 0).unwrap();

        let boost = ledger
            .record_boost(boost_input(USER_KEY, app.id, "1", "0xb2"), jan31)
            .unwrap()
            .into_inner();
        assert_eq!(boost.expires_at, Utc.with_ymd_and_hms(2026, 2, 28, 8, 0, 0).unwrap());
    }

    #[test]
    fn boost_records_transaction_from_signer_to_platform() {
        let (db, _dir, config) = setup();
        let app = seed_app(&db, "Alpha");
        let ledger = EngagementLedger::new(&db, &config);

        ledger
            .record_boost(boost_input(USER_KEY, app.id, "1.50", "0xB3"), t0())
            .unwrap();

        let tx = TransactionRepository::new(&db).get("0xb3").unwrap().unwrap();
        assert_eq!(tx.tx_type, TxType::Boosting);
        assert_eq!(tx.from_address, address(USER_KEY));
        assert_eq!(tx.to_address, config.platform_address());
        assert_eq!(tx.value, "1.50");
        assert_eq!(tx.app_id, Some(app.id));
    }

    #[test]
    fn boost_reuses_recorded_transaction() {
        let (db, _dir, config) = setup();
        let app = seed_app(&db, "Alpha");
        let recorded = TransactionRecord::confirmed(
            "0xb4",
            &address(USER_KEY),
            "0x000000000000000000000000000000000000dEaD",
            "7".into(),
            "TST",
            TxType::Boosting,
            Some(app.id),
            t0() - Duration::days(1),
        );
        db.write(|txn| TransactionRepository::insert_or_fetch(txn, recorded.clone()))
            .unwrap();

        let ledger = EngagementLedger::new(&db, &config);
        let boost = ledger
            .record_boost(boost_input(USER_KEY, app.id, "2", "0xb4"), t0())
            .unwrap();
        assert!(boost.is_created());

        let tx = TransactionRepository::new(&db).get("0xb4").unwrap().unwrap();
        assert_eq!(tx, recorded, "existing transaction row must be reused untouched");
    }

    #[test]
    fn boost_replay_returns_existing_and_foreign_reuse_conflicts() {
        let (db, _dir, config) = setup();
        let alpha = seed_app(&db, "Alpha");
        let beta = seed_app(&db, "Beta");
        let ledger = EngagementLedger::new(&db, &config);

        let first = ledger
            .record_boost(boost_input(USER_KEY, alpha.id, "2", "0xb5"), t0())
            .unwrap();
        let replay = ledger
            .record_boost(boost_input(USER_KEY, alpha.id, "2", "0xb5"), t0())
            .unwrap();
        assert!(!replay.is_created());
        assert_eq!(replay.get(), first.get());

        let other_app = ledger.record_boost(boost_input(USER_KEY, beta.id, "2", "0xb5"), t0());
        assert!(matches!(other_app, Err(ServiceError::Conflict(_))));

        let other_user = ledger.record_boost(boost_input(OTHER_KEY, alpha.id, "2", "0xb5"), t0());
        assert!(matches!(other_user, Err(ServiceError::Conflict(_))));

        assert_eq!(BoostRepository::new(&db).list().unwrap().len(), 1);
    }

    #[test]
    fn boost_with_listing_transaction_conflicts() {
        let (db, _dir, config) = setup();
        let app = seed_app(&db, "Alpha");
        let listing = TransactionRecord::confirmed(
            "0xb6",
            &address(USER_KEY),
            "0x000000000000000000000000000000000000dEaD",
            "10".into(),
            "TST",
            TxType::Listing,
            Some(app.id),
            t0(),
        );
        db.write(|txn| TransactionRepository::insert_or_fetch(txn, listing))
            .unwrap();

        let ledger = EngagementLedger::new(&db, &config);
        let result = ledger.record_boost(boost_input(USER_KEY, app.id, "1", "0xb6"), t0());
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
        assert!(BoostRepository::new(&db).list().unwrap().is_empty());
    }

    #[test]
    fn boost_rejects_bad_input_before_writing() {
        let (db, _dir, config) = setup();
        let app = seed_app(&db, "Alpha");
        let ledger = EngagementLedger::new(&db, &config);

        let zero = ledger.record_boost(boost_input(USER_KEY, app.id, "0", "0xb7"), t0());
        assert!(matches!(zero, Err(ServiceError::Validation(_))));

        // Signed for a different amount than claimed
        let mut tampered = boost_input(USER_KEY, app.id, "1", "0xb7");
        tampered.amount = "100".into();
        assert!(matches!(
            ledger.record_boost(tampered, t0()),
            Err(ServiceError::Unauthorized(_))
        ));

        let mut wrong_claim = boost_input(USER_KEY, app.id, "1", "0xb7");
        wrong_claim.user_address = address(OTHER_KEY);
        assert!(matches!(
            ledger.record_boost(wrong_claim, t0()),
            Err(ServiceError::Unauthorized(_))
        ));

        let missing_app = ledger.record_boost(boost_input(USER_KEY, 99, "1", "0xb7"), t0());
        assert!(matches!(missing_app, Err(ServiceError::NotFound(_))));

        assert!(TransactionRepository::new(&db).get("0xb7").unwrap().is_none());
    }

    #[test]
    fn boost_amount_is_signed_and_stored_verbatim() {
        let (db, _dir, config) = setup();
        let app = seed_app(&db, "Alpha");
        let ledger = EngagementLedger::new(&db, &config);
        let precise = "123456789012345678901";

        let boost = ledger
            .record_boost(boost_input(USER_KEY, app.id, precise, "0xb8"), t0())
            .unwrap()
            .into_inner();
        assert_eq!(boost.amount, precise);
        let tx = TransactionRepository::new(&db).get("0xb8").unwrap().unwrap();
        assert_eq!(tx.value, precise);

        let boosted = ledger.boosted_apps(t0()).unwrap();
        assert_eq!(boosted[0].total_boost, 123456789012345678901.0);

        for bad in ["-1", "+1", "1e3", "inf", "NaN", "abc", ".", "1.2.3", " 1", "0.000"] {
            let result = ledger.record_boost(boost_input(USER_KEY, app.id, bad, "0xb9"), t0());
            assert!(
                matches!(result, Err(ServiceError::Validation(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn parse_amount_accepts_plain_decimals() {
        assert_eq!(parse_amount("1.50"), Some(1.5));
        assert_eq!(parse_amount("007"), Some(7.0));
        assert_eq!(parse_amount(".5"), Some(0.5));
        assert_eq!(parse_amount("2."), Some(2.0));
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("0"), None);
    }

    #[test]
    fn boosted_apps_sums_active_boosts_descending() {
        let (db, _dir, config) = setup();
        let alpha = seed_app(&db, "Alpha");
        let beta = seed_app(&db, "Beta");
        let gamma = seed_app(&db, "Gamma");
        let ledger = EngagementLedger::new(&db, &config);

        ledger.record_boost(boost_input(USER_KEY, alpha.id, "1", "0xc1"), t0()).unwrap();
        ledger.record_boost(boost_input(USER_KEY, beta.id, "2", "0xc2"), t0()).unwrap();
        ledger.record_boost(boost_input(OTHER_KEY, beta.id, "0.5", "0xc3"), t0()).unwrap();
        ledger.record_boost(boost_input(USER_KEY, gamma.id, "1", "0xc4"), t0()).unwrap();
        // Expired by the time of the query
        ledger
            .record_boost(
                boost_input(USER_KEY, gamma.id, "50", "0xc5"),
                t0() - Duration::days(60),
            )
            .unwrap();

        let boosted = ledger.boosted_apps(t0() + Duration::days(1)).unwrap();
        let ranking: Vec<(u64, f64, usize)> = boosted
            .iter()
            .map(|b| (b.app.id, b.total_boost, b.active_boosts))
            .collect();
        assert_eq!(
            ranking,
            vec![(beta.id, 2.5, 2), (alpha.id, 1.0, 1), (gamma.id, 1.0, 1)]
        );
    }

    #[test]
    fn use_always_earns_five_points() {
        let (db, _dir, config) = setup();
        let app = seed_app(&db, "Alpha");
        let ledger = EngagementLedger::new(&db, &config);

        for _ in 0..3 {
            let point = ledger
                .record_engagement(engage_input(USER_KEY, app.id, "use"), t0())
                .unwrap();
            assert_eq!(point.amount, 5);
            assert_eq!(point.action, "use");
        }
    }

    #[test]
    fn engagement_requires_matching_signature() {
        let (db, _dir, config) = setup();
        let app = seed_app(&db, "Alpha");
        let ledger = EngagementLedger::new(&db, &config);

        let mut input = engage_input(USER_KEY, app.id, "visit");
        input.action = "use".into();
        assert!(matches!(
            ledger.record_engagement(input, t0()),
            Err(ServiceError::Unauthorized(_))
        ));

        let missing = ledger.record_engagement(engage_input(USER_KEY, 42, "visit"), t0());
        assert!(matches!(missing, Err(ServiceError::NotFound(_))));
        assert!(PointRepository::new(&db).list().unwrap().is_empty());
    }

    #[test]
    fn leaderboard_ranks_users_with_stable_ties() {
        let (db, _dir, config) = setup();
        let alpha = seed_app(&db, "Alpha");
        let beta = seed_app(&db, "Beta");
        let ledger = EngagementLedger::new(&db, &config);

        // OTHER earns first, then USER catches up to the same total
        ledger.record_engagement(engage_input(OTHER_KEY, alpha.id, "share"), t0()).unwrap();
        ledger.record_engagement(engage_input(USER_KEY, beta.id, "visit"), t0()).unwrap();
        ledger.record_engagement(engage_input(USER_KEY, alpha.id, "visit"), t0()).unwrap();
        ledger.record_engagement(engage_input(USER_KEY, alpha.id, "other"), t0()).unwrap();
        ledger.record_engagement(engage_input(ADMIN_KEY, beta.id, "use"), t0()).unwrap();

        let board = ledger.leaderboard(DEFAULT_LEADERBOARD_LIMIT).unwrap();
        let ranked: Vec<(String, u64)> = board
            .into_iter()
            .map(|c| (c.user_address, c.total_points))
            .collect();
        assert_eq!(
            ranked,
            vec![
                (address(ADMIN_KEY), 5),
                (address(OTHER_KEY), 3),
                (address(USER_KEY), 3),
            ]
        );

        assert_eq!(ledger.leaderboard(1).unwrap().len(), 1);
    }

    #[test]
    fn contributions_are_scoped_to_one_app() {
        let (db, _dir, config) = setup();
        let alpha = seed_app(&db, "Alpha");
        let beta = seed_app(&db, "Beta");
        let ledger = EngagementLedger::new(&db, &config);

        ledger.record_engagement(engage_input(USER_KEY, alpha.id, "use"), t0()).unwrap();
        ledger.record_engagement(engage_input(OTHER_KEY, beta.id, "use"), t0()).unwrap();

        let contributions = ledger
            .contributions(alpha.id, DEFAULT_CONTRIBUTIONS_LIMIT)
            .unwrap();
        assert_eq!(contributions.app_name, "Alpha");
        assert_eq!(
            contributions.contributors,
            vec![Contributor {
                user_address: address(USER_KEY),
                total_points: 5,
            }]
        );

        assert!(matches!(
            ledger.contributions(404, DEFAULT_CONTRIBUTIONS_LIMIT),
            Err(ServiceError::NotFound(_))
        ));
    }
}
