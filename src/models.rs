// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request bodies and query parameters accepted by the REST API. All JSON is
//! `camelCase`.
//!
//! Required fields are declared as `Option` so that a missing field is
//! reported as a 400 validation error by `into_input` rather than a body
//! rejection. Validation always runs before any signature is checked.
//!
//! ## Model Categories
//!
//! - **Apps**: listing creation and public filters
//! - **Ledger**: boosts and engagement actions
//! - **Reviews**: review submission
//! - **Admin**: curation flags

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::{ServiceError, ServiceResult};
use crate::ledger::{BoostInput, EngagementInput};
use crate::listing::{AppFilter, CreateAppInput, ReviewInput};
use crate::storage::{AppLinks, NewApp, NewAppImage};

fn required<T>(value: Option<T>, field: &str) -> ServiceResult<T> {
    value.ok_or_else(|| ServiceError::validation(format!("{field} is required")))
}

/// Like [`required`], also rejecting blank strings.
fn required_text(value: Option<String>, field: &str) -> ServiceResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ServiceError::validation(format!("{field} is required"))),
    }
}

// =============================================================================
// App Models
// =============================================================================

/// Screenshot metadata submitted with a new app. Image bytes are uploaded
/// separately.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppImageRequest {
    pub filename: Option<String>,
    /// Defaults to `{storage.imagesPath}/{filename}`
    pub image_path: Option<String>,
    /// Caption
    pub description: Option<String>,
    /// Display position; defaults to the index in the list
    pub order: Option<u32>,
}

/// Request to list a new app.
///
/// `signature` is the developer's signature over
/// `List app {name} with tx {listingTxHash}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub developer_address: Option<String>,
    pub signature: Option<String>,
    pub listing_tx_hash: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub logo_path: Option<String>,
    #[serde(default)]
    pub contract_addresses: Vec<String>,
    #[serde(default)]
    pub links: AppLinks,
    #[serde(default)]
    pub images: Vec<AppImageRequest>,
}

impl CreateAppRequest {
    pub fn into_input(self, images_path: &str) -> ServiceResult<CreateAppInput> {
        let images = self
            .images
            .into_iter()
            .enumerate()
            .map(|(index, image)| -> ServiceResult<NewAppImage> {
                let filename = required_text(image.filename, "images[].filename")?;
                let image_path = image.image_path.unwrap_or_else(|| {
                    format!("{}/{}", images_path.trim_end_matches('/'), filename)
                });
                let order = match image.order {
                    Some(order) => order,
                    None => u32::try_from(index)
                        .map_err(|_| ServiceError::validation("too many images"))?,
                };
                Ok(NewAppImage {
                    filename,
                    image_path,
                    description: image.description,
                    order,
                })
            })
            .collect::<ServiceResult<Vec<_>>>()?;

        Ok(CreateAppInput {
            app: NewApp {
                name: required_text(self.name, "name")?,
                description: required_text(self.description, "description")?,
                developer_address: required_text(self.developer_address, "developerAddress")?,
                tags: self.tags,
                logo_path: self.logo_path,
                contract_addresses: self.contract_addresses,
                links: self.links,
            },
            listing_tx_hash: required_text(self.listing_tx_hash, "listingTxHash")?,
            signature: required_text(self.signature, "signature")?,
            images,
        })
    }
}

/// Filters for `GET /apps`.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct AppsQuery {
    /// Only featured (`true`) or only non-featured (`false`) apps
    pub featured: Option<bool>,
    /// Case-insensitive tag match
    pub tag: Option<String>,
}

impl From<AppsQuery> for AppFilter {
    fn from(query: AppsQuery) -> Self {
        AppFilter {
            featured: query.featured,
            tag: query.tag,
        }
    }
}

// =============================================================================
// Ledger Models
// =============================================================================

/// Request to boost an app.
///
/// `signature` covers `Boost app {appId} with {amount} {tokenSymbol}`, with
/// `amount` exactly as sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BoostRequest {
    pub app_id: Option<u64>,
    /// Positive decimal string, e.g. `"1.50"`
    #[schema(example = "1.50")]
    pub amount: Option<String>,
    pub token_symbol: Option<String>,
    pub tx_hash: Option<String>,
    pub user_address: Option<String>,
    pub signature: Option<String>,
}

impl BoostRequest {
    pub fn into_input(self) -> ServiceResult<BoostInput> {
        Ok(BoostInput {
            app_id: required(self.app_id, "appId")?,
            amount: required_text(self.amount, "amount")?,
            token_symbol: required_text(self.token_symbol, "tokenSymbol")?,
            tx_hash: required_text(self.tx_hash, "txHash")?,
            user_address: required_text(self.user_address, "userAddress")?,
            signature: required_text(self.signature, "signature")?,
        })
    }
}

/// Request to record an engagement action.
///
/// `signature` covers `Engage with app {appId} with action {action}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EngageRequest {
    pub app_id: Option<u64>,
    /// `visit`, `use`, `share` or any other action name
    pub action: Option<String>,
    pub user_address: Option<String>,
    pub signature: Option<String>,
    pub tx_hash: Option<String>,
}

impl EngageRequest {
    pub fn into_input(self) -> ServiceResult<EngagementInput> {
        Ok(EngagementInput {
            app_id: required(self.app_id, "appId")?,
            action: required_text(self.action, "action")?,
            user_address: required_text(self.user_address, "userAddress")?,
            signature: required_text(self.signature, "signature")?,
            tx_hash: self.tx_hash,
        })
    }
}

/// Result size for ranking endpoints.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

// =============================================================================
// Review Models
// =============================================================================

/// Request to create or update the caller's review.
///
/// `signature` covers `Review app {appId} with rating {rating}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub app_id: Option<u64>,
    /// 1 to 5
    pub rating: Option<i64>,
    pub comment: Option<String>,
    pub user_address: Option<String>,
    pub signature: Option<String>,
}

impl ReviewRequest {
    pub fn into_input(self) -> ServiceResult<ReviewInput> {
        Ok(ReviewInput {
            app_id: required(self.app_id, "appId")?,
            rating: required(self.rating, "rating")?,
            comment: self.comment,
            user_address: required_text(self.user_address, "userAddress")?,
            signature: required_text(self.signature, "signature")?,
        })
    }
}

// =============================================================================
// Admin Models
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FeatureAppRequest {
    pub app_id: Option<u64>,
    /// Defaults to `false`
    #[serde(default)]
    pub featured: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HideAppRequest {
    pub app_id: Option<u64>,
    /// Defaults to `false`
    #[serde(default)]
    pub hidden: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HideReviewRequest {
    pub review_id: Option<u64>,
    /// Defaults to `false`
    #[serde(default)]
    pub hidden: bool,
}

impl FeatureAppRequest {
    pub fn into_parts(self) -> ServiceResult<(u64, bool)> {
        Ok((required(self.app_id, "appId")?, self.featured))
    }
}

impl HideAppRequest {
    pub fn into_parts(self) -> ServiceResult<(u64, bool)> {
        Ok((required(self.app_id, "appId")?, self.hidden))
    }
}

impl HideReviewRequest {
    pub fn into_parts(self) -> ServiceResult<(u64, bool)> {
        Ok((required(self.review_id, "reviewId")?, self.hidden))
    }
}

/// Identity of a verified admin.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AdminVerifyResponse {
    pub address: String,
    pub is_admin: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_are_validation_errors() {
        let err = BoostRequest {
            app_id: Some(1),
            amount: Some("1.0".into()),
            ..Default::default()
        }
        .into_input()
        .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref m) if m == "tokenSymbol is required"));

        let blank = EngageRequest {
            app_id: Some(1),
            action: Some("  ".into()),
            user_address: Some("0xabc".into()),
            signature: Some("0xsig".into()),
            tx_hash: None,
        };
        assert!(matches!(blank.into_input(), Err(ServiceError::Validation(_))));

        assert!(ReviewRequest::default().into_input().is_err());
        assert!(FeatureAppRequest::default().into_parts().is_err());
    }

    #[test]
    fn image_defaults_fill_path_and_order() {
        let request = CreateAppRequest {
            name: Some("Alpha".into()),
            description: Some("desc".into()),
            developer_address: Some("0xabc".into()),
            signature: Some("0xsig".into()),
            listing_tx_hash: Some("0xtx".into()),
            images: vec![
                AppImageRequest {
                    filename: Some("a.png".into()),
                    ..Default::default()
                },
                AppImageRequest {
                    filename: Some("b.png".into()),
                    image_path: Some("/cdn/b.png".into()),
                    order: Some(7),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let input = request.into_input("/images/").unwrap();
        assert_eq!(input.images[0].image_path, "/images/a.png");
        assert_eq!(input.images[0].order, 0);
        assert_eq!(input.images[1].image_path, "/cdn/b.png");
        assert_eq!(input.images[1].order, 7);
    }

    #[test]
    fn admin_flags_default_to_false() {
        let parsed: FeatureAppRequest = serde_json::from_str(r#"{"appId": 3}"#).unwrap();
        assert_eq!(parsed.into_parts().unwrap(), (3, false));

        let parsed: HideAppRequest = serde_json::from_str(r#"{"appId": 3, "hidden": true}"#).unwrap();
        assert_eq!(parsed.into_parts().unwrap(), (3, true));

        let parsed: HideReviewRequest = serde_json::from_str(r#"{"reviewId": 4}"#).unwrap();
        assert_eq!(parsed.into_parts().unwrap(), (4, false));
    }

    #[test]
    fn boost_amount_is_kept_as_sent() {
        let parsed: BoostRequest = serde_json::from_str(
            r#"{"appId": 1, "amount": "123456789012345678901.50", "tokenSymbol": "TST",
                "txHash": "0x1", "userAddress": "0xabc", "signature": "0xsig"}"#,
        )
        .unwrap();
        assert_eq!(parsed.into_input().unwrap().amount, "123456789012345678901.50");

        let numeric = serde_json::from_str::<BoostRequest>(r#"{"appId": 1, "amount": 1.5}"#);
        assert!(numeric.is_err());
    }
}
