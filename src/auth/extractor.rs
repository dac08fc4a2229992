// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for verified admins.
//!
//! ```rust,ignore
//! async fn feature_app(AdminOnly(admin): AdminOnly) -> impl IntoResponse {
//!     // admin.address is the recovered signer
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{middleware::admin_from_headers, AdminIdentity, AuthError};
use crate::state::AppState;

/// Extractor that requires a verified admin signature.
///
/// Uses the identity stored by [`require_admin`](super::middleware::require_admin)
/// when present, otherwise verifies the header itself.
pub struct AdminOnly(pub AdminIdentity);

impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // First check if middleware already set the identity
        if let Some(identity) = parts.extensions.get::<AdminIdentity>().copied() {
            return Ok(AdminOnly(identity));
        }

        admin_from_headers(&parts.headers, state).map(AdminOnly)
    }
}
