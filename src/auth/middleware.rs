// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admin gate applied to the whole `/admin` router subtree.
//!
//! Core admin routes and admin routes contributed by modules share this
//! layer, so no privileged handler can be mounted without it.
//!
//! ```rust,ignore
//! let admin = admin_routes.route_layer(axum::middleware::from_fn_with_state(
//!     state.clone(),
//!     require_admin,
//! ));
//! ```

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::{AdminIdentity, AuthError};
use crate::state::AppState;

/// Header carrying the admin's signature over the challenge message.
pub const ADMIN_SIGNATURE_HEADER: &str = "x-admin-signature";

/// Read the admin signature header.
pub(crate) fn signature_header(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(ADMIN_SIGNATURE_HEADER)
        .ok_or(AuthError::MissingSignature)?
        .to_str()
        .map_err(|_| AuthError::InvalidSignatureHeader)?;

    if value.trim().is_empty() {
        return Err(AuthError::MissingSignature);
    }
    Ok(value)
}

/// Resolve the admin identity for a request.
pub(crate) fn admin_from_headers(
    headers: &HeaderMap,
    state: &AppState,
) -> Result<AdminIdentity, AuthError> {
    let signature = signature_header(headers)?;
    state.admin.authorize(signature)
}

/// Authentication middleware function.
///
/// Rejects with 401 when the signature is absent or unrecoverable and 403
/// when the signer is not an admin. On success the [`AdminIdentity`] is
/// stored in the request extensions.
pub async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    match admin_from_headers(request.headers(), &state) {
        Ok(identity) => {
            tracing::debug!(admin = %identity.address, path = %request.uri().path(), "Admin request authorized");
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(e) => e.into_response(),
    }
}
