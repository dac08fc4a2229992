// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use super::SignatureError;

/// Authentication error type.
///
/// Everything except `InsufficientPermissions` means the caller failed to
/// prove who they are and maps to 401.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No signature header present
    MissingSignature,
    /// Signature header is not valid UTF-8
    InvalidSignatureHeader,
    /// Signature could not be decoded or recovered
    InvalidSignature(SignatureError),
    /// Signature is valid but was produced by another address
    SignerMismatch,
    /// Signer is authenticated but not on the admin allow-list
    InsufficientPermissions,
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingSignature => "missing_signature",
            AuthError::InvalidSignatureHeader => "invalid_signature_header",
            AuthError::InvalidSignature(_) => "invalid_signature",
            AuthError::SignerMismatch => "signer_mismatch",
            AuthError::InsufficientPermissions => "insufficient_permissions",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingSignature
            | AuthError::InvalidSignatureHeader
            | AuthError::InvalidSignature(_)
            | AuthError::SignerMismatch => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientPermissions => StatusCode::FORBIDDEN,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingSignature => write!(f, "admin signature required"),
            AuthError::InvalidSignatureHeader => write!(f, "signature header is not valid text"),
            AuthError::InvalidSignature(e) => write!(f, "invalid signature: {e}"),
            AuthError::SignerMismatch => write!(f, "invalid signature"),
            AuthError::InsufficientPermissions => write!(f, "not an admin wallet"),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<SignatureError> for AuthError {
    fn from(e: SignatureError) -> Self {
        AuthError::InvalidSignature(e)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn missing_signature_returns_401() {
        let response = AuthError::MissingSignature.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["error_code"], "missing_signature");
    }

    #[tokio::test]
    async fn insufficient_permissions_returns_403() {
        let response = AuthError::InsufficientPermissions.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn recovery_failures_are_unauthorized() {
        let err = AuthError::from(SignatureError::InvalidLength(3));
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.error_code(), "invalid_signature");
    }
}
