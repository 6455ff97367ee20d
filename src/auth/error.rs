// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Campus Wallet

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Authentication error type.
#[derive(Debug)]
pub enum AuthError {
    /// No authorization header present
    MissingAuthHeader,
    /// Invalid authorization header format
    InvalidAuthHeader,
    /// Token is malformed
    MalformedToken,
    /// Token signature is invalid
    InvalidSignature,
    /// Token has expired
    TokenExpired,
    /// Token is not yet valid
    TokenNotYetValid,
    /// Insufficient permissions
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
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::MalformedToken => "malformed_token",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::TokenExpired => "token_expired",
            AuthError::TokenNotYetValid => "token_not_yet_valid",
            AuthError::InsufficientPermissions => "insufficient_permissions",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeader
            | AuthError::MalformedToken
            | AuthError::InvalidSignature
            | AuthError::TokenExpired
            | AuthError::TokenNotYetValid => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientPermissions => StatusCode::FORBIDDEN,
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingAuthHeader => write!(f, "Authorization header is required"),
            AuthError::InvalidAuthHeader => {
                write!(f, "Invalid authorization header format (expected 'Bearer <token>')")
            }
            AuthError::MalformedToken => write!(f, "Token is malformed"),
            AuthError::InvalidSignature => write!(f, "Token signature is invalid"),
            AuthError::TokenExpired => write!(f, "Token has expired"),
            AuthError::TokenNotYetValid => write!(f, "Token is not yet valid"),
            AuthError::InsufficientPermissions => {
                write!(f, "Insufficient permissions for this operation")
            }
        }
    }
}

impl std::error::Error for AuthError {}

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
    async fn missing_auth_returns_401() {
        let response = AuthError::MissingAuthHeader.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["error_code"], "missing_auth_header");
    }

    #[tokio::test]
    async fn insufficient_permissions_returns_403() {
        let response = AuthError::InsufficientPermissions.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
