// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Campus Wallet

//! Session token claims and authenticated user representation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::roles::Role;

/// Claims carried by an HS256 session token minted by the trusted identity
/// frontend. Identity and role come pre-verified; this service performs no
/// password or credential checks of its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the canonical user id at the identity provider.
    pub sub: String,
    /// Expiration timestamp.
    pub exp: i64,
    /// Issued-at timestamp.
    #[serde(default)]
    pub iat: i64,
    /// University-issued student/staff id.
    pub university_id: String,
    #[serde(default)]
    pub given_name: String,
    #[serde(default)]
    pub family_name: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Role name; unknown or absent roles fall back to `student`.
    #[serde(default)]
    pub role: Option<String>,
}

/// Authenticated user information extracted from a session token.
///
/// This is the primary type used throughout the application to represent
/// the authenticated user making a request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Canonical user id (`sub` claim).
    pub user_id: String,
    pub university_id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: Role,
}

impl AuthenticatedUser {
    pub fn from_claims(claims: SessionClaims) -> Self {
        let role = claims
            .role
            .as_deref()
            .and_then(Role::from_str)
            .unwrap_or_default();

        Self {
            user_id: claims.sub,
            university_id: claims.university_id,
            first_name: claims.given_name,
            last_name: claims.family_name,
            email: claims.email,
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.has_privilege(Role::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_claims() -> SessionClaims {
        SessionClaims {
            sub: "user_123".to_string(),
            exp: 9_999_999_999,
            iat: 1_700_000_000,
            university_id: "20251234".to_string(),
            given_name: "Ada".to_string(),
            family_name: "Lovelace".to_string(),
            email: Some("ada@campus.example".to_string()),
            role: Some("admin".to_string()),
        }
    }

    #[test]
    fn from_claims_extracts_identity() {
        let user = AuthenticatedUser::from_claims(sample_claims());
        assert_eq!(user.user_id, "user_123");
        assert_eq!(user.university_id, "20251234");
        assert_eq!(user.first_name, "Ada");
        assert!(user.is_admin());
    }

    #[test]
    fn missing_or_unknown_role_defaults_to_student() {
        let mut claims = sample_claims();
        claims.role = None;
        assert_eq!(AuthenticatedUser::from_claims(claims).role, Role::Student);

        let mut claims = sample_claims();
        claims.role = Some("superuser".to_string());
        assert_eq!(AuthenticatedUser::from_claims(claims).role, Role::Student);
    }
}
