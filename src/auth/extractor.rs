// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Campus Wallet

//! Axum extractor for authenticated users.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{decode, Algorithm, Validation};

use super::{AuthError, AuthenticatedUser, SessionClaims};
use crate::state::AppState;

/// Clock skew tolerance (60 seconds).
const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Extractor for authenticated users.
///
/// Validates the HS256 session token from the Authorization header and
/// yields the verified identity. The token is minted by the trusted
/// identity frontend with the shared `SESSION_JWT_SECRET`.
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        // A test or middleware layer may have placed the user already
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>().cloned() {
            return Ok(Auth(user));
        }

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidAuthHeader)?;

        let user = verify_session_token(token, &state.session_decoding_key)?;
        Ok(Auth(user))
    }
}

/// Verify a session token and extract the user it identifies.
fn verify_session_token(
    token: &str,
    decoding_key: &jsonwebtoken::DecodingKey,
) -> Result<AuthenticatedUser, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = CLOCK_SKEW_LEEWAY;
    validation.validate_aud = false;
    validation.set_required_spec_claims(&["exp"]);

    let token_data =
        decode::<SessionClaims>(token, decoding_key, &validation).map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            jsonwebtoken::errors::ErrorKind::ImmatureSignature => AuthError::TokenNotYetValid,
            _ => AuthError::MalformedToken,
        })?;

    Ok(AuthenticatedUser::from_claims(token_data.claims))
}

/// Extractor that requires admin role.
pub struct AdminOnly(pub AuthenticatedUser);

impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Auth(user) = Auth::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(AdminOnly(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use axum::http::Request;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-session-secret";

    fn signed_token(claims: &SessionClaims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn sample_claims(role: &str) -> SessionClaims {
        SessionClaims {
            sub: "user_123".to_string(),
            exp: 9_999_999_999,
            iat: 1_700_000_000,
            university_id: "20251234".to_string(),
            given_name: "Ada".to_string(),
            family_name: "Lovelace".to_string(),
            email: None,
            role: Some(role.to_string()),
        }
    }

    fn request_parts(token: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/test");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn missing_header_is_rejected() {
        let (state, _dir) = AppState::for_tests(SECRET);
        let mut parts = request_parts(None);

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn valid_token_yields_the_user() {
        let (state, _dir) = AppState::for_tests(SECRET);
        let token = signed_token(&sample_claims("student"), SECRET);
        let mut parts = request_parts(Some(&token));

        let Auth(user) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(user.user_id, "user_123");
        assert_eq!(user.university_id, "20251234");
        assert_eq!(user.role, Role::Student);
    }

    #[tokio::test]
    async fn wrong_secret_is_rejected() {
        let (state, _dir) = AppState::for_tests(SECRET);
        let token = signed_token(&sample_claims("student"), "some-other-secret");
        let mut parts = request_parts(Some(&token));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidSignature)));
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let (state, _dir) = AppState::for_tests(SECRET);
        let mut claims = sample_claims("student");
        claims.exp = 1_600_000_000;
        let token = signed_token(&claims, SECRET);
        let mut parts = request_parts(Some(&token));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::TokenExpired)));
    }

    #[tokio::test]
    async fn admin_only_rejects_students() {
        let (state, _dir) = AppState::for_tests(SECRET);
        let token = signed_token(&sample_claims("student"), SECRET);
        let mut parts = request_parts(Some(&token));

        let result = AdminOnly::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InsufficientPermissions)));
    }

    #[tokio::test]
    async fn admin_only_accepts_admins() {
        let (state, _dir) = AppState::for_tests(SECRET);
        let token = signed_token(&sample_claims("admin"), SECRET);
        let mut parts = request_parts(Some(&token));

        let AdminOnly(user) = AdminOnly::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert!(user.is_admin());
    }
}
