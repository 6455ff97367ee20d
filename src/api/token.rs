// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Campus Wallet

//! Token metadata endpoint.

use axum::{extract::State, Json};

use crate::{
    auth::Auth,
    chain::{ChainError, TokenInfo},
    error::ApiError,
    state::AppState,
};

/// Get campus token metadata (name, symbol, decimals, contract address).
///
/// Served from a long-TTL cache; the contract's metadata never changes, so
/// a stale hit is harmless and a cold read retries transient RPC failures.
#[utoipa::path(
    get,
    path = "/v1/token/info",
    tag = "Token",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Token metadata", body = TokenInfo),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Chain unavailable")
    )
)]
pub async fn token_info(
    Auth(_user): Auth,
    State(state): State<AppState>,
) -> Result<Json<TokenInfo>, ApiError> {
    if let Some(info) = state.token_info_cache.get() {
        return Ok(Json(info));
    }

    let info = state
        .retry
        .run(|| state.chain.token_info(), ChainError::is_transient)
        .await?;
    state.token_info_cache.put(info.clone());
    Ok(Json(info))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthenticatedUser, Role};

    #[tokio::test]
    async fn cached_metadata_is_served_without_touching_the_chain() {
        let (state, _dir) = AppState::for_tests("secret");
        // The test chain endpoint is unreachable: a hit proves the cache path.
        state.token_info_cache.put(TokenInfo {
            address: "0x76568bed5acf1a5cd888773c8cae9ea2a9131a63".to_string(),
            name: "Campus Token".to_string(),
            symbol: "CMP".to_string(),
            decimals: 18,
        });

        let user = AuthenticatedUser {
            user_id: "user-1".to_string(),
            university_id: "20251234".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            email: None,
            role: Role::Student,
        };

        let Json(info) = token_info(Auth(user), State(state)).await.unwrap();
        assert_eq!(info.symbol, "CMP");
        assert_eq!(info.decimals, 18);
    }
}
