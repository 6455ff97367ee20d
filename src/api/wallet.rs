// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Campus Wallet

//! Wallet provisioning and lookup.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    auth::Auth,
    chain::{
        format_amount, keys, parse_address, ChainError, FundingDispatcher, FundingOutcome,
    },
    error::ApiError,
    state::AppState,
    storage::NewCredential,
};

/// Outcome of the best-effort gas grant during provisioning.
#[derive(Debug, Serialize, ToSchema)]
pub struct FundingStatus {
    /// "funded", "skipped", or "failed"
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<FundingOutcome> for FundingStatus {
    fn from(outcome: FundingOutcome) -> Self {
        match outcome {
            FundingOutcome::Funded { tx_hash } => Self {
                status: "funded".to_string(),
                tx_hash: Some(tx_hash),
                reason: None,
            },
            FundingOutcome::Skipped => Self {
                status: "skipped".to_string(),
                tx_hash: None,
                reason: None,
            },
            FundingOutcome::Failed { reason } => Self {
                status: "failed".to_string(),
                tx_hash: None,
                reason: Some(reason),
            },
        }
    }
}

/// Provisioning response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProvisionResponse {
    /// The wallet's on-chain address
    pub address: String,
    /// Whether this call created the wallet (false: it already existed)
    pub created: bool,
    /// Funding outcome; only present when the wallet was just created
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funding: Option<FundingStatus>,
}

/// Provision the caller's custodial wallet.
///
/// Idempotent: the first call generates a keypair, stores it, and sends the
/// gas grant; any later call returns the existing address untouched. A
/// failed grant never undoes wallet creation.
#[utoipa::path(
    post,
    path = "/v1/wallet",
    tag = "Wallet",
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Wallet created", body = ProvisionResponse),
        (status = 200, description = "Wallet already existed", body = ProvisionResponse),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn provision_wallet(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ProvisionResponse>), ApiError> {
    let (address, private_key_hex) = keys::generate_keypair();
    let (credential, created) = state.store.create_if_absent(
        NewCredential {
            user_id: user.user_id.clone(),
            university_id: user.university_id.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
        },
        &address,
        &private_key_hex,
    )?;

    if !created {
        return Ok((
            StatusCode::OK,
            Json(ProvisionResponse {
                address: credential.address,
                created: false,
                funding: None,
            }),
        ));
    }

    tracing::info!(
        user_id = %credential.user_id,
        address = %credential.address,
        "provisioned custodial wallet"
    );

    let recipient = parse_address(&credential.address)?;
    let dispatcher =
        FundingDispatcher::new(state.chain.as_ref(), &state.locks, state.funding_amount_wei);
    let funding = dispatcher
        .fund(state.operator_signer.clone(), recipient)
        .await;

    Ok((
        StatusCode::CREATED,
        Json(ProvisionResponse {
            address: credential.address,
            created: true,
            funding: Some(funding.into()),
        }),
    ))
}

/// The caller's wallet with its current token balance.
#[derive(Debug, Serialize, ToSchema)]
pub struct WalletResponse {
    pub address: String,
    /// Campus token balance, human-readable
    pub token_balance: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Get the caller's wallet and on-chain token balance.
#[utoipa::path(
    get,
    path = "/v1/wallet",
    tag = "Wallet",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Wallet details", body = WalletResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Wallet not provisioned"),
        (status = 503, description = "Chain unavailable")
    )
)]
pub async fn get_wallet(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<WalletResponse>, ApiError> {
    let credential = super::require_wallet(&state, &user.user_id)?;
    let address = parse_address(&credential.address)?;

    let balance = state
        .retry
        .run(|| state.chain.token_balance(address), ChainError::is_transient)
        .await?;
    let decimals = state
        .retry
        .run(|| state.chain.decimals(), ChainError::is_transient)
        .await?;

    Ok(Json(WalletResponse {
        address: credential.address,
        token_balance: format_amount(balance, decimals),
        created_at: credential.created_at,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthenticatedUser, Role};

    fn student(user_id: &str, university_id: &str) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: user_id.to_string(),
            university_id: university_id.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: None,
            role: Role::Student,
        }
    }

    // Test state has a zero funding amount, so provisioning never touches
    // the (unreachable) chain endpoint.
    #[tokio::test]
    async fn provisioning_is_idempotent() {
        let (state, _dir) = AppState::for_tests("secret");
        let user = student("user-1", "20251234");

        let (status, Json(first)) = provision_wallet(Auth(user.clone()), State(state.clone()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert!(first.created);
        assert!(matches!(&first.funding, Some(f) if f.status == "skipped"));

        let (status, Json(second)) = provision_wallet(Auth(user), State(state.clone()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::OK);
        assert!(!second.created);
        assert_eq!(second.address, first.address);

        let stored = state.store.get_by_user_id("user-1").unwrap().unwrap();
        assert_eq!(stored.address, first.address);
    }

    // The test chain endpoint is unreachable, so a nonzero grant always
    // fails to broadcast. The wallet row must survive that.
    #[tokio::test]
    async fn failed_funding_does_not_roll_back_creation() {
        let (mut state, _dir) = AppState::for_tests("secret");
        state.funding_amount_wei = alloy::primitives::U256::from(1_000u64);
        let user = student("user-1", "20251234");

        let (status, Json(response)) = provision_wallet(Auth(user), State(state.clone()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert!(response.created);
        assert!(matches!(&response.funding, Some(f) if f.status == "failed"));

        let stored = state.store.get_by_user_id("user-1").unwrap().unwrap();
        assert_eq!(stored.address, response.address);
    }

    #[tokio::test]
    async fn stored_key_rederives_the_stored_address() {
        let (state, _dir) = AppState::for_tests("secret");
        let user = student("user-1", "20251234");

        provision_wallet(Auth(user), State(state.clone())).await.unwrap();

        let stored = state.store.get_by_user_id("user-1").unwrap().unwrap();
        let rederived = keys::address_from_private_key(&stored.private_key_hex).unwrap();
        assert_eq!(rederived, stored.address);
    }

    #[tokio::test]
    async fn get_wallet_without_provisioning_is_404() {
        let (state, _dir) = AppState::for_tests("secret");
        let err = get_wallet(Auth(student("user-1", "20251234")), State(state))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
