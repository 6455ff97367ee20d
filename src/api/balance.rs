// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Campus Wallet

//! On-chain balance queries.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    auth::Auth,
    chain::{format_amount, parse_address, ChainError},
    error::ApiError,
    state::AppState,
};

/// Balance response. Always read from the chain; balances are never served
/// from a cache.
#[derive(Debug, Serialize, ToSchema)]
pub struct BalanceResponse {
    pub address: String,
    /// Campus token balance, human-readable
    pub token_balance: String,
    /// Native gas-currency balance in wei
    pub native_balance_wei: String,
}

/// Get the token and native balance of any address.
#[utoipa::path(
    get,
    path = "/v1/balance/{address}",
    tag = "Wallet",
    params(("address" = String, Path, description = "EVM address to query")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Balances retrieved", body = BalanceResponse),
        (status = 400, description = "Invalid address"),
        (status = 401, description = "Unauthorized"),
        (status = 503, description = "Chain unavailable")
    )
)]
pub async fn get_balance(
    Auth(_user): Auth,
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let parsed = parse_address(&address)?;

    let token_balance = state
        .retry
        .run(|| state.chain.token_balance(parsed), ChainError::is_transient)
        .await?;
    let decimals = state
        .retry
        .run(|| state.chain.decimals(), ChainError::is_transient)
        .await?;
    let native_balance = state
        .retry
        .run(|| state.chain.native_balance(parsed), ChainError::is_transient)
        .await?;

    Ok(Json(BalanceResponse {
        address: format!("{parsed:#x}"),
        token_balance: format_amount(token_balance, decimals),
        native_balance_wei: native_balance.to_string(),
    }))
}
