// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Campus Wallet

//! Admin-only API endpoints for token management.
//!
//! These endpoints require the Admin role and provide:
//! - Minting (operator-signed)
//! - Treasury management
//! - Inactivity-penalty exemptions
//! - Aggregate token statistics with explicit cache control

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use alloy::primitives::Address;

use crate::{
    auth::AdminOnly,
    chain::{parse_address, parse_amount, AccountActivity, ChainError, TokenStats},
    error::ApiError,
    state::AppState,
    storage::{TransferKind, TransferRecord},
};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for POST /v1/admin/mint.
#[derive(Debug, Deserialize, ToSchema)]
pub struct MintRequest {
    /// Token amount to mint, human-readable decimal string
    pub amount: String,
    /// Recipient address; defaults to the on-chain treasury when omitted
    #[serde(default)]
    pub to: Option<String>,
}

/// A confirmed admin write.
#[derive(Debug, Serialize, ToSchema)]
pub struct AdminTxResponse {
    pub tx_hash: String,
    pub block_number: u64,
}

/// Treasury address.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TreasuryResponse {
    pub address: String,
}

/// Request body for PUT /v1/admin/treasury.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetTreasuryRequest {
    pub address: String,
}

/// Request body for POST /v1/admin/exemptions.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetExemptionRequest {
    pub address: String,
    pub exempt: bool,
}

/// Penalty exemption state of an address.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExemptionResponse {
    pub address: String,
    pub exempt: bool,
}

/// Cache invalidation acknowledgement.
#[derive(Debug, Serialize, ToSchema)]
pub struct InvalidateResponse {
    pub status: String,
}

/// Query string for GET /v1/admin/users.
#[derive(Debug, Deserialize, IntoParams)]
pub struct UserListQuery {
    /// 1-based page number (default 1)
    pub page: Option<u32>,
    /// Page size, capped at 100 (default 10)
    pub page_size: Option<u32>,
    /// University-id substring filter
    pub q: Option<String>,
}

/// One row of the admin user directory. Never carries key material.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserListEntry {
    pub user_id: String,
    pub university_id: String,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
}

/// A page of the admin user directory.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserListResponse {
    pub items: Vec<UserListEntry>,
    pub page: u32,
    pub page_size: u32,
    pub total: usize,
    pub total_pages: usize,
}

// ============================================================================
// Handlers
// ============================================================================

/// Mint tokens.
///
/// Defaults to the on-chain treasury when no recipient is given. The stats
/// cache is invalidated afterwards so the next stats read sees the new
/// total supply.
#[utoipa::path(
    post,
    path = "/v1/admin/mint",
    tag = "Admin",
    request_body = MintRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Mint confirmed", body = AdminTxResponse),
        (status = 400, description = "Invalid amount or address"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required"),
        (status = 502, description = "Mint rejected by chain"),
        (status = 503, description = "Chain unavailable")
    )
)]
pub async fn mint(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
    Json(request): Json<MintRequest>,
) -> Result<Json<AdminTxResponse>, ApiError> {
    let decimals = state
        .retry
        .run(|| state.chain.decimals(), ChainError::is_transient)
        .await?;
    let units = parse_amount(&request.amount, decimals)?;
    if units.is_zero() {
        return Err(ApiError::bad_request("amount must be positive"));
    }

    let to = match &request.to {
        Some(address) => parse_address(address)?,
        None => {
            state
                .retry
                .run(|| state.chain.treasury(), ChainError::is_transient)
                .await?
        }
    };

    let operator_address = format!("{:#x}", state.operator_signer.address());
    let confirmation = {
        let _guard = state.locks.acquire(&operator_address).await;
        state
            .chain
            .mint(state.operator_signer.clone(), to, units)
            .await?
    };

    tracing::info!(
        admin = %admin.user_id,
        to = %to,
        amount = %request.amount,
        tx_hash = %confirmation.tx_hash,
        "minted tokens"
    );

    // Total supply and treasury balance both changed
    state.stats_cache.invalidate();

    let to_hex = format!("{to:#x}");
    let to_user_id = state
        .store
        .get_by_address(&to_hex)
        .ok()
        .flatten()
        .map(|c| c.user_id);
    let record = TransferRecord {
        tx_hash: confirmation.tx_hash.clone(),
        kind: TransferKind::Mint,
        from_address: format!("{:#x}", Address::ZERO),
        to_address: to_hex,
        from_user_id: None,
        to_user_id,
        amount: request.amount,
        block_number: confirmation.block_number,
        created_at: Utc::now(),
    };
    if let Err(err) = state.store.record_transfer(&record) {
        tracing::error!(tx_hash = %record.tx_hash, error = %err, "failed to log mint");
    }

    Ok(Json(AdminTxResponse {
        tx_hash: confirmation.tx_hash,
        block_number: confirmation.block_number,
    }))
}

/// Read the current treasury address from the chain.
#[utoipa::path(
    get,
    path = "/v1/admin/treasury",
    tag = "Admin",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Treasury address", body = TreasuryResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required"),
        (status = 503, description = "Chain unavailable")
    )
)]
pub async fn get_treasury(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<TreasuryResponse>, ApiError> {
    let treasury = state
        .retry
        .run(|| state.chain.treasury(), ChainError::is_transient)
        .await?;
    Ok(Json(TreasuryResponse {
        address: format!("{treasury:#x}"),
    }))
}

/// Set the treasury address.
#[utoipa::path(
    put,
    path = "/v1/admin/treasury",
    tag = "Admin",
    request_body = SetTreasuryRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Treasury updated", body = AdminTxResponse),
        (status = 400, description = "Invalid address"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required"),
        (status = 502, description = "Rejected by chain"),
        (status = 503, description = "Chain unavailable")
    )
)]
pub async fn set_treasury(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
    Json(request): Json<SetTreasuryRequest>,
) -> Result<Json<AdminTxResponse>, ApiError> {
    let new_treasury = parse_address(&request.address)?;

    let operator_address = format!("{:#x}", state.operator_signer.address());
    let confirmation = {
        let _guard = state.locks.acquire(&operator_address).await;
        state
            .chain
            .set_treasury(state.operator_signer.clone(), new_treasury)
            .await?
    };

    tracing::info!(
        admin = %admin.user_id,
        treasury = %new_treasury,
        tx_hash = %confirmation.tx_hash,
        "treasury updated"
    );

    // Stats report the treasury address and its balance
    state.stats_cache.invalidate();

    Ok(Json(AdminTxResponse {
        tx_hash: confirmation.tx_hash,
        block_number: confirmation.block_number,
    }))
}

/// Set the inactivity-penalty exemption flag for an address.
#[utoipa::path(
    post,
    path = "/v1/admin/exemptions",
    tag = "Admin",
    request_body = SetExemptionRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Exemption updated", body = AdminTxResponse),
        (status = 400, description = "Invalid address"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required"),
        (status = 502, description = "Rejected by chain"),
        (status = 503, description = "Chain unavailable")
    )
)]
pub async fn set_exemption(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
    Json(request): Json<SetExemptionRequest>,
) -> Result<Json<AdminTxResponse>, ApiError> {
    let address = parse_address(&request.address)?;

    let operator_address = format!("{:#x}", state.operator_signer.address());
    let confirmation = {
        let _guard = state.locks.acquire(&operator_address).await;
        state
            .chain
            .set_exempt_from_penalty(state.operator_signer.clone(), address, request.exempt)
            .await?
    };

    tracing::info!(
        admin = %admin.user_id,
        address = %address,
        exempt = request.exempt,
        tx_hash = %confirmation.tx_hash,
        "penalty exemption updated"
    );

    Ok(Json(AdminTxResponse {
        tx_hash: confirmation.tx_hash,
        block_number: confirmation.block_number,
    }))
}

/// Read the penalty exemption flag of an address.
#[utoipa::path(
    get,
    path = "/v1/admin/exemptions/{address}",
    tag = "Admin",
    params(("address" = String, Path, description = "EVM address to query")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Exemption state", body = ExemptionResponse),
        (status = 400, description = "Invalid address"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required"),
        (status = 503, description = "Chain unavailable")
    )
)]
pub async fn get_exemption(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<ExemptionResponse>, ApiError> {
    let parsed = parse_address(&address)?;
    let exempt = state
        .retry
        .run(
            || state.chain.is_exempt_from_penalty(parsed),
            ChainError::is_transient,
        )
        .await?;
    Ok(Json(ExemptionResponse {
        address: format!("{parsed:#x}"),
        exempt,
    }))
}

/// Page through registered users with their wallet addresses.
#[utoipa::path(
    get,
    path = "/v1/admin/users",
    tag = "Admin",
    params(UserListQuery),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "User directory page", body = UserListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn list_users(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<UserListResponse>, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let page_size = query.page_size.unwrap_or(10).clamp(1, 100);
    let offset = (page as usize - 1) * page_size as usize;
    let filter = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty());

    let (credentials, total) = state
        .store
        .list_credentials(offset, page_size as usize, filter)?;

    let items = credentials
        .into_iter()
        .map(|c| UserListEntry {
            user_id: c.user_id,
            university_id: c.university_id,
            first_name: c.first_name,
            last_name: c.last_name,
            address: c.address,
        })
        .collect();

    Ok(Json(UserListResponse {
        items,
        page,
        page_size,
        total,
        total_pages: total.div_ceil(page_size as usize),
    }))
}

/// On-chain activity snapshot of one account: balance, penalty exemption,
/// last activity, and the countdown until the inactivity penalty applies.
#[utoipa::path(
    get,
    path = "/v1/admin/users/{address}",
    tag = "Admin",
    params(("address" = String, Path, description = "EVM address to inspect")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Account activity", body = AccountActivity),
        (status = 400, description = "Invalid address"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required"),
        (status = 503, description = "Chain unavailable")
    )
)]
pub async fn user_activity(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<AccountActivity>, ApiError> {
    let parsed = parse_address(&address)?;
    let activity = state
        .retry
        .run(
            || state.chain.account_activity(parsed),
            ChainError::is_transient,
        )
        .await?;
    Ok(Json(activity))
}

/// Aggregate token statistics.
///
/// Served from a TTL cache; a mint or treasury change invalidates it, and
/// `POST /v1/admin/cache/invalidate` forces the same.
#[utoipa::path(
    get,
    path = "/v1/admin/stats",
    tag = "Admin",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Token statistics", body = TokenStats),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required"),
        (status = 503, description = "Chain unavailable")
    )
)]
pub async fn stats(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<TokenStats>, ApiError> {
    if let Some(stats) = state.stats_cache.get() {
        return Ok(Json(stats));
    }

    let stats = state
        .retry
        .run(|| state.chain.token_stats(), ChainError::is_transient)
        .await?;
    state.stats_cache.put(stats.clone());
    Ok(Json(stats))
}

/// Drop the stats and token-info caches.
///
/// Idempotent: invalidating an empty cache succeeds and repeated calls
/// behave the same as one.
#[utoipa::path(
    post,
    path = "/v1/admin/cache/invalidate",
    tag = "Admin",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Caches invalidated", body = InvalidateResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn invalidate_cache(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
) -> Json<InvalidateResponse> {
    state.stats_cache.invalidate();
    state.token_info_cache.invalidate();
    tracing::info!(admin = %admin.user_id, "caches invalidated");
    Json(InvalidateResponse {
        status: "ok".to_string(),
    })
}
