// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Campus Wallet

//! Token movement endpoints: transfers, purchases, and history.

use axum::{extract::State, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use alloy::primitives::U256;

use crate::{
    auth::Auth,
    chain::{parse_address, parse_amount, ChainError, Submitter, TxConfirmation},
    error::ApiError,
    state::AppState,
    storage::{TransferKind, TransferRecord},
};

/// History page size.
const HISTORY_LIMIT: usize = 50;

/// Request body for POST /v1/transfers.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TransferRequest {
    /// Recipient's university id
    pub to_university_id: String,
    /// Token amount, human-readable decimal string (e.g. "12.5")
    pub amount: String,
}

/// Request body for POST /v1/purchases.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PurchaseRequest {
    /// Token amount to buy, human-readable decimal string
    pub amount: String,
}

/// A confirmed submission.
#[derive(Debug, Serialize, ToSchema)]
pub struct TransferResponse {
    pub tx_hash: String,
    pub block_number: u64,
    pub from_address: String,
    pub to_address: String,
    pub amount: String,
}

/// Transfer tokens from the caller's wallet to another student.
///
/// The amount is checked against the sender's on-chain balance before
/// anything is signed; an insufficient balance never reaches the network.
#[utoipa::path(
    post,
    path = "/v1/transfers",
    tag = "Transfers",
    request_body = TransferRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Transfer confirmed", body = TransferResponse),
        (status = 400, description = "Invalid amount or self-transfer"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Sender or recipient has no wallet"),
        (status = 422, description = "Insufficient balance"),
        (status = 503, description = "Chain unavailable")
    )
)]
pub async fn create_transfer(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(request): Json<TransferRequest>,
) -> Result<Json<TransferResponse>, ApiError> {
    if request.to_university_id == user.university_id {
        return Err(ApiError::bad_request("cannot transfer to yourself"));
    }

    let sender = super::require_wallet(&state, &user.user_id)?;
    let recipient = state
        .store
        .get_by_university_id(&request.to_university_id)?
        .ok_or_else(|| ApiError::not_found("recipient has no wallet"))?;

    let decimals = state
        .retry
        .run(|| state.chain.decimals(), ChainError::is_transient)
        .await?;
    let units = parse_amount(&request.amount, decimals)?;
    if units.is_zero() {
        return Err(ApiError::bad_request("amount must be positive"));
    }

    let to = parse_address(&recipient.address)?;
    let submitter = Submitter::new(state.chain.as_ref(), &state.locks, state.retry);
    let confirmation = submitter
        .transfer(&sender.address, &sender.private_key_hex, to, units)
        .await?;

    record_confirmed(
        &state,
        &confirmation,
        TransferKind::Transfer,
        &sender.address,
        &recipient.address,
        Some(sender.user_id.clone()),
        Some(recipient.user_id.clone()),
        &request.amount,
    );

    Ok(Json(TransferResponse {
        tx_hash: confirmation.tx_hash,
        block_number: confirmation.block_number,
        from_address: sender.address,
        to_address: recipient.address,
        amount: request.amount,
    }))
}

/// Buy tokens from the operator wallet.
///
/// Capped per purchase; the operator's balance is pre-checked the same way
/// a student transfer is.
#[utoipa::path(
    post,
    path = "/v1/purchases",
    tag = "Transfers",
    request_body = PurchaseRequest,
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Purchase confirmed", body = TransferResponse),
        (status = 400, description = "Invalid amount"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Buyer has no wallet"),
        (status = 422, description = "Cap exceeded or operator balance insufficient"),
        (status = 503, description = "Chain unavailable")
    )
)]
pub async fn create_purchase(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(request): Json<PurchaseRequest>,
) -> Result<Json<TransferResponse>, ApiError> {
    let buyer = super::require_wallet(&state, &user.user_id)?;

    let decimals = state
        .retry
        .run(|| state.chain.decimals(), ChainError::is_transient)
        .await?;
    let units = parse_amount(&request.amount, decimals)?;
    if units.is_zero() {
        return Err(ApiError::bad_request("amount must be positive"));
    }
    if units > cap_units(state.purchase_cap_tokens, decimals) {
        return Err(ApiError::unprocessable(format!(
            "purchase exceeds the cap of {} tokens",
            state.purchase_cap_tokens
        )));
    }

    let to = parse_address(&buyer.address)?;
    let operator_address = format!("{:#x}", state.operator_signer.address());
    let submitter = Submitter::new(state.chain.as_ref(), &state.locks, state.retry);
    let confirmation = submitter
        .transfer_with_signer(state.operator_signer.clone(), to, units)
        .await?;

    record_confirmed(
        &state,
        &confirmation,
        TransferKind::Purchase,
        &operator_address,
        &buyer.address,
        None,
        Some(buyer.user_id.clone()),
        &request.amount,
    );

    Ok(Json(TransferResponse {
        tx_hash: confirmation.tx_hash,
        block_number: confirmation.block_number,
        from_address: operator_address,
        to_address: buyer.address,
        amount: request.amount,
    }))
}

/// One entry of the caller's transfer history.
#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryEntry {
    pub tx_hash: String,
    pub kind: TransferKind,
    /// "sent" or "received", seen from the caller's wallet
    pub direction: String,
    pub counterparty_address: String,
    pub amount: String,
    pub block_number: u64,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// The caller's confirmed transfers, newest first.
#[utoipa::path(
    get,
    path = "/v1/transfers",
    tag = "Transfers",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Transfer history", body = [HistoryEntry]),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Wallet not provisioned")
    )
)]
pub async fn list_transfers(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<HistoryEntry>>, ApiError> {
    let credential = super::require_wallet(&state, &user.user_id)?;

    let rows = state
        .store
        .transfers_for_address(&credential.address, HISTORY_LIMIT)?;
    let own = credential.address.to_lowercase();

    let entries = rows
        .into_iter()
        .map(|(record, direction)| {
            let counterparty = if record.from_address.to_lowercase() == own {
                record.to_address.clone()
            } else {
                record.from_address.clone()
            };
            HistoryEntry {
                tx_hash: record.tx_hash,
                kind: record.kind,
                direction,
                counterparty_address: counterparty,
                amount: record.amount,
                block_number: record.block_number,
                created_at: record.created_at,
            }
        })
        .collect();

    Ok(Json(entries))
}

/// Cap in base units for the configured whole-token purchase limit.
fn cap_units(cap_tokens: u64, decimals: u8) -> U256 {
    U256::from(cap_tokens) * U256::from(10u64).pow(U256::from(decimals))
}

/// Append a confirmed submission to the transfer log.
///
/// The tokens have already moved, so a logging failure is reported but
/// never turns the response into an error.
#[allow(clippy::too_many_arguments)]
fn record_confirmed(
    state: &AppState,
    confirmation: &TxConfirmation,
    kind: TransferKind,
    from_address: &str,
    to_address: &str,
    from_user_id: Option<String>,
    to_user_id: Option<String>,
    amount: &str,
) {
    let record = TransferRecord {
        tx_hash: confirmation.tx_hash.clone(),
        kind,
        from_address: from_address.to_string(),
        to_address: to_address.to_string(),
        from_user_id,
        to_user_id,
        amount: amount.to_string(),
        block_number: confirmation.block_number,
        created_at: Utc::now(),
    };
    if let Err(err) = state.store.record_transfer(&record) {
        tracing::error!(tx_hash = %record.tx_hash, error = %err, "failed to log confirmed transfer");
    }
}
