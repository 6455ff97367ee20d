// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Campus Wallet

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    error::ApiError,
    state::AppState,
    storage::records::Credential,
};

pub mod admin;
pub mod balance;
pub mod health;
pub mod token;
pub mod transfers;
pub mod users;
pub mod wallet;

/// The caller's credential, or 404 if they never provisioned a wallet.
pub(crate) fn require_wallet(state: &AppState, user_id: &str) -> Result<Credential, ApiError> {
    state
        .store
        .get_by_user_id(user_id)?
        .ok_or_else(|| ApiError::not_found("wallet not provisioned"))
}

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route(
            "/wallet",
            post(wallet::provision_wallet).get(wallet::get_wallet),
        )
        .route("/balance/{address}", get(balance::get_balance))
        .route("/token/info", get(token::token_info))
        .route("/users/{university_id}", get(users::lookup_user))
        .route(
            "/transfers",
            post(transfers::create_transfer).get(transfers::list_transfers),
        )
        .route("/purchases", post(transfers::create_purchase))
        .route("/admin/mint", post(admin::mint))
        .route(
            "/admin/treasury",
            get(admin::get_treasury).put(admin::set_treasury),
        )
        .route("/admin/exemptions", post(admin::set_exemption))
        .route("/admin/exemptions/{address}", get(admin::get_exemption))
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/{address}", get(admin::user_activity))
        .route("/admin/stats", get(admin::stats))
        .route("/admin/cache/invalidate", post(admin::invalidate_cache))
        .with_state(state);

    Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .nest("/v1", v1_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        health::readiness,
        wallet::provision_wallet,
        wallet::get_wallet,
        balance::get_balance,
        token::token_info,
        users::lookup_user,
        transfers::create_transfer,
        transfers::create_purchase,
        transfers::list_transfers,
        admin::mint,
        admin::get_treasury,
        admin::set_treasury,
        admin::set_exemption,
        admin::get_exemption,
        admin::list_users,
        admin::user_activity,
        admin::stats,
        admin::invalidate_cache
    ),
    components(
        schemas(
            health::ReadyResponse,
            health::HealthResponse,
            wallet::ProvisionResponse,
            wallet::FundingStatus,
            wallet::WalletResponse,
            balance::BalanceResponse,
            users::DirectoryEntry,
            transfers::TransferRequest,
            transfers::PurchaseRequest,
            transfers::TransferResponse,
            transfers::HistoryEntry,
            admin::MintRequest,
            admin::AdminTxResponse,
            admin::TreasuryResponse,
            admin::SetTreasuryRequest,
            admin::SetExemptionRequest,
            admin::ExemptionResponse,
            admin::InvalidateResponse,
            admin::UserListEntry,
            admin::UserListResponse,
            crate::chain::AccountActivity,
            crate::chain::TokenInfo,
            crate::chain::TokenStats,
            crate::storage::TransferKind
        )
    ),
    tags(
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Wallet", description = "Custodial wallet provisioning and balances"),
        (name = "Token", description = "Campus token metadata"),
        (name = "Directory", description = "University id lookup"),
        (name = "Transfers", description = "Transfers, purchases, and history"),
        (name = "Admin", description = "Token administration")
    )
)]
struct ApiDoc;
