// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Campus Wallet

//! Directory lookup: resolve a university id to a name and wallet address.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{auth::Auth, error::ApiError, state::AppState};

/// Public directory entry. Exposes name and address only; email and
/// anything custodial stay private.
#[derive(Debug, Serialize, ToSchema)]
pub struct DirectoryEntry {
    pub university_id: String,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
}

/// Resolve a university id to a student's name and wallet address.
///
/// Used by clients to confirm a transfer recipient before submitting.
#[utoipa::path(
    get,
    path = "/v1/users/{university_id}",
    tag = "Directory",
    params(("university_id" = String, Path, description = "University-issued id")),
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Directory entry", body = DirectoryEntry),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No wallet for that university id")
    )
)]
pub async fn lookup_user(
    Auth(_user): Auth,
    State(state): State<AppState>,
    Path(university_id): Path<String>,
) -> Result<Json<DirectoryEntry>, ApiError> {
    let credential = state
        .store
        .get_by_university_id(&university_id)?
        .ok_or_else(|| ApiError::not_found("no wallet registered for that university id"))?;

    Ok(Json(DirectoryEntry {
        university_id: credential.university_id,
        first_name: credential.first_name,
        last_name: credential.last_name,
        address: credential.address,
    }))
}
