// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Campus Wallet

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::chain::ChainError;
use crate::storage::StoreError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<ChainError> for ApiError {
    fn from(err: ChainError) -> Self {
        let status = match &err {
            ChainError::InvalidAddress(_) | ChainError::InvalidAmount(_) => {
                StatusCode::BAD_REQUEST
            }
            ChainError::InsufficientBalance { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ChainError::NetworkTransient(_) => StatusCode::SERVICE_UNAVAILABLE,
            ChainError::Rejected(_) => StatusCode::BAD_GATEWAY,
            ChainError::ConfigurationMissing(_) | ChainError::InvalidCredential(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status.is_server_error() {
            tracing::error!(error = %err, "chain operation failed");
        }
        Self::new(status, err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(message) => Self::new(StatusCode::CONFLICT, message),
            other => {
                tracing::error!(error = %other, "storage operation failed");
                Self::internal("storage error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[test]
    fn constructors_set_status_and_message() {
        let nf = ApiError::not_found("missing");
        assert_eq!(nf.status, StatusCode::NOT_FOUND);
        assert_eq!(nf.message, "missing");

        let bad = ApiError::bad_request("bad");
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);

        let unp = ApiError::unprocessable("oops");
        assert_eq!(unp.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn chain_errors_map_to_the_documented_statuses() {
        let cases = [
            (
                ApiError::from(ChainError::InvalidAddress("x".into())),
                StatusCode::BAD_REQUEST,
            ),
            (
                ApiError::from(ChainError::InsufficientBalance {
                    balance: "1".into(),
                    required: "2".into(),
                }),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                ApiError::from(ChainError::NetworkTransient("timeout".into())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ApiError::from(ChainError::Rejected("revert".into())),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ApiError::from(ChainError::ConfigurationMissing("rpc".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.status, expected, "{}", err.message);
        }
    }

    #[test]
    fn storage_internals_are_not_echoed_to_clients() {
        let err = ApiError::from(StoreError::Serde(
            serde_json::from_str::<u32>("not json").unwrap_err(),
        ));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "storage error");
    }

    #[tokio::test]
    async fn into_response_returns_json_body() {
        let response = ApiError::bad_request("bad data").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body_bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body_bytes.to_vec()).unwrap();
        assert_eq!(body, r#"{"error":"bad data"}"#);
    }
}
