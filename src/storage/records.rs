// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Campus Wallet

//! Persistent record types.
//!
//! Rows are stored as JSON bytes inside redb. `Credential` carries raw
//! signing material and redacts it from `Debug` output so a stray
//! `tracing::debug!(?credential)` can never leak a key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A custodial wallet credential: one per user, immutable after creation.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credential {
    /// Identity-provider subject; the primary key.
    pub user_id: String,
    /// University-issued student/staff id; unique, used for directory lookup.
    pub university_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    /// Derived on-chain address, 0x-prefixed lowercase-insensitive hex.
    pub address: String,
    /// Raw secp256k1 key, 0x-prefixed hex. Custodial trust boundary.
    pub private_key_hex: String,
    pub created_at: DateTime<Utc>,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("user_id", &self.user_id)
            .field("university_id", &self.university_id)
            .field("address", &self.address)
            .field("private_key_hex", &"<redacted>")
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Input for credential creation, before a keypair exists.
#[derive(Debug, Clone)]
pub struct NewCredential {
    pub user_id: String,
    pub university_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
}

/// What kind of submission produced a transfer record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransferKind {
    /// Student-to-student token transfer.
    Transfer,
    /// Operator-sold tokens (top-up purchase).
    Purchase,
    /// Administrative mint.
    Mint,
}

/// One confirmed on-chain submission, appended after network acceptance.
///
/// Records are immutable: there is no pending state to update, because a
/// record only exists once the transaction is confirmed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRecord {
    /// Network-assigned transaction hash; the primary key.
    pub tx_hash: String,
    pub kind: TransferKind,
    pub from_address: String,
    pub to_address: String,
    /// Sender's user id, when the sender is a custodial user.
    pub from_user_id: Option<String>,
    /// Recipient's user id, when the recipient is a custodial user.
    pub to_user_id: Option<String>,
    /// Token amount, human-readable decimal string.
    pub amount: String,
    pub block_number: u64,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_never_contains_the_private_key() {
        let credential = Credential {
            user_id: "user-1".to_string(),
            university_id: "20251234".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: None,
            address: "0x1111111111111111111111111111111111111111".to_string(),
            private_key_hex: format!("0x{}", "ab".repeat(32)),
            created_at: Utc::now(),
        };

        let debug = format!("{credential:?}");
        assert!(!debug.contains("abab"), "key material leaked: {debug}");
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn transfer_kind_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&TransferKind::Purchase).unwrap(),
            "\"purchase\""
        );
    }
}
