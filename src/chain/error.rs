// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Campus Wallet

//! Error taxonomy for chain interactions.
//!
//! The kinds mirror the corrective action the caller can take: configuration
//! and credential errors need operator intervention, insufficient balance is
//! user-correctable, transient network errors may be retried (reads only),
//! and a rejection is terminal with the chain-provided reason.

/// Errors that can occur during chain operations.
///
/// Error messages must never contain private key material.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// A required chain endpoint, contract address, or operator key is not
    /// configured. Fatal for any operation that needs it.
    #[error("configuration missing: {0}")]
    ConfigurationMissing(String),

    /// Stored signing material is malformed or inconsistent with its
    /// recorded address. Fatal per-request; needs manual remediation.
    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    /// An address supplied by the caller is not a valid EVM address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// An amount string could not be parsed into token units.
    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    /// Pre-flight balance check failed; nothing was broadcast.
    #[error("insufficient balance: have {balance}, need {required}")]
    InsufficientBalance { balance: String, required: String },

    /// RPC timeout, rate limit, or transport failure. Read operations may be
    /// retried with backoff; the sign/broadcast step is never retried.
    #[error("network error: {0}")]
    NetworkTransient(String),

    /// The chain declined the transaction or call. Terminal.
    #[error("rejected by chain: {0}")]
    Rejected(String),
}

impl ChainError {
    /// Whether a retry of a read-only operation could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, ChainError::NetworkTransient(_))
    }
}

/// Classify an alloy contract-call error.
///
/// Transport-level failures are transient; anything the node understood and
/// declined (revert, ABI mismatch) is a rejection.
pub fn call_error(err: alloy::contract::Error) -> ChainError {
    match err {
        alloy::contract::Error::TransportError(e) => ChainError::NetworkTransient(e.to_string()),
        other => ChainError::Rejected(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_network_errors_are_transient() {
        assert!(ChainError::NetworkTransient("timeout".into()).is_transient());
        assert!(!ChainError::Rejected("revert".into()).is_transient());
        assert!(!ChainError::ConfigurationMissing("rpc".into()).is_transient());
        assert!(!ChainError::InsufficientBalance {
            balance: "10".into(),
            required: "15".into()
        }
        .is_transient());
    }

    #[test]
    fn insufficient_balance_message_names_both_amounts() {
        let err = ChainError::InsufficientBalance {
            balance: "10".into(),
            required: "15".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("10"));
        assert!(msg.contains("15"));
    }
}
