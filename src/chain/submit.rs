// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Campus Wallet

//! Token transfer submission with pre-flight checks.
//!
//! Every submission follows the same shape: resolve the stored signer,
//! verify it still matches the stored address, take the per-address lock,
//! check the balance (reads retried with backoff), then sign and broadcast
//! exactly once. If the pre-flight check fails, nothing reaches the chain.

use alloy::primitives::{Address, U256};
use alloy::signers::local::PrivateKeySigner;

use super::error::ChainError;
use super::keys;
use super::locks::AddressLocks;
use super::retry::RetryPolicy;
use super::token::format_amount;
use super::{TokenLedger, TxConfirmation};

/// Coordinates pre-flight checks, locking, and the single broadcast attempt.
pub struct Submitter<'a, L: TokenLedger> {
    ledger: &'a L,
    locks: &'a AddressLocks,
    retry: RetryPolicy,
}

impl<'a, L: TokenLedger> Submitter<'a, L> {
    pub fn new(ledger: &'a L, locks: &'a AddressLocks, retry: RetryPolicy) -> Self {
        Self {
            ledger,
            locks,
            retry,
        }
    }

    /// Submit a token transfer signed by the stored key for `sender_address`.
    ///
    /// Fails without broadcasting if the key is malformed, the key and
    /// address disagree, or the sender's balance does not cover `amount`.
    /// The broadcast itself is a single attempt; a transient error after
    /// broadcast surfaces as-is and is never retried here.
    pub async fn transfer(
        &self,
        sender_address: &str,
        sender_key_hex: &str,
        to: Address,
        amount: U256,
    ) -> Result<TxConfirmation, ChainError> {
        let signer = keys::resolve_signer(sender_key_hex)?;
        if !keys::signer_matches_address(&signer, sender_address) {
            return Err(ChainError::InvalidCredential(
                "stored key does not match stored address".to_string(),
            ));
        }
        self.transfer_with_signer(signer, to, amount).await
    }

    /// Submit a token transfer with an already-resolved signer (operator
    /// paths: purchases). Same pre-flight and locking discipline.
    pub async fn transfer_with_signer(
        &self,
        signer: PrivateKeySigner,
        to: Address,
        amount: U256,
    ) -> Result<TxConfirmation, ChainError> {
        let sender = signer.address();

        // Held across balance check and broadcast: a concurrent submission
        // from the same address must observe the post-transfer balance.
        let _guard = self.locks.acquire(&format!("{sender:#x}")).await;
        let balance = self
            .retry
            .run(|| self.ledger.token_balance(sender), ChainError::is_transient)
            .await?;

        if balance < amount {
            let decimals = self
                .retry
                .run(|| self.ledger.decimals(), ChainError::is_transient)
                .await?;
            return Err(ChainError::InsufficientBalance {
                balance: format_amount(balance, decimals),
                required: format_amount(amount, decimals),
            });
        }

        let confirmation = self.ledger.transfer_token(signer, to, amount).await?;
        tracing::info!(
            from = %sender,
            to = %to,
            tx_hash = %confirmation.tx_hash,
            block = confirmation.block_number,
            "token transfer confirmed"
        );
        Ok(confirmation)
    }
}
