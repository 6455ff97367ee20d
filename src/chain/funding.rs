// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Campus Wallet

//! Best-effort gas funding for freshly provisioned wallets.
//!
//! A new wallet holds no native currency and cannot pay gas for its first
//! token transfer, so provisioning sends it a small fixed grant from the
//! operator wallet. Funding failure never fails provisioning: the wallet is
//! still created and the outcome is reported so the caller can surface it.

use alloy::primitives::{Address, U256};
use alloy::signers::local::PrivateKeySigner;

use super::locks::AddressLocks;
use super::TokenLedger;

/// Result of a funding attempt. Never an `Err`: funding is advisory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FundingOutcome {
    /// The grant was broadcast and confirmed.
    Funded { tx_hash: String },
    /// Funding is disabled (grant amount configured as zero).
    Skipped,
    /// The grant could not be delivered; the wallet exists regardless.
    Failed { reason: String },
}

/// Dispatches the fixed native-currency grant to new wallets.
pub struct FundingDispatcher<'a, L: TokenLedger> {
    ledger: &'a L,
    locks: &'a AddressLocks,
    amount_wei: U256,
}

impl<'a, L: TokenLedger> FundingDispatcher<'a, L> {
    pub fn new(ledger: &'a L, locks: &'a AddressLocks, amount_wei: U256) -> Self {
        Self {
            ledger,
            locks,
            amount_wei,
        }
    }

    /// Send the configured grant from the operator wallet to `to`.
    ///
    /// Holds the operator's submission lock for the full broadcast so funding
    /// cannot race other operator-signed transactions to a nonce collision.
    /// Single attempt; a failed broadcast is reported, not retried.
    pub async fn fund(&self, operator: PrivateKeySigner, to: Address) -> FundingOutcome {
        if self.amount_wei.is_zero() {
            return FundingOutcome::Skipped;
        }

        let operator_address = format!("{:#x}", operator.address());
        let _guard = self.locks.acquire(&operator_address).await;

        match self.ledger.send_native(operator, to, self.amount_wei).await {
            Ok(confirmation) => {
                tracing::info!(
                    to = %to,
                    tx_hash = %confirmation.tx_hash,
                    "funded new wallet"
                );
                FundingOutcome::Funded {
                    tx_hash: confirmation.tx_hash,
                }
            }
            Err(err) => {
                tracing::warn!(to = %to, error = %err, "wallet funding failed");
                FundingOutcome::Failed {
                    reason: err.to_string(),
                }
            }
        }
    }
}
