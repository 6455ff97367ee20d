// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Campus Wallet

//! Chain integration: key custody, RPC client, and transaction submission.
//!
//! - `keys` - keypair generation and signer resolution
//! - `client` - JSON-RPC client for the campus token contract
//! - `submit` - pre-flight checks and single-shot transaction submission
//! - `funding` - best-effort gas funding for new wallets
//! - `retry` - bounded backoff policy for read-only calls
//! - `locks` - per-address submission serialization

use std::future::Future;

use alloy::primitives::{Address, U256};
use alloy::signers::local::PrivateKeySigner;

pub mod client;
pub mod error;
pub mod funding;
pub mod keys;
pub mod locks;
pub mod retry;
pub mod submit;
pub mod token;

pub use client::{AccountActivity, ChainClient, TokenInfo, TokenStats};
pub use error::ChainError;
pub use funding::{FundingDispatcher, FundingOutcome};
pub use locks::AddressLocks;
pub use retry::RetryPolicy;
pub use submit::Submitter;
pub use token::{format_amount, parse_address, parse_amount};

/// A confirmed on-chain transaction: network-assigned id and inclusion block.
#[derive(Debug, Clone)]
pub struct TxConfirmation {
    pub tx_hash: String,
    pub block_number: u64,
}

/// The ledger operations the submission core needs.
///
/// `ChainClient` is the production implementation; tests substitute a fake
/// to observe (or suppress) broadcasts without a network.
pub trait TokenLedger: Send + Sync {
    /// Token decimals. Read-only, safe to retry.
    fn decimals(&self) -> impl Future<Output = Result<u8, ChainError>> + Send;

    /// Token balance of an address. Read-only, safe to retry.
    fn token_balance(
        &self,
        address: Address,
    ) -> impl Future<Output = Result<U256, ChainError>> + Send;

    /// Sign and broadcast a token transfer, waiting for one confirmation.
    /// Single attempt; never retried by callers.
    fn transfer_token(
        &self,
        signer: PrivateKeySigner,
        to: Address,
        amount: U256,
    ) -> impl Future<Output = Result<TxConfirmation, ChainError>> + Send;

    /// Sign and broadcast a native-currency transfer (gas funding), waiting
    /// for one confirmation. Single attempt; never retried by callers.
    fn send_native(
        &self,
        signer: PrivateKeySigner,
        to: Address,
        amount_wei: U256,
    ) -> impl Future<Output = Result<TxConfirmation, ChainError>> + Send;
}
