// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Campus Wallet

//! JSON-RPC client for the campus token contract.
//!
//! Reads run against a list of redundant endpoints with first-success
//! failover (quorum = 1) and a bounded per-call timeout. Writes are signed
//! and broadcast against the primary endpoint in a single attempt and wait
//! for one confirmation; retrying a write is always an explicit caller
//! decision, never done here.

use std::future::Future;
use std::time::Duration;

use alloy::{
    network::{Ethereum, EthereumWallet},
    primitives::{Address, U256},
    providers::{
        fillers::{
            BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller,
            WalletFiller,
        },
        Identity, PendingTransactionBuilder, Provider, ProviderBuilder, RootProvider,
    },
    rpc::types::TransactionRequest,
    signers::local::PrivateKeySigner,
};
use serde::{Deserialize, Serialize};
use url::Url;
use utoipa::ToSchema;

use super::error::{call_error, ChainError};
use super::token::{format_amount, CampusToken};
use super::{TokenLedger, TxConfirmation};

/// HTTP provider type for read-only calls (with all fillers).
type HttpProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider<Ethereum>,
>;

/// Provider type with signing capability (wallet filler on top).
type SignerProvider = FillProvider<
    JoinFill<
        JoinFill<
            Identity,
            JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
        >,
        WalletFiller<EthereumWallet>,
    >,
    RootProvider<Ethereum>,
>;

/// Token metadata, stable for the life of the contract.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenInfo {
    /// Token contract address
    pub address: String,
    /// Token name
    pub name: String,
    /// Token symbol
    pub symbol: String,
    /// Token decimals
    pub decimals: u8,
}

/// Aggregate token statistics for the admin dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenStats {
    /// Total token supply, human-readable
    pub total_supply: String,
    /// Current treasury address
    pub treasury_address: String,
    /// Treasury token balance, human-readable
    pub treasury_balance: String,
    /// Inactivity period before the penalty applies, in days
    pub inactivity_period_days: String,
    /// Penalty rate in percent
    pub penalty_rate: String,
}

/// Per-account activity snapshot for the admin user directory.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccountActivity {
    pub address: String,
    /// Token balance, human-readable
    pub balance: String,
    /// Whether the account is exempt from the inactivity penalty
    pub is_exempt: bool,
    /// Last on-chain activity; absent when the account was never active
    pub last_activity: Option<chrono::DateTime<chrono::Utc>>,
    /// Time left until the inactivity penalty applies, in days
    pub time_until_penalty_days: String,
}

/// Client for the campus token contract and the underlying ledger node.
pub struct ChainClient {
    endpoints: Vec<Url>,
    providers: Vec<HttpProvider>,
    token_address: Address,
    rpc_timeout: Duration,
    confirm_timeout: Duration,
}

impl ChainClient {
    /// Create a client for the given RPC endpoints and token contract.
    ///
    /// The first endpoint is the primary (used for broadcasts); later ones
    /// are read fallbacks.
    pub fn new(
        endpoints: Vec<Url>,
        token_address: Address,
        rpc_timeout: Duration,
        confirm_timeout: Duration,
    ) -> Result<Self, ChainError> {
        if endpoints.is_empty() {
            return Err(ChainError::ConfigurationMissing(
                "at least one chain RPC endpoint is required".to_string(),
            ));
        }

        let providers = endpoints
            .iter()
            .map(|url| ProviderBuilder::new().connect_http(url.clone()))
            .collect();

        Ok(Self {
            endpoints,
            providers,
            token_address,
            rpc_timeout,
            confirm_timeout,
        })
    }

    /// Token contract address.
    pub fn token_address(&self) -> Address {
        self.token_address
    }

    // =========================================================================
    // Reads (failover across endpoints, bounded timeout per call)
    // =========================================================================

    /// Run a read against each endpoint in turn, returning the first
    /// successful response. A stalled endpoint is cut off by the RPC timeout
    /// rather than blocking the caller.
    async fn read<T, F, Fut>(&self, op: &'static str, make_call: F) -> Result<T, ChainError>
    where
        F: Fn(HttpProvider) -> Fut,
        Fut: Future<Output = Result<T, ChainError>>,
    {
        let mut last_err: Option<ChainError> = None;
        for (endpoint, provider) in self.providers.iter().enumerate() {
            match tokio::time::timeout(self.rpc_timeout, make_call(provider.clone())).await {
                Ok(Ok(value)) => return Ok(value),
                Ok(Err(err)) => {
                    tracing::debug!(op, endpoint, error = %err, "chain read failed");
                    last_err = Some(err);
                }
                Err(_) => {
                    tracing::debug!(op, endpoint, "chain read timed out");
                    last_err = Some(ChainError::NetworkTransient(format!(
                        "{op}: rpc call timed out"
                    )));
                }
            }
        }
        Err(last_err.unwrap_or_else(|| {
            ChainError::ConfigurationMissing("no chain RPC endpoints configured".to_string())
        }))
    }

    pub async fn token_name(&self) -> Result<String, ChainError> {
        let token = self.token_address;
        self.read("name", move |p| async move {
            CampusToken::new(token, p).name().call().await.map_err(call_error)
        })
        .await
    }

    pub async fn token_symbol(&self) -> Result<String, ChainError> {
        let token = self.token_address;
        self.read("symbol", move |p| async move {
            CampusToken::new(token, p).symbol().call().await.map_err(call_error)
        })
        .await
    }

    pub async fn decimals(&self) -> Result<u8, ChainError> {
        let token = self.token_address;
        self.read("decimals", move |p| async move {
            CampusToken::new(token, p).decimals().call().await.map_err(call_error)
        })
        .await
    }

    pub async fn total_supply(&self) -> Result<U256, ChainError> {
        let token = self.token_address;
        self.read("totalSupply", move |p| async move {
            CampusToken::new(token, p).totalSupply().call().await.map_err(call_error)
        })
        .await
    }

    pub async fn token_balance(&self, address: Address) -> Result<U256, ChainError> {
        let token = self.token_address;
        self.read("balanceOf", move |p| async move {
            CampusToken::new(token, p)
                .balanceOf(address)
                .call()
                .await
                .map_err(call_error)
        })
        .await
    }

    /// Native gas-currency balance of an address, in wei.
    pub async fn native_balance(&self, address: Address) -> Result<U256, ChainError> {
        self.read("getBalance", move |p| async move {
            p.get_balance(address)
                .await
                .map_err(|e| ChainError::NetworkTransient(e.to_string()))
        })
        .await
    }

    pub async fn treasury(&self) -> Result<Address, ChainError> {
        let token = self.token_address;
        self.read("treasury", move |p| async move {
            CampusToken::new(token, p).treasury().call().await.map_err(call_error)
        })
        .await
    }

    pub async fn is_exempt_from_penalty(&self, address: Address) -> Result<bool, ChainError> {
        let token = self.token_address;
        self.read("isExemptFromPenalty", move |p| async move {
            CampusToken::new(token, p)
                .isExemptFromPenalty(address)
                .call()
                .await
                .map_err(call_error)
        })
        .await
    }

    /// Token metadata (name, symbol, decimals). Callers cache this with a
    /// long TTL; the contract's metadata never changes.
    pub async fn token_info(&self) -> Result<TokenInfo, ChainError> {
        let name = self.token_name().await?;
        let symbol = self.token_symbol().await?;
        let decimals = self.decimals().await?;
        Ok(TokenInfo {
            address: format!("{:#x}", self.token_address),
            name,
            symbol,
            decimals,
        })
    }

    /// Aggregate statistics (supply, treasury balance, penalty parameters).
    /// Callers cache this with a short TTL and invalidate after a mint.
    pub async fn token_stats(&self) -> Result<TokenStats, ChainError> {
        let token = self.token_address;

        let decimals = self.decimals().await?;
        let total_supply = self.total_supply().await?;
        let treasury = self.treasury().await?;
        let treasury_balance = self.token_balance(treasury).await?;

        let inactivity_period = self
            .read("INACTIVITY_PERIOD", move |p| async move {
                CampusToken::new(token, p)
                    .INACTIVITY_PERIOD()
                    .call()
                    .await
                    .map_err(call_error)
            })
            .await?;
        let penalty_rate = self
            .read("PENALTY_RATE", move |p| async move {
                CampusToken::new(token, p)
                    .PENALTY_RATE()
                    .call()
                    .await
                    .map_err(call_error)
            })
            .await?;

        Ok(TokenStats {
            total_supply: format_amount(total_supply, decimals),
            treasury_address: format!("{treasury:#x}"),
            treasury_balance: format_amount(treasury_balance, decimals),
            inactivity_period_days: format_period_days(inactivity_period),
            penalty_rate: penalty_rate.to_string(),
        })
    }

    /// Activity snapshot of one account: balance, exemption flag, last
    /// activity timestamp, and the countdown to the inactivity penalty.
    pub async fn account_activity(&self, address: Address) -> Result<AccountActivity, ChainError> {
        let token = self.token_address;

        let decimals = self.decimals().await?;
        let balance = self.token_balance(address).await?;
        let is_exempt = self.is_exempt_from_penalty(address).await?;

        let last_activity = self
            .read("lastActivity", move |p| async move {
                CampusToken::new(token, p)
                    .lastActivity(address)
                    .call()
                    .await
                    .map_err(call_error)
            })
            .await?;
        let until_penalty = self
            .read("getTimeUntilPenalty", move |p| async move {
                CampusToken::new(token, p)
                    .getTimeUntilPenalty(address)
                    .call()
                    .await
                    .map_err(call_error)
            })
            .await?;

        Ok(AccountActivity {
            address: format!("{address:#x}"),
            balance: format_amount(balance, decimals),
            is_exempt,
            last_activity: activity_timestamp(last_activity),
            time_until_penalty_days: format_period_days(until_penalty),
        })
    }

    // =========================================================================
    // Writes (single attempt against the primary endpoint)
    // =========================================================================

    /// Build a provider that signs with the given key. Signing and
    /// submission share this one provider, so a signature can never be
    /// detached and replayed against a different transaction.
    fn signer_provider(&self, signer: PrivateKeySigner) -> SignerProvider {
        let wallet = EthereumWallet::from(signer);
        ProviderBuilder::new()
            .wallet(wallet)
            .connect_http(self.endpoints[0].clone())
    }

    /// Wait for one confirmation of a broadcast transaction.
    async fn confirm(
        &self,
        pending: PendingTransactionBuilder<Ethereum>,
    ) -> Result<TxConfirmation, ChainError> {
        let tx_hash = format!("{:?}", pending.tx_hash());

        let receipt = tokio::time::timeout(self.confirm_timeout, pending.get_receipt())
            .await
            .map_err(|_| {
                ChainError::NetworkTransient(format!(
                    "confirmation wait for {tx_hash} timed out"
                ))
            })?
            .map_err(|e| {
                ChainError::NetworkTransient(format!("confirmation wait for {tx_hash} failed: {e}"))
            })?;

        if !receipt.status() {
            return Err(ChainError::Rejected(format!("transaction {tx_hash} reverted")));
        }

        Ok(TxConfirmation {
            tx_hash,
            block_number: receipt.block_number.unwrap_or(0),
        })
    }

    /// Sign and broadcast a token transfer, then wait for one confirmation.
    pub async fn transfer_token(
        &self,
        signer: PrivateKeySigner,
        to: Address,
        amount: U256,
    ) -> Result<TxConfirmation, ChainError> {
        let provider = self.signer_provider(signer);
        let contract = CampusToken::new(self.token_address, provider);

        let pending = contract.transfer(to, amount).send().await.map_err(call_error)?;
        self.confirm(pending).await
    }

    /// Sign and broadcast a native transfer (gas funding).
    pub async fn send_native(
        &self,
        signer: PrivateKeySigner,
        to: Address,
        amount_wei: U256,
    ) -> Result<TxConfirmation, ChainError> {
        let provider = self.signer_provider(signer);
        let tx = TransactionRequest::default().to(to).value(amount_wei);

        let pending = provider
            .send_transaction(tx)
            .await
            .map_err(|e| ChainError::Rejected(format!("broadcast failed: {e}")))?;
        self.confirm(pending).await
    }

    /// Mint tokens to an address (privileged; operator-signed).
    pub async fn mint(
        &self,
        signer: PrivateKeySigner,
        to: Address,
        amount: U256,
    ) -> Result<TxConfirmation, ChainError> {
        let provider = self.signer_provider(signer);
        let contract = CampusToken::new(self.token_address, provider);

        let pending = contract.mint(to, amount).send().await.map_err(call_error)?;
        self.confirm(pending).await
    }

    /// Set the treasury address (privileged; operator-signed).
    pub async fn set_treasury(
        &self,
        signer: PrivateKeySigner,
        new_treasury: Address,
    ) -> Result<TxConfirmation, ChainError> {
        let provider = self.signer_provider(signer);
        let contract = CampusToken::new(self.token_address, provider);

        let pending = contract
            .setTreasury(new_treasury)
            .send()
            .await
            .map_err(call_error)?;
        self.confirm(pending).await
    }

    /// Set the inactivity-penalty exemption flag for an address
    /// (privileged; operator-signed).
    pub async fn set_exempt_from_penalty(
        &self,
        signer: PrivateKeySigner,
        address: Address,
        exempt: bool,
    ) -> Result<TxConfirmation, ChainError> {
        let provider = self.signer_provider(signer);
        let contract = CampusToken::new(self.token_address, provider);

        let pending = contract
            .setExemptFromPenalty(address, exempt)
            .send()
            .await
            .map_err(call_error)?;
        self.confirm(pending).await
    }
}

impl TokenLedger for ChainClient {
    async fn decimals(&self) -> Result<u8, ChainError> {
        ChainClient::decimals(self).await
    }

    async fn token_balance(&self, address: Address) -> Result<U256, ChainError> {
        ChainClient::token_balance(self, address).await
    }

    async fn transfer_token(
        &self,
        signer: PrivateKeySigner,
        to: Address,
        amount: U256,
    ) -> Result<TxConfirmation, ChainError> {
        ChainClient::transfer_token(self, signer, to, amount).await
    }

    async fn send_native(
        &self,
        signer: PrivateKeySigner,
        to: Address,
        amount_wei: U256,
    ) -> Result<TxConfirmation, ChainError> {
        ChainClient::send_native(self, signer, to, amount_wei).await
    }
}

/// Format a seconds value as days with one decimal place.
fn format_period_days(seconds: U256) -> String {
    let secs: u128 = seconds.try_into().unwrap_or(u128::MAX);
    format!("{:.1}", secs as f64 / 86_400.0)
}

/// A unix-seconds activity value from the contract; zero means never active.
fn activity_timestamp(seconds: U256) -> Option<chrono::DateTime<chrono::Utc>> {
    i64::try_from(seconds)
        .ok()
        .filter(|&secs| secs > 0)
        .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
}
