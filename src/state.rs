// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Campus Wallet

//! Shared application state.

use std::sync::Arc;

use alloy::primitives::U256;
use alloy::signers::local::PrivateKeySigner;
use jsonwebtoken::DecodingKey;

use crate::cache::TtlCache;
use crate::chain::{keys, AddressLocks, ChainClient, ChainError, RetryPolicy, TokenInfo, TokenStats};
use crate::config::Config;
use crate::storage::WalletStore;

/// Everything handlers share. Cheap to clone; all heavy members are Arc'd.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<WalletStore>,
    pub chain: Arc<ChainClient>,
    pub locks: Arc<AddressLocks>,
    pub retry: RetryPolicy,
    pub token_info_cache: Arc<TtlCache<TokenInfo>>,
    pub stats_cache: Arc<TtlCache<TokenStats>>,
    /// Operator wallet: signs funding grants, purchases, and admin writes.
    pub operator_signer: PrivateKeySigner,
    pub funding_amount_wei: U256,
    pub purchase_cap_tokens: u64,
    pub session_decoding_key: Arc<DecodingKey>,
}

impl AppState {
    /// Build state from loaded configuration and an opened store.
    ///
    /// Fails fast on a malformed operator key or an empty endpoint list;
    /// neither is recoverable at request time.
    pub fn new(config: &Config, store: WalletStore) -> Result<Self, ChainError> {
        let chain = ChainClient::new(
            config.rpc_urls.clone(),
            config.token_contract_address,
            config.rpc_timeout,
            config.confirm_timeout,
        )?;
        let operator_signer = keys::resolve_signer(&config.operator_private_key)?;

        Ok(Self {
            store: Arc::new(store),
            chain: Arc::new(chain),
            locks: Arc::new(AddressLocks::new()),
            retry: RetryPolicy::new(config.retry_max_attempts, config.retry_base_delay),
            token_info_cache: Arc::new(TtlCache::new(config.token_info_cache_ttl)),
            stats_cache: Arc::new(TtlCache::new(config.stats_cache_ttl)),
            operator_signer,
            funding_amount_wei: config.funding_amount_wei,
            purchase_cap_tokens: config.purchase_cap_tokens,
            session_decoding_key: Arc::new(DecodingKey::from_secret(
                config.session_jwt_secret.as_bytes(),
            )),
        })
    }
}

#[cfg(test)]
impl AppState {
    /// State wired to a temp database and an unreachable RPC endpoint, for
    /// handler and extractor tests that never touch the chain.
    pub fn for_tests(session_secret: &str) -> (Self, tempfile::TempDir) {
        use std::time::Duration;

        let dir = tempfile::tempdir().unwrap();
        let store = WalletStore::open(&dir.path().join("test.redb")).unwrap();
        let chain = ChainClient::new(
            vec!["http://127.0.0.1:1".parse().unwrap()],
            alloy::primitives::Address::ZERO,
            Duration::from_millis(50),
            Duration::from_millis(50),
        )
        .unwrap();

        let state = Self {
            store: Arc::new(store),
            chain: Arc::new(chain),
            locks: Arc::new(AddressLocks::new()),
            retry: RetryPolicy::new(1, Duration::from_millis(1)),
            token_info_cache: Arc::new(TtlCache::new(Duration::from_secs(60))),
            stats_cache: Arc::new(TtlCache::new(Duration::from_secs(60))),
            operator_signer: PrivateKeySigner::random(),
            funding_amount_wei: U256::ZERO,
            purchase_cap_tokens: 300,
            session_decoding_key: Arc::new(DecodingKey::from_secret(session_secret.as_bytes())),
        };
        (state, dir)
    }
}
