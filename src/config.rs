// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Campus Wallet

//! Runtime configuration, loaded once from the environment at startup.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `RPC_URLS` | Comma-separated chain RPC endpoints (first is primary) | Required |
//! | `TOKEN_CONTRACT_ADDRESS` | Campus token contract address | Required |
//! | `OPERATOR_PRIVATE_KEY` | Operator wallet key (funding, purchases, admin) | Required |
//! | `SESSION_JWT_SECRET` | HS256 secret shared with the identity frontend | Required |
//! | `DATA_DIR` | Directory for the embedded database | `./data` |
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `FUNDING_AMOUNT_WEI` | Native grant for new wallets (0 disables) | `2000000000000000` |
//! | `PURCHASE_CAP_TOKENS` | Max whole tokens per purchase | `300` |
//! | `RPC_TIMEOUT_SECS` | Per-call RPC timeout | `10` |
//! | `CONFIRM_TIMEOUT_SECS` | Confirmation wait timeout | `60` |
//! | `RETRY_MAX_ATTEMPTS` | Read retry attempts (including the first) | `3` |
//! | `RETRY_BASE_DELAY_MS` | Backoff before the second attempt | `500` |
//! | `STATS_CACHE_TTL_SECS` | Admin stats cache TTL | `300` |
//! | `TOKEN_INFO_CACHE_TTL_SECS` | Token metadata cache TTL | `1800` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::path::PathBuf;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use url::Url;

/// Default native grant: 0.002 of the gas currency, in wei.
const DEFAULT_FUNDING_AMOUNT_WEI: &str = "2000000000000000";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// All runtime configuration. Holds the operator key and session secret,
/// so it deliberately implements neither `Debug` nor `Clone`.
pub struct Config {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    pub rpc_urls: Vec<Url>,
    pub token_contract_address: Address,
    pub operator_private_key: String,
    pub session_jwt_secret: String,
    pub funding_amount_wei: U256,
    pub purchase_cap_tokens: u64,
    pub rpc_timeout: Duration,
    pub confirm_timeout: Duration,
    pub retry_max_attempts: u32,
    pub retry_base_delay: Duration,
    pub stats_cache_ttl: Duration,
    pub token_info_cache_ttl: Duration,
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through a lookup function (tests pass a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let rpc_urls = required(&lookup, "RPC_URLS")?
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<Url>().map_err(|e| ConfigError::Invalid {
                    name: "RPC_URLS",
                    reason: format!("'{s}': {e}"),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        if rpc_urls.is_empty() {
            return Err(ConfigError::Invalid {
                name: "RPC_URLS",
                reason: "no endpoints given".to_string(),
            });
        }

        let token_contract_address = required(&lookup, "TOKEN_CONTRACT_ADDRESS")?
            .parse::<Address>()
            .map_err(|e| ConfigError::Invalid {
                name: "TOKEN_CONTRACT_ADDRESS",
                reason: e.to_string(),
            })?;

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 8080)?,
            data_dir: PathBuf::from(lookup("DATA_DIR").unwrap_or_else(|| "./data".to_string())),
            rpc_urls,
            token_contract_address,
            operator_private_key: required(&lookup, "OPERATOR_PRIVATE_KEY")?,
            session_jwt_secret: required(&lookup, "SESSION_JWT_SECRET")?,
            funding_amount_wei: parse_u256(&lookup, "FUNDING_AMOUNT_WEI", DEFAULT_FUNDING_AMOUNT_WEI)?,
            purchase_cap_tokens: parse_or(&lookup, "PURCHASE_CAP_TOKENS", 300)?,
            rpc_timeout: Duration::from_secs(parse_or(&lookup, "RPC_TIMEOUT_SECS", 10)?),
            confirm_timeout: Duration::from_secs(parse_or(&lookup, "CONFIRM_TIMEOUT_SECS", 60)?),
            retry_max_attempts: parse_or(&lookup, "RETRY_MAX_ATTEMPTS", 3)?,
            retry_base_delay: Duration::from_millis(parse_or(&lookup, "RETRY_BASE_DELAY_MS", 500)?),
            stats_cache_ttl: Duration::from_secs(parse_or(&lookup, "STATS_CACHE_TTL_SECS", 300)?),
            token_info_cache_ttl: Duration::from_secs(parse_or(
                &lookup,
                "TOKEN_INFO_CACHE_TTL_SECS",
                1800,
            )?),
        })
    }

    /// Database file path inside the data directory.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("wallet.redb")
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, name: &'static str) -> Result<String, ConfigError> {
    match lookup(name) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(name)),
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn parse_u256(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: &str,
) -> Result<U256, ConfigError> {
    let raw = lookup(name).unwrap_or_else(|| default.to_string());
    U256::from_str_radix(raw.trim(), 10).map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("RPC_URLS", "https://rpc.example.org"),
            (
                "TOKEN_CONTRACT_ADDRESS",
                "0x76568BEd5Acf1A5Cd888773C8cAe9ea2a9131A63",
            ),
            ("OPERATOR_PRIVATE_KEY", "0xabc"),
            ("SESSION_JWT_SECRET", "secret"),
        ])
    }

    fn load(env: &HashMap<&str, &str>) -> Result<Config, ConfigError> {
        Config::from_lookup(|name| env.get(name).map(|v| v.to_string()))
    }

    #[test]
    fn minimal_environment_uses_defaults() {
        let config = load(&base_env()).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.purchase_cap_tokens, 300);
        assert_eq!(config.rpc_timeout, Duration::from_secs(10));
        assert_eq!(
            config.funding_amount_wei,
            U256::from(2_000_000_000_000_000u64)
        );
        assert_eq!(config.db_path(), PathBuf::from("./data/wallet.redb"));
    }

    #[test]
    fn missing_required_variable_is_named_in_the_error() {
        let mut env = base_env();
        env.remove("SESSION_JWT_SECRET");
        // Config has no Debug (it holds secrets), so unwrap_err is unavailable
        let err = load(&env).err().expect("missing secret must fail");
        assert!(err.to_string().contains("SESSION_JWT_SECRET"));
    }

    #[test]
    fn rpc_urls_are_split_on_commas() {
        let mut env = base_env();
        env.insert(
            "RPC_URLS",
            "https://rpc-a.example.org, https://rpc-b.example.org",
        );
        let config = load(&env).unwrap();
        assert_eq!(config.rpc_urls.len(), 2);
    }

    #[test]
    fn malformed_values_are_rejected() {
        let mut env = base_env();
        env.insert("TOKEN_CONTRACT_ADDRESS", "not-an-address");
        assert!(matches!(
            load(&env),
            Err(ConfigError::Invalid {
                name: "TOKEN_CONTRACT_ADDRESS",
                ..
            })
        ));

        let mut env = base_env();
        env.insert("PORT", "eighty");
        assert!(load(&env).is_err());
    }

    #[test]
    fn funding_can_be_disabled_with_zero() {
        let mut env = base_env();
        env.insert("FUNDING_AMOUNT_WEI", "0");
        let config = load(&env).unwrap();
        assert!(config.funding_amount_wei.is_zero());
    }
}
