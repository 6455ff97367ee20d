// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Campus Wallet

//! Static binding for the campus token contract.
//!
//! The token contract is external and pre-deployed; this service only calls
//! the fixed method set below. The interface is bound statically with alloy's
//! `sol!` macro rather than loading an ABI description at runtime.

use alloy::{
    primitives::{Address, U256},
    sol,
};

use super::error::ChainError;

// Campus token interface: ERC-20 surface plus the administrative extensions
// (mint, treasury management, inactivity-penalty exemptions).
sol! {
    #[sol(rpc)]
    interface CampusToken {
        function name() external view returns (string);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
        function totalSupply() external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
        function mint(address to, uint256 amount) external;
        function treasury() external view returns (address);
        function setTreasury(address newTreasury) external;
        function isExemptFromPenalty(address account) external view returns (bool);
        function setExemptFromPenalty(address account, bool exempt) external;
        function lastActivity(address account) external view returns (uint256);
        function getTimeUntilPenalty(address account) external view returns (uint256);
        function INACTIVITY_PERIOD() external view returns (uint256);
        function PENALTY_RATE() external view returns (uint256);
    }
}

/// Parse a caller-supplied EVM address.
pub fn parse_address(s: &str) -> Result<Address, ChainError> {
    s.parse::<Address>()
        .map_err(|_| ChainError::InvalidAddress(format!("'{s}' is not a valid address")))
}

/// Parse a human-readable decimal amount into token base units.
///
/// # Arguments
/// * `amount` - Amount as a string (e.g., "1.5")
/// * `decimals` - Number of decimals the token uses
pub fn parse_amount(amount: &str, decimals: u8) -> Result<U256, ChainError> {
    let parts: Vec<&str> = amount.split('.').collect();

    if parts.len() > 2 || parts[0].is_empty() {
        return Err(ChainError::InvalidAmount(format!(
            "'{amount}' is not a decimal number"
        )));
    }

    let whole = parts[0]
        .parse::<u128>()
        .map_err(|_| ChainError::InvalidAmount(format!("'{amount}' has an invalid whole part")))?;

    let decimal_part = if parts.len() == 2 {
        let dec_str = parts[1];
        if dec_str.len() > decimals as usize {
            return Err(ChainError::InvalidAmount(format!(
                "too many decimal places (max {decimals})"
            )));
        }
        // Pad with zeros to match decimals
        let padded = format!("{:0<width$}", dec_str, width = decimals as usize);
        padded
            .parse::<u128>()
            .map_err(|_| ChainError::InvalidAmount(format!("'{amount}' has an invalid fraction")))?
    } else {
        0u128
    };

    let multiplier = 10u128.pow(decimals as u32);
    let total = whole
        .checked_mul(multiplier)
        .and_then(|w| w.checked_add(decimal_part))
        .ok_or_else(|| ChainError::InvalidAmount("amount overflow".to_string()))?;

    Ok(U256::from(total))
}

/// Format token base units as a human-readable decimal amount.
pub fn format_amount(amount: U256, decimals: u8) -> String {
    if amount.is_zero() {
        return "0".to_string();
    }

    let divisor = U256::from(10u64).pow(U256::from(decimals));
    let whole = amount / divisor;
    let remainder = amount % divisor;

    if remainder.is_zero() {
        whole.to_string()
    } else {
        let decimal_str = format!("{:0>width$}", remainder, width = decimals as usize);
        let trimmed = decimal_str.trim_end_matches('0');
        if trimmed.is_empty() {
            whole.to_string()
        } else {
            format!("{}.{}", whole, trimmed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_address_accepts_checksummed_and_lowercase() {
        assert!(parse_address("0x76568BEd5Acf1A5Cd888773C8cAe9ea2a9131A63").is_ok());
        assert!(parse_address("0x76568bed5acf1a5cd888773c8cae9ea2a9131a63").is_ok());
        assert!(matches!(
            parse_address("not-an-address"),
            Err(ChainError::InvalidAddress(_))
        ));
        assert!(parse_address("0x1234").is_err());
    }

    #[test]
    fn parse_amount_whole() {
        let result = parse_amount("1", 18).unwrap();
        assert_eq!(result, U256::from(1_000_000_000_000_000_000u64));
    }

    #[test]
    fn parse_amount_decimal() {
        let result = parse_amount("1.5", 18).unwrap();
        assert_eq!(result, U256::from(1_500_000_000_000_000_000u64));
    }

    #[test]
    fn parse_amount_small() {
        let result = parse_amount("0.001", 18).unwrap();
        assert_eq!(result, U256::from(1_000_000_000_000_000u64));
    }

    #[test]
    fn parse_amount_rejects_garbage() {
        assert!(parse_amount("1.2.3", 18).is_err());
        assert!(parse_amount("abc", 18).is_err());
        assert!(parse_amount(".5", 18).is_err());
    }

    #[test]
    fn parse_amount_rejects_excess_precision() {
        assert!(parse_amount("1.1234567", 6).is_err());
    }

    #[test]
    fn format_amount_round_values() {
        let one = U256::from(1_000_000_000_000_000_000u64);
        assert_eq!(format_amount(one, 18), "1");

        let one_and_half = U256::from(1_500_000_000_000_000_000u64);
        assert_eq!(format_amount(one_and_half, 18), "1.5");

        assert_eq!(format_amount(U256::ZERO, 18), "0");
    }

    #[test]
    fn parse_and_format_agree() {
        let units = parse_amount("12.25", 18).unwrap();
        assert_eq!(format_amount(units, 18), "12.25");
    }
}
