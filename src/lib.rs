// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Campus Wallet

//! Campus Wallet - Custodial Campus Token Wallet Service
//!
//! This crate provides a custodial wallet backend for a university campus
//! token: per-student EVM keypairs held server-side, gas funding for new
//! wallets, and ERC-20 transfer/mint submission against a fixed token
//! contract.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Authentication and authorization (session tokens)
//! - `chain` - Key custody, JSON-RPC client, transaction submission
//! - `storage` - Embedded database (redb): credentials and transfer log

pub mod api;
pub mod auth;
pub mod cache;
pub mod chain;
pub mod config;
pub mod error;
pub mod state;
pub mod storage;
