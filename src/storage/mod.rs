// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Campus Wallet

//! Persistence: embedded redb database holding credentials and the
//! append-only transfer log.
//!
//! - `db` - database handle, table layout, error type
//! - `records` - serialized row types
//! - `credentials` - create-once credential store with reverse indexes
//! - `transfers` - append-only confirmed-transfer log

pub mod credentials;
pub mod db;
pub mod records;
pub mod transfers;

pub use db::{StoreError, StoreResult, WalletStore};
pub use records::{Credential, NewCredential, TransferKind, TransferRecord};
