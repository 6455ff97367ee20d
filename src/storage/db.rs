// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Campus Wallet

//! Embedded wallet database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `credentials`: user_id → serialized Credential
//! - `university_index`: university_id → user_id
//! - `address_index`: lowercase address → user_id
//! - `transfers`: tx_hash → serialized TransferRecord
//! - `transfer_index`: composite key (address|!timestamp|tx_hash) → direction

use std::path::Path;

use redb::{Database, TableDefinition};

/// Primary table: user_id → serialized Credential (JSON bytes).
pub(super) const CREDENTIALS: TableDefinition<&str, &[u8]> = TableDefinition::new("credentials");

/// Index: university_id → user_id.
pub(super) const UNIVERSITY_INDEX: TableDefinition<&str, &str> =
    TableDefinition::new("university_index");

/// Index: lowercase on-chain address → user_id.
pub(super) const ADDRESS_INDEX: TableDefinition<&str, &str> = TableDefinition::new("address_index");

/// Append-only log: tx_hash → serialized TransferRecord (JSON bytes).
pub(super) const TRANSFERS: TableDefinition<&str, &[u8]> = TableDefinition::new("transfers");

/// Index: composite key → direction ("sent"|"received").
/// Key format: `address|!timestamp_be|tx_hash` for newest-first range scans.
pub(super) const TRANSFER_INDEX: TableDefinition<&[u8], &str> =
    TableDefinition::new("transfer_index");

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("conflict: {0}")]
    Conflict(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Embedded ACID wallet database. Cheap to share behind an `Arc`; redb
/// serializes writers internally.
pub struct WalletStore {
    pub(super) db: Database,
}

impl WalletStore {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(CREDENTIALS)?;
            let _ = write_txn.open_table(UNIVERSITY_INDEX)?;
            let _ = write_txn.open_table(ADDRESS_INDEX)?;
            let _ = write_txn.open_table(TRANSFERS)?;
            let _ = write_txn.open_table(TRANSFER_INDEX)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }
}
