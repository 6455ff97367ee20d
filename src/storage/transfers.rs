// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Campus Wallet

//! Append-only transfer log.
//!
//! A record is written only after the network accepts the transaction, so
//! there is no pending state and no update path. The composite index keys
//! transfers by participant address with an inverted timestamp, giving
//! newest-first range scans without sorting.

use redb::ReadableDatabase;

use super::db::{StoreResult, WalletStore, TRANSFERS, TRANSFER_INDEX};
use super::records::TransferRecord;

/// Build a composite key for the transfer_index table.
///
/// Format: `lowercase_address | inverted_timestamp_be_bytes | tx_hash`
///
/// The inverted timestamp ensures newest-first ordering when scanning forward.
fn make_index_key(address: &str, timestamp: i64, tx_hash: &str) -> Vec<u8> {
    let addr = address.to_lowercase();
    let mut key = Vec::with_capacity(addr.len() + 1 + 8 + 1 + tx_hash.len());
    key.extend_from_slice(addr.as_bytes());
    key.push(b'|');
    key.extend_from_slice(&(!timestamp as u64).to_be_bytes());
    key.push(b'|');
    key.extend_from_slice(tx_hash.as_bytes());
    key
}

/// Build a prefix key for range scanning all transfers of an address.
fn make_prefix(address: &str) -> Vec<u8> {
    let addr = address.to_lowercase();
    let mut prefix = Vec::with_capacity(addr.len() + 1);
    prefix.extend_from_slice(addr.as_bytes());
    prefix.push(b'|');
    prefix
}

/// Upper bound for a range scan (prefix with 0xFF bytes appended).
fn make_prefix_end(address: &str) -> Vec<u8> {
    let mut end = make_prefix(address);
    end.extend_from_slice(&[0xFF; 20]);
    end
}

impl WalletStore {
    /// Append a confirmed transfer and index it for both participants.
    pub fn record_transfer(&self, record: &TransferRecord) -> StoreResult<()> {
        let json = serde_json::to_vec(record)?;
        let timestamp = record.created_at.timestamp();

        let write_txn = self.db.begin_write()?;
        {
            let mut transfers = write_txn.open_table(TRANSFERS)?;
            transfers.insert(record.tx_hash.as_str(), json.as_slice())?;

            let mut index = write_txn.open_table(TRANSFER_INDEX)?;
            let sent_key = make_index_key(&record.from_address, timestamp, &record.tx_hash);
            index.insert(sent_key.as_slice(), "sent")?;
            let received_key = make_index_key(&record.to_address, timestamp, &record.tx_hash);
            index.insert(received_key.as_slice(), "received")?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Transfers involving an address, newest first, with the direction
    /// ("sent"|"received") seen from that address.
    pub fn transfers_for_address(
        &self,
        address: &str,
        limit: usize,
    ) -> StoreResult<Vec<(TransferRecord, String)>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(TRANSFER_INDEX)?;
        let transfers = read_txn.open_table(TRANSFERS)?;

        let prefix = make_prefix(address);
        let prefix_end = make_prefix_end(address);

        let mut results = Vec::new();
        for entry in index.range(prefix.as_slice()..prefix_end.as_slice())? {
            let entry = entry?;
            let key_bytes = entry.0.value().to_vec();
            let direction = entry.1.value().to_string();

            if let Some(tx_hash) = extract_tx_hash_from_key(&key_bytes) {
                if let Some(value) = transfers.get(tx_hash.as_str())? {
                    let record: TransferRecord = serde_json::from_slice(value.value())?;
                    results.push((record, direction));
                }
            }

            if results.len() >= limit {
                break;
            }
        }
        Ok(results)
    }
}

/// Extract the tx_hash portion from a composite index key.
///
/// Key format: `address|timestamp_bytes|tx_hash`
fn extract_tx_hash_from_key(key: &[u8]) -> Option<String> {
    let mut pipe_count = 0;
    for (i, &b) in key.iter().enumerate() {
        if b == b'|' {
            pipe_count += 1;
            if pipe_count == 2 {
                return String::from_utf8(key[i + 1..].to_vec()).ok();
            }
        }
    }
    None
}
