// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Campus Wallet

//! Per-address submission locks.
//!
//! Transaction ordering for one account is ultimately the chain's nonce
//! sequencing, but two concurrent submissions signed for the same address
//! can race to a nonce collision. Every submission (user transfers as well
//! as operator-signed funding, purchases, and mints) therefore holds the
//! lock for its sender address for the full sign-broadcast-confirm span.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::OwnedMutexGuard;

/// Registry of per-address async locks, keyed by lowercase address.
#[derive(Default)]
pub struct AddressLocks {
    inner: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl AddressLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the submission lock for an address, waiting if another
    /// submission for the same address is in flight.
    pub async fn acquire(&self, address: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            map.entry(address.to_lowercase()).or_default().clone()
        };
        lock.lock_owned().await
    }
}
