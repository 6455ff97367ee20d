// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Campus Wallet

//! Single-slot TTL cache.
//!
//! Caching here is an explicit object with named operations, not an
//! interior memoization detail: handlers decide when to read through and
//! admin endpoints invalidate explicitly after writes that change the
//! cached values (e.g. a mint changes total supply).

use std::sync::Mutex;
use std::time::{Duration, Instant};

/// One cached value with an expiry deadline.
pub struct TtlCache<T> {
    ttl: Duration,
    slot: Mutex<Option<(Instant, T)>>,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    /// The cached value, unless absent or past its deadline.
    pub fn get(&self) -> Option<T> {
        let slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        match slot.as_ref() {
            Some((stored_at, value)) if stored_at.elapsed() < self.ttl => Some(value.clone()),
            _ => None,
        }
    }

    /// Store a fresh value, restarting the TTL.
    pub fn put(&self, value: T) {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *slot = Some((Instant::now(), value));
    }

    /// Drop the cached value. Idempotent; a no-op on an empty cache.
    pub fn invalidate(&self) {
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        *slot = None;
    }
}
