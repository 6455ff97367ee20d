// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Campus Wallet

//! Credential store: one custodial keypair per user, created exactly once.
//!
//! `create_if_absent` is the only write path. It runs check-then-insert
//! inside a single redb write transaction, and redb admits one writer at a
//! time, so two racing provisioning calls cannot both insert: the loser
//! observes the winner's row and returns it unchanged.

use chrono::Utc;
use redb::{ReadableDatabase, ReadableTable};

use super::db::{StoreError, StoreResult, WalletStore, ADDRESS_INDEX, CREDENTIALS, UNIVERSITY_INDEX};
use super::records::{Credential, NewCredential};

impl WalletStore {
    /// Create a credential for a user, or return the existing one.
    ///
    /// `address` and `private_key_hex` are a freshly generated keypair; if
    /// the user already has a credential the fresh keypair is discarded and
    /// the stored row wins. Returns the credential and whether it was
    /// freshly created.
    pub fn create_if_absent(
        &self,
        new: NewCredential,
        address: &str,
        private_key_hex: &str,
    ) -> StoreResult<(Credential, bool)> {
        let write_txn = self.db.begin_write()?;
        let created = {
            let mut credentials = write_txn.open_table(CREDENTIALS)?;

            let existing = credentials
                .get(new.user_id.as_str())?
                .map(|v| v.value().to_vec());
            if let Some(bytes) = existing {
                let credential: Credential = serde_json::from_slice(&bytes)?;
                return Ok((credential, false));
            }

            let mut university_index = write_txn.open_table(UNIVERSITY_INDEX)?;
            let claimed_by = university_index
                .get(new.university_id.as_str())?
                .map(|v| v.value().to_string());
            if let Some(other) = claimed_by {
                if other != new.user_id {
                    return Err(StoreError::Conflict(format!(
                        "university id {} is already registered",
                        new.university_id
                    )));
                }
            }

            let credential = Credential {
                user_id: new.user_id,
                university_id: new.university_id,
                first_name: new.first_name,
                last_name: new.last_name,
                email: new.email,
                address: address.to_string(),
                private_key_hex: private_key_hex.to_string(),
                created_at: Utc::now(),
            };

            let json = serde_json::to_vec(&credential)?;
            credentials.insert(credential.user_id.as_str(), json.as_slice())?;
            university_index
                .insert(credential.university_id.as_str(), credential.user_id.as_str())?;

            let mut address_index = write_txn.open_table(ADDRESS_INDEX)?;
            address_index.insert(
                credential.address.to_lowercase().as_str(),
                credential.user_id.as_str(),
            )?;

            credential
        };
        write_txn.commit()?;
        Ok((created, true))
    }

    /// Look up a credential by its owner's user id.
    pub fn get_by_user_id(&self, user_id: &str) -> StoreResult<Option<Credential>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CREDENTIALS)?;
        match table.get(user_id)? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Look up a credential by university id (directory lookup).
    pub fn get_by_university_id(&self, university_id: &str) -> StoreResult<Option<Credential>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(UNIVERSITY_INDEX)?;
        let user_id = match index.get(university_id)? {
            Some(v) => v.value().to_string(),
            None => return Ok(None),
        };
        let table = read_txn.open_table(CREDENTIALS)?;
        match table.get(user_id.as_str())? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }

    /// Page through all credentials in user-id order, optionally filtering
    /// by a university-id substring.
    ///
    /// Returns the requested page and the total number of matches, so the
    /// caller can report page counts.
    pub fn list_credentials(
        &self,
        offset: usize,
        limit: usize,
        university_id_filter: Option<&str>,
    ) -> StoreResult<(Vec<Credential>, usize)> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(CREDENTIALS)?;

        let mut total = 0usize;
        let mut page = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let credential: Credential = serde_json::from_slice(value.value())?;
            if let Some(q) = university_id_filter {
                if !credential.university_id.contains(q) {
                    continue;
                }
            }
            if total >= offset && page.len() < limit {
                page.push(credential);
            }
            total += 1;
        }
        Ok((page, total))
    }

    /// Look up a credential by on-chain address (case-insensitive).
    pub fn get_by_address(&self, address: &str) -> StoreResult<Option<Credential>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(ADDRESS_INDEX)?;
        let user_id = match index.get(address.to_lowercase().as_str())? {
            Some(v) => v.value().to_string(),
            None => return Ok(None),
        };
        let table = read_txn.open_table(CREDENTIALS)?;
        match table.get(user_id.as_str())? {
            Some(value) => Ok(Some(serde_json::from_slice(value.value())?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::keys::generate_keypair;

    fn temp_store() -> (WalletStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = WalletStore::open(&dir.path().join("test.redb")).unwrap();
        (store, dir)
    }

    fn new_credential(user_id: &str, university_id: &str) -> NewCredential {
        NewCredential {
            user_id: user_id.to_string(),
            university_id: university_id.to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: Some("ada@campus.example".to_string()),
        }
    }

    #[test]
    fn create_then_lookup_by_every_index() {
        let (store, _dir) = temp_store();
        let (address, key) = generate_keypair();

        let (credential, created) = store
            .create_if_absent(new_credential("user-1", "20251234"), &address, &key)
            .unwrap();
        assert!(created);
        assert_eq!(credential.address, address);

        let by_user = store.get_by_user_id("user-1").unwrap().unwrap();
        assert_eq!(by_user.address, address);

        let by_university = store.get_by_university_id("20251234").unwrap().unwrap();
        assert_eq!(by_university.user_id, "user-1");

        // Address lookup ignores case
        let by_address = store
            .get_by_address(&address.to_uppercase().replace("0X", "0x"))
            .unwrap()
            .unwrap();
        assert_eq!(by_address.user_id, "user-1");
    }

    #[test]
    fn second_create_returns_the_existing_row() {
        let (store, _dir) = temp_store();
        let (address_a, key_a) = generate_keypair();
        let (address_b, key_b) = generate_keypair();

        let (first, created_first) = store
            .create_if_absent(new_credential("user-1", "20251234"), &address_a, &key_a)
            .unwrap();
        assert!(created_first);

        // Second call arrives with a different fresh keypair; it must lose.
        let (second, created_second) = store
            .create_if_absent(new_credential("user-1", "20251234"), &address_b, &key_b)
            .unwrap();
        assert!(!created_second);
        assert_eq!(second.address, first.address);
        assert_eq!(second.private_key_hex, first.private_key_hex);
    }

    #[test]
    fn concurrent_provisioning_creates_exactly_one_credential() {
        let (store, _dir) = temp_store();

        let fresh_count = std::thread::scope(|scope| {
            let mut handles = Vec::new();
            for _ in 0..8 {
                let store = &store;
                handles.push(scope.spawn(move || {
                    let (address, key) = generate_keypair();
                    let (credential, created) = store
                        .create_if_absent(new_credential("user-1", "20251234"), &address, &key)
                        .unwrap();
                    (credential.address, created)
                }));
            }
            let results: Vec<(String, bool)> =
                handles.into_iter().map(|h| h.join().unwrap()).collect();

            // Every racer must observe the same winning address.
            let winner = results[0].0.clone();
            assert!(results.iter().all(|(address, _)| *address == winner));
            results.iter().filter(|(_, created)| *created).count()
        });

        assert_eq!(fresh_count, 1, "exactly one racer creates the credential");
    }

    #[test]
    fn university_id_cannot_be_claimed_twice() {
        let (store, _dir) = temp_store();
        let (address_a, key_a) = generate_keypair();
        let (address_b, key_b) = generate_keypair();

        store
            .create_if_absent(new_credential("user-1", "20251234"), &address_a, &key_a)
            .unwrap();

        let err = store
            .create_if_absent(new_credential("user-2", "20251234"), &address_b, &key_b)
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert!(store.get_by_user_id("user-2").unwrap().is_none());
    }

    #[test]
    fn listing_pages_in_user_id_order() {
        let (store, _dir) = temp_store();
        for i in 0..5 {
            let (address, key) = generate_keypair();
            store
                .create_if_absent(
                    new_credential(&format!("user-{i}"), &format!("2025000{i}")),
                    &address,
                    &key,
                )
                .unwrap();
        }

        let (first_page, total) = store.list_credentials(0, 2, None).unwrap();
        assert_eq!(total, 5);
        assert_eq!(first_page.len(), 2);
        assert_eq!(first_page[0].user_id, "user-0");

        let (last_page, total) = store.list_credentials(4, 2, None).unwrap();
        assert_eq!(total, 5);
        assert_eq!(last_page.len(), 1);
        assert_eq!(last_page[0].user_id, "user-4");
    }

    #[test]
    fn listing_filters_by_university_id_substring() {
        let (store, _dir) = temp_store();
        for (user, university) in [("user-1", "20251234"), ("user-2", "20259999")] {
            let (address, key) = generate_keypair();
            store
                .create_if_absent(new_credential(user, university), &address, &key)
                .unwrap();
        }

        let (matches, total) = store.list_credentials(0, 10, Some("1234")).unwrap();
        assert_eq!(total, 1);
        assert_eq!(matches[0].university_id, "20251234");

        let (none, total) = store.list_credentials(0, 10, Some("0000")).unwrap();
        assert_eq!(total, 0);
        assert!(none.is_empty());
    }

    #[test]
    fn unknown_lookups_return_none() {
        let (store, _dir) = temp_store();
        assert!(store.get_by_user_id("nobody").unwrap().is_none());
        assert!(store.get_by_university_id("00000000").unwrap().is_none());
        assert!(store.get_by_address("0xdead").unwrap().is_none());
    }
}
