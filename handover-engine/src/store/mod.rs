//! Transaction storage abstraction.
//!
//! The engine treats every mutating action as an atomic compare-and-swap
//! on the stored record: load state plus version, validate against that
//! exact state, write only if the version is unchanged. Concurrent
//! mutations therefore never merge silently; the loser gets
//! [`Error::ConcurrentModification`] and must reload.
//!
//! Persistence technology is out of scope for the engine; the trait is
//! the seam a persistent backend would implement. [`InMemoryStore`] is
//! the bundled implementation, suitable for tests and single-process
//! deployments.

use async_trait::async_trait;
use dashmap::DashMap;
use handover_core::Transaction;

use crate::error::{Error, Result};

/// A stored transaction together with its write version.
#[derive(Debug, Clone)]
pub struct VersionedTransaction {
    /// The record as of the load.
    pub transaction: Transaction,

    /// Monotonic write counter, starting at 0 on insert.
    pub version: u64,
}

/// Storage seam for transaction records.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// Insert a freshly created transaction at version 0. Fails if the id
    /// already exists.
    async fn insert(&self, transaction: Transaction) -> Result<()>;

    /// Fetch a record with its current version.
    async fn fetch(&self, transaction_id: &str) -> Result<VersionedTransaction>;

    /// Replace the record if its version still equals `expected_version`.
    /// Returns the new version on success and
    /// [`Error::ConcurrentModification`] if the record moved underneath
    /// the caller.
    async fn update(
        &self,
        expected_version: u64,
        transaction: Transaction,
    ) -> Result<u64>;

    /// Ids of all transactions not yet in a terminal status. Used by the
    /// expiration sweep.
    async fn active_ids(&self) -> Result<Vec<String>>;
}

/// In-memory versioned store on a concurrent map.
#[derive(Default)]
pub struct InMemoryStore {
    records: DashMap<String, VersionedTransaction>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionStore for InMemoryStore {
    async fn insert(&self, transaction: Transaction) -> Result<()> {
        let id = transaction.transaction_id.clone();
        let entry = VersionedTransaction {
            transaction,
            version: 0,
        };
        // entry API keeps check-and-insert atomic on the shard lock
        match self.records.entry(id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(Error::Validation(format!("transaction {} already exists", id)))
            }
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(entry);
                Ok(())
            }
        }
    }

    async fn fetch(&self, transaction_id: &str) -> Result<VersionedTransaction> {
        self.records
            .get(transaction_id)
            .map(|r| r.value().clone())
            .ok_or_else(|| Error::NotFound(transaction_id.to_string()))
    }

    async fn update(
        &self,
        expected_version: u64,
        transaction: Transaction,
    ) -> Result<u64> {
        let id = transaction.transaction_id.clone();
        let mut entry = self
            .records
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound(id.clone()))?;

        if entry.version != expected_version {
            return Err(Error::ConcurrentModification(id));
        }

        entry.version += 1;
        entry.transaction = transaction;
        Ok(entry.version)
    }

    async fn active_ids(&self) -> Result<Vec<String>> {
        Ok(self
            .records
            .iter()
            .filter(|r| !r.transaction.status.is_terminal())
            .map(|r| r.key().clone())
            .collect())
    }
}
