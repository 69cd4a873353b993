use async_trait::async_trait;
use shroud_types::{unix_now, LedgerEntry, NullifierHash, ShroudError, ShroudResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

/// Append-only set of spent action nullifiers.
///
/// `insert` is the commit point for proof issuance: for a given hash exactly
/// one concurrent caller succeeds and every other receives
/// [`ShroudError::DuplicateNullifier`]. Entries are never updated or removed.
#[async_trait]
pub trait NullifierLedger: Send + Sync {
    async fn exists_for(&self, hash: &NullifierHash, action: &str, topic: &str) -> ShroudResult<bool>;

    async fn insert(&self, hash: &NullifierHash, action: &str, topic: &str) -> ShroudResult<LedgerEntry>;

    async fn get(&self, hash: &NullifierHash) -> ShroudResult<Option<LedgerEntry>>;

    async fn count(&self) -> ShroudResult<usize>;
}

pub(crate) fn entry_matches(entry: &LedgerEntry, action: &str, topic: &str) -> bool {
    entry.action == action && entry.topic == topic
}

pub struct InMemoryNullifierLedger {
    entries: RwLock<HashMap<NullifierHash, LedgerEntry>>,
    rejected: AtomicU64,
}

impl InMemoryNullifierLedger {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            rejected: AtomicU64::new(0),
        }
    }

    pub fn rejected_inserts(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }
}

impl Default for InMemoryNullifierLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NullifierLedger for InMemoryNullifierLedger {
    async fn exists_for(&self, hash: &NullifierHash, action: &str, topic: &str) -> ShroudResult<bool> {
        let entries = self.entries.read().await;
        Ok(entries.get(hash).is_some_and(|e| entry_matches(e, action, topic)))
    }

    async fn insert(&self, hash: &NullifierHash, action: &str, topic: &str) -> ShroudResult<LedgerEntry> {
        let mut entries = self.entries.write().await;

        if entries.contains_key(hash) {
            self.rejected.fetch_add(1, Ordering::Relaxed);
            debug!(nullifier = %hash.short(), "Nullifier insert lost the race");
            return Err(ShroudError::DuplicateNullifier);
        }

        let entry = LedgerEntry {
            nullifier_hash: *hash,
            action: action.to_string(),
            topic: topic.to_string(),
            created_at: unix_now(),
        };
        entries.insert(*hash, entry.clone());

        Ok(entry)
    }

    async fn get(&self, hash: &NullifierHash) -> ShroudResult<Option<LedgerEntry>> {
        Ok(self.entries.read().await.get(hash).cloned())
    }

    async fn count(&self) -> ShroudResult<usize> {
        Ok(self.entries.read().await.len())
    }
}
