use super::ShroudStorage;
use crate::privacy::nullifier::{entry_matches, NullifierLedger};
use async_trait::async_trait;
use shroud_types::{unix_now, LedgerEntry, NullifierHash, ShroudError, ShroudResult};
use std::sync::atomic::Ordering;
use tracing::debug;

impl ShroudStorage {
    fn load_entry(&self, hash: &NullifierHash) -> ShroudResult<Option<LedgerEntry>> {
        let bytes = self
            .nullifiers
            .get(hash.as_bytes())
            .map_err(|e| self.storage_error("Failed to load nullifier", e))?;

        match bytes {
            Some(bytes) => {
                self.metrics.record_read(bytes.len());
                let entry = bincode::deserialize(&bytes)
                    .map_err(|e| ShroudError::Storage(format!("Failed to deserialize nullifier: {}", e)))?;
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl NullifierLedger for ShroudStorage {
    async fn exists_for(&self, hash: &NullifierHash, action: &str, topic: &str) -> ShroudResult<bool> {
        Ok(self
            .load_entry(hash)?
            .is_some_and(|entry| entry_matches(&entry, action, topic)))
    }

    async fn insert(&self, hash: &NullifierHash, action: &str, topic: &str) -> ShroudResult<LedgerEntry> {
        let entry = LedgerEntry {
            nullifier_hash: *hash,
            action: action.to_string(),
            topic: topic.to_string(),
            created_at: unix_now(),
        };
        let value = bincode::serialize(&entry)
            .map_err(|e| ShroudError::Storage(format!("Failed to serialize nullifier: {}", e)))?;
        let size = value.len();

        let swapped = self
            .nullifiers
            .compare_and_swap(hash.as_bytes(), None::<&[u8]>, Some(value))
            .map_err(|e| self.storage_error("Failed to record nullifier", e))?;

        if swapped.is_err() {
            self.metrics.conflicts.fetch_add(1, Ordering::Relaxed);
            debug!(nullifier = %hash.short(), "Nullifier insert lost the race");
            return Err(ShroudError::DuplicateNullifier);
        }

        self.metrics.record_write(size);
        self.audit_committed(
            "nullifiers",
            "record",
            Some(&format!("nullifier={} action={} topic={}", hash.short(), action, topic)),
        );

        Ok(entry)
    }

    async fn get(&self, hash: &NullifierHash) -> ShroudResult<Option<LedgerEntry>> {
        self.load_entry(hash)
    }

    async fn count(&self) -> ShroudResult<usize> {
        Ok(self.nullifiers.len())
    }
}
