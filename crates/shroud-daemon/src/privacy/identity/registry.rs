use async_trait::async_trait;
use shroud_types::{unix_now, Commitment, Hash256, IdentityRecord, ShroudError, ShroudResult};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Commitment registry. `commitment` and `group_nullifier_hash` are each unique
/// across all records, and `put` must enforce both in one atomic step.
#[async_trait]
pub trait IdentityRegistry: Send + Sync {
    async fn put(
        &self,
        commitment: &Commitment,
        group_nullifier_hash: &Hash256,
        group_id: &str,
    ) -> ShroudResult<IdentityRecord>;

    async fn get_by_commitment(&self, commitment: &Commitment) -> ShroudResult<Option<IdentityRecord>>;

    /// Marks the identity invalid. Records are never deleted.
    async fn revoke(&self, commitment: &Commitment) -> ShroudResult<IdentityRecord>;

    async fn count(&self) -> ShroudResult<usize>;
}

#[derive(Default)]
struct RegistryState {
    records: HashMap<Commitment, IdentityRecord>,
    group_nullifiers: HashSet<Hash256>,
}

pub struct InMemoryIdentityRegistry {
    state: RwLock<RegistryState>,
    registrations: AtomicU64,
    revocations: AtomicU64,
}

impl InMemoryIdentityRegistry {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
            registrations: AtomicU64::new(0),
            revocations: AtomicU64::new(0),
        }
    }

    pub fn stats(&self) -> (u64, u64) {
        (
            self.registrations.load(Ordering::Relaxed),
            self.revocations.load(Ordering::Relaxed),
        )
    }
}

impl Default for InMemoryIdentityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityRegistry for InMemoryIdentityRegistry {
    async fn put(
        &self,
        commitment: &Commitment,
        group_nullifier_hash: &Hash256,
        group_id: &str,
    ) -> ShroudResult<IdentityRecord> {
        let mut state = self.state.write().await;

        if state.records.contains_key(commitment) || state.group_nullifiers.contains(group_nullifier_hash) {
            warn!(commitment = %commitment.short(), "Rejected duplicate identity registration");
            return Err(ShroudError::DuplicateCommitment);
        }

        let record = IdentityRecord {
            commitment: *commitment,
            group_nullifier_hash: *group_nullifier_hash,
            group_id: group_id.to_string(),
            is_valid: true,
            created_at: unix_now(),
        };

        state.group_nullifiers.insert(*group_nullifier_hash);
        state.records.insert(*commitment, record.clone());
        self.registrations.fetch_add(1, Ordering::Relaxed);

        Ok(record)
    }

    async fn get_by_commitment(&self, commitment: &Commitment) -> ShroudResult<Option<IdentityRecord>> {
        let state = self.state.read().await;
        Ok(state.records.get(commitment).cloned())
    }

    async fn revoke(&self, commitment: &Commitment) -> ShroudResult<IdentityRecord> {
        let mut state = self.state.write().await;
        let record = state
            .records
            .get_mut(commitment)
            .ok_or(ShroudError::UnknownCommitment)?;

        if record.is_valid {
            record.is_valid = false;
            self.revocations.fetch_add(1, Ordering::Relaxed);
            info!(commitment = %commitment.short(), "Identity revoked");
        }

        Ok(record.clone())
    }

    async fn count(&self) -> ShroudResult<usize> {
        Ok(self.state.read().await.records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hash(b: u8) -> Hash256 {
        Hash256::from_bytes([b; 32])
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let registry = InMemoryIdentityRegistry::new();
        let record = registry.put(&hash(1), &hash(2), "g1").await.unwrap();
        assert!(record.is_valid);
        assert_eq!(record.group_id, "g1");

        let fetched = registry.get_by_commitment(&hash(1)).await.unwrap().unwrap();
        assert_eq!(fetched.group_nullifier_hash, hash(2));
        assert!(registry.get_by_commitment(&hash(9)).await.unwrap().is_none());
        assert_eq!(registry.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_both_unique_fields_enforced() {
        let registry = InMemoryIdentityRegistry::new();
        registry.put(&hash(1), &hash(2), "g1").await.unwrap();

        let same_commitment = registry.put(&hash(1), &hash(3), "g1").await;
        assert!(matches!(same_commitment, Err(ShroudError::DuplicateCommitment)));

        let same_group_nullifier = registry.put(&hash(4), &hash(2), "g1").await;
        assert!(matches!(same_group_nullifier, Err(ShroudError::DuplicateCommitment)));

        assert_eq!(registry.count().await.unwrap(), 1);
        assert!(registry.get_by_commitment(&hash(4)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_revoke() {
        let registry = InMemoryIdentityRegistry::new();
        registry.put(&hash(1), &hash(2), "g1").await.unwrap();

        let revoked = registry.revoke(&hash(1)).await.unwrap();
        assert!(!revoked.is_valid);
        assert!(!registry.get_by_commitment(&hash(1)).await.unwrap().unwrap().is_valid);

        registry.revoke(&hash(1)).await.unwrap();
        assert_eq!(registry.stats(), (1, 1));

        assert!(matches!(registry.revoke(&hash(7)).await, Err(ShroudError::UnknownCommitment)));
    }
}
