use super::ShroudStorage;
use crate::privacy::identity::IdentityRegistry;
use async_trait::async_trait;
use shroud_types::{unix_now, Commitment, Hash256, IdentityRecord, ShroudError, ShroudResult};
use sled::transaction::{ConflictableTransactionError, TransactionError};
use sled::Transactional;
use std::sync::atomic::Ordering;
use tracing::{debug, info, warn};

fn decode_record(bytes: &[u8]) -> ShroudResult<IdentityRecord> {
    bincode::deserialize(bytes)
        .map_err(|e| ShroudError::Storage(format!("Failed to deserialize identity: {}", e)))
}

#[async_trait]
impl IdentityRegistry for ShroudStorage {
    async fn put(
        &self,
        commitment: &Commitment,
        group_nullifier_hash: &Hash256,
        group_id: &str,
    ) -> ShroudResult<IdentityRecord> {
        let record = IdentityRecord {
            commitment: *commitment,
            group_nullifier_hash: *group_nullifier_hash,
            group_id: group_id.to_string(),
            is_valid: true,
            created_at: unix_now(),
        };
        let value = bincode::serialize(&record)
            .map_err(|e| ShroudError::Storage(format!("Failed to serialize identity: {}", e)))?;

        let commitment_key = &commitment.as_bytes()[..];
        let group_key = &group_nullifier_hash.as_bytes()[..];

        let result = (&self.identities, &self.group_nullifiers).transaction(|(identities, groups)| {
            if identities.get(commitment_key)?.is_some() || groups.get(group_key)?.is_some() {
                return Err(ConflictableTransactionError::Abort(()));
            }
            identities.insert(commitment_key, value.as_slice())?;
            groups.insert(group_key, commitment_key)?;
            Ok(())
        });

        match result {
            Ok(()) => {}
            Err(TransactionError::Abort(())) => {
                self.metrics.conflicts.fetch_add(1, Ordering::Relaxed);
                warn!(commitment = %commitment.short(), "Rejected duplicate identity registration");
                return Err(ShroudError::DuplicateCommitment);
            }
            Err(TransactionError::Storage(e)) => {
                return Err(self.storage_error("Failed to store identity", e));
            }
        }

        self.metrics.record_write(value.len() + commitment_key.len());
        self.audit_committed("identities", "register", Some(&format!("commitment={}", commitment.short())));
        debug!(commitment = %commitment.short(), "Stored identity record");

        Ok(record)
    }

    async fn get_by_commitment(&self, commitment: &Commitment) -> ShroudResult<Option<IdentityRecord>> {
        let bytes = self
            .identities
            .get(commitment.as_bytes())
            .map_err(|e| self.storage_error("Failed to load identity", e))?;

        match bytes {
            Some(bytes) => {
                self.metrics.record_read(bytes.len());
                decode_record(&bytes).map(Some)
            }
            None => Ok(None),
        }
    }

    async fn revoke(&self, commitment: &Commitment) -> ShroudResult<IdentityRecord> {
        let key = &commitment.as_bytes()[..];

        let result = self.identities.transaction(|tx| {
            let bytes = tx
                .get(key)?
                .ok_or(ConflictableTransactionError::Abort(ShroudError::UnknownCommitment))?;
            let mut record = decode_record(&bytes).map_err(ConflictableTransactionError::Abort)?;
            let changed = record.is_valid;

            if changed {
                record.is_valid = false;
                let encoded = bincode::serialize(&record).map_err(|e| {
                    ConflictableTransactionError::Abort(ShroudError::Storage(format!(
                        "Failed to serialize identity: {}",
                        e
                    )))
                })?;
                tx.insert(key, encoded)?;
            }
            Ok((record, changed))
        });

        let (record, changed) = match result {
            Ok(outcome) => outcome,
            Err(TransactionError::Abort(e)) => return Err(e),
            Err(TransactionError::Storage(e)) => {
                return Err(self.storage_error("Failed to revoke identity", e));
            }
        };

        if changed {
            self.metrics.record_write(key.len());
            self.audit_committed("identities", "revoke", Some(&format!("commitment={}", commitment.short())));
            info!(commitment = %commitment.short(), "Identity revoked");
        }

        Ok(record)
    }

    async fn count(&self) -> ShroudResult<usize> {
        Ok(self.identities.len())
    }
}
