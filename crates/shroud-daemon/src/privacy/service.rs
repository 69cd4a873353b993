use super::identity::{CommitmentScheme, IdentityRegistry, InMemoryIdentityRegistry};
use super::nullifier::{InMemoryNullifierLedger, NullifierLedger};
use super::proof::{ProofIssuer, ProofVerifier, VerificationOutcome, VerificationPolicy};
use crate::config::{ShroudConfig, DEFAULT_MAX_ISSUE_ATTEMPTS};
use crate::notary::{Notarizer, NotaryRecord, NotaryStatsSnapshot};
use crate::storage::ShroudStorage;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shroud_crypto::{EncryptedContent, OsRandom, RandomFieldSource};
use shroud_types::{
    unix_now, Commitment, IdentityBundle, IdentityRecord, ProofArtifact, ProofCredentials,
    ShroudError, ShroudResult, SymmetricKey,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Everything the service needs, constructed by the caller.
pub struct ServiceComponents {
    pub registry: Arc<dyn IdentityRegistry>,
    pub ledger: Arc<dyn NullifierLedger>,
    pub random: Arc<dyn RandomFieldSource>,
    pub proof_key: SymmetricKey,
    pub policy: VerificationPolicy,
    pub notarizer: Arc<Notarizer>,
    pub max_issue_attempts: u32,
}

#[derive(Default)]
struct ServiceCounters {
    identities_issued: AtomicU64,
    issue_collisions: AtomicU64,
    proofs_issued: AtomicU64,
    replays_rejected: AtomicU64,
    revocations: AtomicU64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStats {
    pub identities_issued: u64,
    pub issue_collisions: u64,
    pub proofs_issued: u64,
    pub replays_rejected: u64,
    pub revocations: u64,
    pub verifications_passed: u64,
    pub verifications_failed: u64,
    pub registered_identities: usize,
    pub recorded_nullifiers: usize,
    pub notary: NotaryStatsSnapshot,
}

/// Issuance, verification, revocation and content sealing behind one handle.
pub struct ShroudService {
    scheme: CommitmentScheme,
    issuer: ProofIssuer,
    verifier: ProofVerifier,
    registry: Arc<dyn IdentityRegistry>,
    ledger: Arc<dyn NullifierLedger>,
    notarizer: Arc<Notarizer>,
    max_issue_attempts: u32,
    counters: ServiceCounters,
}

impl ShroudService {
    pub fn new(components: ServiceComponents) -> Self {
        let proof_key = Arc::new(components.proof_key);

        Self {
            scheme: CommitmentScheme::new(components.random, components.registry.clone()),
            issuer: ProofIssuer::new(components.ledger.clone(), proof_key.clone()),
            verifier: ProofVerifier::new(
                components.ledger.clone(),
                components.registry.clone(),
                proof_key,
                components.policy,
            ),
            registry: components.registry,
            ledger: components.ledger,
            notarizer: components.notarizer,
            max_issue_attempts: components.max_issue_attempts.max(1),
            counters: ServiceCounters::default(),
        }
    }

    /// Durable service over sled with the proof key persisted alongside.
    pub fn from_storage(storage: Arc<ShroudStorage>, config: &ShroudConfig) -> ShroudResult<Self> {
        let proof_key = storage.load_or_create_proof_key()?;
        let notarizer = Notarizer::from_config(&config.notary)?;

        Ok(Self::new(ServiceComponents {
            registry: storage.clone(),
            ledger: storage,
            random: Arc::new(OsRandom),
            proof_key,
            policy: VerificationPolicy::from(&config.proof),
            notarizer: Arc::new(notarizer),
            max_issue_attempts: config.identity.max_issue_attempts,
        }))
    }

    /// Volatile service with in-memory registry and ledger.
    pub fn in_memory(proof_key: SymmetricKey) -> Self {
        Self::new(ServiceComponents {
            registry: Arc::new(InMemoryIdentityRegistry::new()),
            ledger: Arc::new(InMemoryNullifierLedger::new()),
            random: Arc::new(OsRandom),
            proof_key,
            policy: VerificationPolicy::default(),
            notarizer: Arc::new(Notarizer::disabled()),
            max_issue_attempts: DEFAULT_MAX_ISSUE_ATTEMPTS,
        })
    }

    pub async fn issue_identity(&self, group_id: &str) -> ShroudResult<IdentityBundle> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.scheme.issue(group_id).await {
                Ok(bundle) => {
                    self.counters.identities_issued.fetch_add(1, Ordering::Relaxed);
                    info!(commitment = %bundle.commitment.short(), group_id, "Identity issued");
                    self.notarizer.dispatch(NotaryRecord::IdentityRegistered {
                        commitment: bundle.commitment,
                        group_id: bundle.group_id.clone(),
                        created_at: unix_now(),
                    });
                    return Ok(bundle);
                }
                Err(ShroudError::DuplicateCommitment) if attempt < self.max_issue_attempts => {
                    self.counters.issue_collisions.fetch_add(1, Ordering::Relaxed);
                    warn!(attempt, "Commitment collision, retrying with fresh secrets");
                }
                Err(e) => {
                    if matches!(e, ShroudError::DuplicateCommitment) {
                        self.counters.issue_collisions.fetch_add(1, Ordering::Relaxed);
                        error!(attempts = attempt, "Identity issuance exhausted retries");
                    }
                    return Err(e);
                }
            }
        }
    }

    pub async fn issue_proof(
        &self,
        credentials: &ProofCredentials,
        action: &str,
        topic: &str,
    ) -> ShroudResult<ProofArtifact> {
        match self.issuer.issue(credentials, action, topic).await {
            Ok(artifact) => {
                self.counters.proofs_issued.fetch_add(1, Ordering::Relaxed);
                if let Ok(nullifier_hash) = shroud_types::Hash256::from_hex(&artifact.nullifier_hash) {
                    self.notarizer.dispatch(NotaryRecord::ProofIssued {
                        nullifier_hash,
                        action: action.to_string(),
                        topic: topic.to_string(),
                        created_at: unix_now(),
                    });
                }
                Ok(artifact)
            }
            Err(e) => {
                if e.is_replay() {
                    self.counters.replays_rejected.fetch_add(1, Ordering::Relaxed);
                }
                Err(e)
            }
        }
    }

    /// Boolean verdict. Backend faults are logged and reported as `false`.
    pub async fn verify_proof(&self, artifact: &ProofArtifact, action: &str, topic: &str) -> bool {
        match self.verifier.verify(artifact, action, topic).await {
            Ok(outcome) => outcome.valid,
            Err(e) => {
                error!("Proof verification aborted: {}", e);
                false
            }
        }
    }

    pub async fn verify_proof_detailed(
        &self,
        artifact: &ProofArtifact,
        action: &str,
        topic: &str,
    ) -> ShroudResult<VerificationOutcome> {
        self.verifier.verify(artifact, action, topic).await
    }

    pub async fn revoke_identity(&self, commitment: &Commitment) -> ShroudResult<IdentityRecord> {
        let was_valid = self
            .registry
            .get_by_commitment(commitment)
            .await?
            .is_some_and(|r| r.is_valid);

        let record = self.registry.revoke(commitment).await?;

        if was_valid {
            self.counters.revocations.fetch_add(1, Ordering::Relaxed);
            self.notarizer.dispatch(NotaryRecord::IdentityRevoked {
                commitment: *commitment,
                revoked_at: unix_now(),
            });
        }
        Ok(record)
    }

    pub async fn identity(&self, commitment: &Commitment) -> ShroudResult<Option<IdentityRecord>> {
        self.registry.get_by_commitment(commitment).await
    }

    pub fn encrypt(&self, plaintext: &[u8], key: Option<&SymmetricKey>) -> ShroudResult<EncryptedContent> {
        shroud_crypto::encrypt(plaintext, key)
    }

    pub fn decrypt(&self, content: &EncryptedContent) -> ShroudResult<Vec<u8>> {
        shroud_crypto::decrypt(content)
    }

    pub fn encrypt_for_client<T: Serialize + ?Sized>(&self, payload: &T, key: &SymmetricKey) -> ShroudResult<String> {
        shroud_crypto::encrypt_for_client(payload, key)
    }

    pub fn decrypt_from_client<T: DeserializeOwned>(&self, text: &str, key: &SymmetricKey) -> ShroudResult<T> {
        shroud_crypto::decrypt_from_client(text, key)
    }

    pub fn notarizer(&self) -> &Arc<Notarizer> {
        &self.notarizer
    }

    pub async fn stats(&self) -> ShroudResult<ServiceStats> {
        let (verifications_passed, verifications_failed) = self.verifier.stats();

        Ok(ServiceStats {
            identities_issued: self.counters.identities_issued.load(Ordering::Relaxed),
            issue_collisions: self.counters.issue_collisions.load(Ordering::Relaxed),
            proofs_issued: self.counters.proofs_issued.load(Ordering::Relaxed),
            replays_rejected: self.counters.replays_rejected.load(Ordering::Relaxed),
            revocations: self.counters.revocations.load(Ordering::Relaxed),
            verifications_passed,
            verifications_failed,
            registered_identities: self.registry.count().await?,
            recorded_nullifiers: self.ledger.count().await?,
            notary: self.notarizer.stats(),
        })
    }
}
