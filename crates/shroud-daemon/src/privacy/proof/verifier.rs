use super::types::{ProofBlob, VerificationFailure, VerificationOutcome, VerificationPolicy};
use crate::privacy::identity::IdentityRegistry;
use crate::privacy::nullifier::NullifierLedger;
use shroud_crypto::commitment::compute_proof_tag;
use shroud_crypto::constant_time_eq;
use shroud_types::{
    unix_now, Commitment, Hash256, NullifierHash, ProofArtifact, ShroudResult, SymmetricKey,
    PUBLIC_SIGNAL_COUNT,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

struct ParsedProof {
    blob: ProofBlob,
    commitment: Commitment,
    nullifier: NullifierHash,
}

/// Read-only proof checks: structure, tag, ledger, identity. Never writes to
/// the ledger.
pub struct ProofVerifier {
    ledger: Arc<dyn NullifierLedger>,
    registry: Arc<dyn IdentityRegistry>,
    proof_key: Arc<SymmetricKey>,
    policy: VerificationPolicy,
    passed: AtomicU64,
    failed: AtomicU64,
}

impl ProofVerifier {
    pub fn new(
        ledger: Arc<dyn NullifierLedger>,
        registry: Arc<dyn IdentityRegistry>,
        proof_key: Arc<SymmetricKey>,
        policy: VerificationPolicy,
    ) -> Self {
        Self {
            ledger,
            registry,
            proof_key,
            policy,
            passed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    pub fn policy(&self) -> &VerificationPolicy {
        &self.policy
    }

    pub async fn verify(
        &self,
        artifact: &ProofArtifact,
        action: &str,
        topic: &str,
    ) -> ShroudResult<VerificationOutcome> {
        self.verify_at(artifact, action, topic, unix_now()).await
    }

    /// Verifies against an explicit clock reading in unix seconds.
    pub async fn verify_at(
        &self,
        artifact: &ProofArtifact,
        action: &str,
        topic: &str,
        now: i64,
    ) -> ShroudResult<VerificationOutcome> {
        let outcome = match self.check(artifact, action, topic, now).await? {
            Ok(()) => VerificationOutcome::accepted(),
            Err(reason) => VerificationOutcome::rejected(reason),
        };

        match &outcome.reason {
            None => {
                self.passed.fetch_add(1, Ordering::Relaxed);
                debug!(action, topic, "Proof verified");
            }
            Some(reason) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                warn!(action, topic, %reason, "Proof verification failed");
            }
        }

        Ok(outcome)
    }

    async fn check(
        &self,
        artifact: &ProofArtifact,
        action: &str,
        topic: &str,
        now: i64,
    ) -> ShroudResult<Result<(), VerificationFailure>> {
        let parsed = match parse_structure(artifact, action, topic) {
            Ok(parsed) => parsed,
            Err(reason) => return Ok(Err(reason)),
        };

        let expected = compute_proof_tag(
            &self.proof_key,
            &parsed.commitment,
            action,
            topic,
            &parsed.nullifier,
            parsed.blob.issued_at,
        );
        if !constant_time_eq(expected.as_bytes(), parsed.blob.tag.as_bytes()) {
            return Ok(Err(VerificationFailure::InvalidTag));
        }

        if !self.is_fresh(parsed.blob.issued_at, now) {
            return Ok(Err(VerificationFailure::Expired));
        }

        let recorded = self.ledger.exists_for(&parsed.nullifier, action, topic).await?;
        if !recorded && self.policy.require_ledger_entry {
            return Ok(Err(VerificationFailure::Unverifiable));
        }

        match self.registry.get_by_commitment(&parsed.commitment).await? {
            None => Ok(Err(VerificationFailure::UnknownCommitment)),
            Some(record) if !record.is_valid => Ok(Err(VerificationFailure::RevokedIdentity)),
            Some(_) => Ok(Ok(())),
        }
    }

    fn is_fresh(&self, issued_at: u64, now: i64) -> bool {
        let Some(max_age) = self.policy.max_age_secs else {
            return true;
        };
        let now = i128::from(now);
        let issued_at = i128::from(issued_at);
        let skew = i128::from(self.policy.clock_skew_secs);

        issued_at <= now + skew && now - issued_at <= i128::from(max_age) + skew
    }

    pub fn stats(&self) -> (u64, u64) {
        (
            self.passed.load(Ordering::Relaxed),
            self.failed.load(Ordering::Relaxed),
        )
    }
}

fn parse_structure(
    artifact: &ProofArtifact,
    action: &str,
    topic: &str,
) -> Result<ParsedProof, VerificationFailure> {
    let malformed = |detail: &str| VerificationFailure::Malformed(detail.to_string());

    if action.is_empty() || topic.is_empty() {
        return Err(malformed("action and topic are required"));
    }

    let blob = ProofBlob::decode(&artifact.proof_blob)
        .map_err(|e| VerificationFailure::Malformed(e.to_string()))?;

    if artifact.public_signals.len() != PUBLIC_SIGNAL_COUNT {
        return Err(malformed("expected exactly three public signals"));
    }

    let commitment_hex = &artifact.public_signals[0];
    let nullifier_hex = &artifact.public_signals[1];

    if !Hash256::is_wire_hex(commitment_hex) || !Hash256::is_wire_hex(nullifier_hex) {
        return Err(malformed("signals must be 64-character lowercase hex"));
    }
    if artifact.nullifier_hash != *nullifier_hex {
        return Err(malformed("nullifier hash does not match public signal"));
    }
    if artifact.public_signals[2] != topic {
        return Err(malformed("topic does not match public signal"));
    }

    let commitment = Hash256::from_hex(commitment_hex).map_err(|e| VerificationFailure::Malformed(e.to_string()))?;
    let nullifier = Hash256::from_hex(nullifier_hex).map_err(|e| VerificationFailure::Malformed(e.to_string()))?;

    Ok(ParsedProof {
        blob,
        commitment,
        nullifier,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::privacy::identity::InMemoryIdentityRegistry;
    use crate::privacy::nullifier::InMemoryNullifierLedger;
    use crate::privacy::proof::ProofIssuer;
    use shroud_crypto::commitment::{compute_action_nullifier, compute_commitment};
    use shroud_types::{ProofCredentials, SecretScalar};

    fn credentials_from(trapdoor: u8, secret: u8) -> ProofCredentials {
        let trapdoor = SecretScalar::from_bytes([trapdoor; 32]);
        let nullifier_secret = SecretScalar::from_bytes([secret; 32]);
        ProofCredentials {
            commitment: compute_commitment(&trapdoor, &nullifier_secret),
            trapdoor,
            nullifier_secret,
        }
    }

    struct Fixture {
        issuer: ProofIssuer,
        verifier: ProofVerifier,
        ledger: Arc<InMemoryNullifierLedger>,
        registry: Arc<InMemoryIdentityRegistry>,
        credentials: ProofCredentials,
    }

    async fn fixture(policy: VerificationPolicy) -> Fixture {
        let ledger = Arc::new(InMemoryNullifierLedger::new());
        let registry = Arc::new(InMemoryIdentityRegistry::new());
        let key = Arc::new(SymmetricKey::from_bytes([0x42; 32]));

        let credentials = credentials_from(1, 2);
        registry
            .put(&credentials.commitment, &Hash256::from_bytes([3; 32]), "g1")
            .await
            .unwrap();

        Fixture {
            issuer: ProofIssuer::new(ledger.clone(), key.clone()),
            verifier: ProofVerifier::new(ledger.clone(), registry.clone(), key, policy),
            ledger,
            registry,
            credentials,
        }
    }

    fn reason(outcome: &VerificationOutcome) -> Option<&VerificationFailure> {
        outcome.reason.as_ref()
    }

    #[tokio::test]
    async fn test_issued_proof_verifies_repeatedly() {
        let f = fixture(VerificationPolicy::default()).await;
        let artifact = f.issuer.issue(&f.credentials, "upvote", "REF-001").await.unwrap();

        for _ in 0..3 {
            let outcome = f.verifier.verify(&artifact, "upvote", "REF-001").await.unwrap();
            assert!(outcome.valid, "{:?}", outcome);
        }
        assert_eq!(f.ledger.count().await.unwrap(), 1);
        assert_eq!(f.verifier.stats(), (3, 0));
    }

    #[tokio::test]
    async fn test_wrong_action_or_topic_rejected() {
        let f = fixture(VerificationPolicy::default()).await;
        let artifact = f.issuer.issue(&f.credentials, "upvote", "REF-001").await.unwrap();

        let outcome = f.verifier.verify(&artifact, "submit", "REF-001").await.unwrap();
        assert_eq!(reason(&outcome), Some(&VerificationFailure::InvalidTag));

        let outcome = f.verifier.verify(&artifact, "upvote", "REF-002").await.unwrap();
        assert!(matches!(reason(&outcome), Some(VerificationFailure::Malformed(_))));
    }

    #[tokio::test]
    async fn test_structural_checks() {
        let f = fixture(VerificationPolicy::default()).await;
        let artifact = f.issuer.issue(&f.credentials, "upvote", "REF-001").await.unwrap();

        let mut bad = artifact.clone();
        bad.public_signals.pop();
        let outcome = f.verifier.verify(&bad, "upvote", "REF-001").await.unwrap();
        assert!(matches!(reason(&outcome), Some(VerificationFailure::Malformed(_))));

        let mut bad = artifact.clone();
        bad.nullifier_hash = "ab".repeat(32);
        let outcome = f.verifier.verify(&bad, "upvote", "REF-001").await.unwrap();
        assert!(matches!(reason(&outcome), Some(VerificationFailure::Malformed(_))));

        let mut bad = artifact.clone();
        bad.proof_blob.clear();
        let outcome = f.verifier.verify(&bad, "upvote", "REF-001").await.unwrap();
        assert!(matches!(reason(&outcome), Some(VerificationFailure::Malformed(_))));

        let mut bad = artifact;
        bad.public_signals[0] = "not-hex".into();
        let outcome = f.verifier.verify(&bad, "upvote", "REF-001").await.unwrap();
        assert!(matches!(reason(&outcome), Some(VerificationFailure::Malformed(_))));
    }

    #[tokio::test]
    async fn test_uppercase_signals_rejected() {
        let f = fixture(VerificationPolicy::default()).await;
        let artifact = f.issuer.issue(&f.credentials, "upvote", "REF-001").await.unwrap();

        let mut upper = artifact.clone();
        upper.public_signals[0] = upper.public_signals[0].to_uppercase();
        let outcome = f.verifier.verify(&upper, "upvote", "REF-001").await.unwrap();
        assert!(matches!(reason(&outcome), Some(VerificationFailure::Malformed(_))));

        let mut upper = artifact.clone();
        upper.public_signals[1] = upper.public_signals[1].to_uppercase();
        upper.nullifier_hash = upper.public_signals[1].clone();
        let outcome = f.verifier.verify(&upper, "upvote", "REF-001").await.unwrap();
        assert!(matches!(reason(&outcome), Some(VerificationFailure::Malformed(_))));

        let outcome = f.verifier.verify(&artifact, "upvote", "REF-001").await.unwrap();
        assert!(outcome.valid);
    }

    #[tokio::test]
    async fn test_every_blob_byte_is_authenticated() {
        let f = fixture(VerificationPolicy::default()).await;
        let artifact = f.issuer.issue(&f.credentials, "upvote", "REF-001").await.unwrap();
        let bytes = hex::decode(&artifact.proof_blob).unwrap();

        for i in 0..bytes.len() {
            let mut mutated = bytes.clone();
            mutated[i] ^= 0x01;
            let mut bad = artifact.clone();
            bad.proof_blob = hex::encode(mutated);
            let outcome = f.verifier.verify(&bad, "upvote", "REF-001").await.unwrap();
            assert!(!outcome.valid, "byte {} mutation accepted", i);
        }
    }

    #[tokio::test]
    async fn test_substituted_commitment_rejected() {
        let f = fixture(VerificationPolicy::default()).await;
        let artifact = f.issuer.issue(&f.credentials, "upvote", "REF-001").await.unwrap();

        let mut bad = artifact;
        bad.public_signals[0] = Hash256::from_bytes([9; 32]).to_hex();
        let outcome = f.verifier.verify(&bad, "upvote", "REF-001").await.unwrap();
        assert!(!outcome.valid);
    }

    #[tokio::test]
    async fn test_unregistered_commitment_with_valid_tag() {
        let f = fixture(VerificationPolicy::default()).await;
        let stranger = credentials_from(8, 8);
        let artifact = f.issuer.issue(&stranger, "upvote", "REF-001").await.unwrap();

        let outcome = f.verifier.verify(&artifact, "upvote", "REF-001").await.unwrap();
        assert_eq!(reason(&outcome), Some(&VerificationFailure::UnknownCommitment));
    }

    #[tokio::test]
    async fn test_revoked_identity_rejected() {
        let f = fixture(VerificationPolicy::default()).await;
        let artifact = f.issuer.issue(&f.credentials, "upvote", "REF-001").await.unwrap();
        f.registry.revoke(&f.credentials.commitment).await.unwrap();

        let outcome = f.verifier.verify(&artifact, "upvote", "REF-001").await.unwrap();
        assert_eq!(reason(&outcome), Some(&VerificationFailure::RevokedIdentity));
    }

    async fn forged_artifact(f: &Fixture, key: &SymmetricKey) -> ProofArtifact {
        let nullifier = compute_action_nullifier(&f.credentials.nullifier_secret, "upvote", "REF-001");
        let issued_at = u64::try_from(unix_now()).unwrap();
        let tag = compute_proof_tag(key, &f.credentials.commitment, "upvote", "REF-001", &nullifier, issued_at);
        ProofArtifact {
            proof_blob: ProofBlob { issued_at, tag }.encode(),
            public_signals: vec![f.credentials.commitment.to_hex(), nullifier.to_hex(), "REF-001".into()],
            nullifier_hash: nullifier.to_hex(),
        }
    }

    #[tokio::test]
    async fn test_missing_ledger_entry_policy() {
        let strict = fixture(VerificationPolicy::default()).await;
        let artifact = forged_artifact(&strict, &SymmetricKey::from_bytes([0x42; 32])).await;
        let outcome = strict.verifier.verify(&artifact, "upvote", "REF-001").await.unwrap();
        assert_eq!(reason(&outcome), Some(&VerificationFailure::Unverifiable));
        assert_eq!(strict.ledger.count().await.unwrap(), 0);

        let lenient = fixture(VerificationPolicy {
            require_ledger_entry: false,
            ..VerificationPolicy::default()
        })
        .await;
        let outcome = lenient.verifier.verify(&artifact, "upvote", "REF-001").await.unwrap();
        assert!(outcome.valid);
        assert_eq!(lenient.ledger.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_foreign_key_tag_rejected() {
        let f = fixture(VerificationPolicy::default()).await;
        let artifact = forged_artifact(&f, &SymmetricKey::from_bytes([0x43; 32])).await;
        let outcome = f.verifier.verify(&artifact, "upvote", "REF-001").await.unwrap();
        assert_eq!(reason(&outcome), Some(&VerificationFailure::InvalidTag));
    }

    #[tokio::test]
    async fn test_freshness_window() {
        let policy = VerificationPolicy {
            require_ledger_entry: true,
            max_age_secs: Some(60),
            clock_skew_secs: 5,
        };
        let f = fixture(policy).await;
        let artifact = f.issuer.issue(&f.credentials, "upvote", "REF-001").await.unwrap();
        let issued_at = ProofBlob::decode(&artifact.proof_blob).unwrap().issued_at as i64;

        for (now, fresh) in [
            (issued_at + 65, true),
            (issued_at + 66, false),
            (issued_at - 5, true),
            (issued_at - 6, false),
        ] {
            let outcome = f.verifier.verify_at(&artifact, "upvote", "REF-001", now).await.unwrap();
            if fresh {
                assert!(outcome.valid, "now={}", now);
            } else {
                assert_eq!(outcome.reason, Some(VerificationFailure::Expired), "now={}", now);
            }
        }
    }

    #[tokio::test]
    async fn test_window_disabled() {
        let policy = VerificationPolicy {
            max_age_secs: None,
            ..VerificationPolicy::default()
        };
        let f = fixture(policy).await;
        let artifact = f.issuer.issue(&f.credentials, "upvote", "REF-001").await.unwrap();
        let outcome = f
            .verifier
            .verify_at(&artifact, "upvote", "REF-001", i64::MAX)
            .await
            .unwrap();
        assert!(outcome.valid);
    }
}
