use super::types::ProofBlob;
use crate::privacy::nullifier::{ActionNullifierDeriver, NullifierLedger};
use shroud_crypto::commitment::{compute_commitment, compute_proof_tag};
use shroud_crypto::constant_time_eq;
use shroud_types::{unix_now, ProofArtifact, ProofCredentials, ShroudError, ShroudResult, SymmetricKey};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IssueStep {
    Start,
    CheckCredentials,
    DeriveNullifier,
    CheckLedger,
    BuildProof,
    RecordNullifier,
    Done,
}

impl fmt::Display for IssueStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IssueStep::Start => "start",
            IssueStep::CheckCredentials => "check_credentials",
            IssueStep::DeriveNullifier => "derive_nullifier",
            IssueStep::CheckLedger => "check_ledger",
            IssueStep::BuildProof => "build_proof",
            IssueStep::RecordNullifier => "record_nullifier",
            IssueStep::Done => "done",
        };
        f.write_str(name)
    }
}

/// Issues single-use proofs. The ledger insert is the commit point: a proof
/// is only returned once its nullifier has been recorded.
pub struct ProofIssuer {
    deriver: ActionNullifierDeriver,
    ledger: Arc<dyn NullifierLedger>,
    proof_key: Arc<SymmetricKey>,
}

impl ProofIssuer {
    pub fn new(ledger: Arc<dyn NullifierLedger>, proof_key: Arc<SymmetricKey>) -> Self {
        Self {
            deriver: ActionNullifierDeriver,
            ledger,
            proof_key,
        }
    }

    pub async fn issue(
        &self,
        credentials: &ProofCredentials,
        action: &str,
        topic: &str,
    ) -> ShroudResult<ProofArtifact> {
        let commitment = credentials.commitment;
        let mut step = IssueStep::Start;
        debug!(%step, commitment = %commitment.short(), action, topic, "Proof issuance");

        // Both secrets must open the commitment before a nullifier is derived.
        step = IssueStep::CheckCredentials;
        let opened = compute_commitment(&credentials.trapdoor, &credentials.nullifier_secret);
        if !constant_time_eq(opened.as_bytes(), commitment.as_bytes()) {
            warn!(%step, commitment = %commitment.short(), action, topic, "Rejected proof request: credentials do not open commitment");
            return Err(ShroudError::CredentialMismatch);
        }

        step = IssueStep::DeriveNullifier;
        let nullifier = self
            .deriver
            .derive(&credentials.nullifier_secret, action, topic)?;
        debug!(%step, nullifier = %nullifier.short());

        step = IssueStep::CheckLedger;
        if self.ledger.exists_for(&nullifier, action, topic).await? {
            warn!(%step, nullifier = %nullifier.short(), action, topic, "Rejected proof request: capability already used");
            return Err(ShroudError::AlreadyUsed);
        }

        step = IssueStep::BuildProof;
        let issued_at = u64::try_from(unix_now()).unwrap_or_default();
        let tag = compute_proof_tag(&self.proof_key, &commitment, action, topic, &nullifier, issued_at);
        let proof_blob = ProofBlob { issued_at, tag }.encode();
        debug!(%step, issued_at);

        step = IssueStep::RecordNullifier;
        match self.ledger.insert(&nullifier, action, topic).await {
            Ok(_) => {}
            Err(ShroudError::DuplicateNullifier) => {
                warn!(%step, nullifier = %nullifier.short(), action, topic, "Rejected proof request: lost concurrent issuance");
                return Err(ShroudError::AlreadyUsed);
            }
            Err(e) => return Err(e),
        }

        let nullifier_hex = nullifier.to_hex();
        let artifact = ProofArtifact {
            proof_blob,
            public_signals: vec![commitment.to_hex(), nullifier_hex.clone(), topic.to_string()],
            nullifier_hash: nullifier_hex,
        };

        step = IssueStep::Done;
        debug!(%step, nullifier = %nullifier.short());
        Ok(artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::privacy::nullifier::InMemoryNullifierLedger;
    use shroud_types::{Hash256, SecretScalar, PUBLIC_SIGNAL_COUNT};

    fn credentials() -> ProofCredentials {
        let trapdoor = SecretScalar::from_bytes([1; 32]);
        let nullifier_secret = SecretScalar::from_bytes([2; 32]);
        ProofCredentials {
            commitment: compute_commitment(&trapdoor, &nullifier_secret),
            trapdoor,
            nullifier_secret,
        }
    }

    fn issuer() -> (ProofIssuer, Arc<InMemoryNullifierLedger>) {
        let ledger = Arc::new(InMemoryNullifierLedger::new());
        let key = Arc::new(SymmetricKey::from_bytes([7; 32]));
        (ProofIssuer::new(ledger.clone(), key), ledger)
    }

    #[tokio::test]
    async fn test_issue_shape() {
        let (issuer, ledger) = issuer();
        let artifact = issuer.issue(&credentials(), "upvote", "REF-001").await.unwrap();

        assert_eq!(artifact.public_signals.len(), PUBLIC_SIGNAL_COUNT);
        assert_eq!(artifact.commitment_signal(), Some(credentials().commitment.to_hex().as_str()));
        assert_eq!(artifact.nullifier_signal(), Some(artifact.nullifier_hash.as_str()));
        assert_eq!(artifact.topic_signal(), Some("REF-001"));
        assert!(ProofBlob::decode(&artifact.proof_blob).is_ok());

        let nullifier = Hash256::from_hex(&artifact.nullifier_hash).unwrap();
        let entry = ledger.get(&nullifier).await.unwrap().unwrap();
        assert_eq!(entry.action, "upvote");
    }

    #[tokio::test]
    async fn test_second_issue_already_used() {
        let (issuer, ledger) = issuer();
        issuer.issue(&credentials(), "upvote", "REF-001").await.unwrap();

        let again = issuer.issue(&credentials(), "upvote", "REF-001").await;
        assert!(matches!(again, Err(ShroudError::AlreadyUsed)));
        assert_eq!(ledger.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_invalid_input_does_not_touch_ledger() {
        let (issuer, ledger) = issuer();
        assert!(matches!(
            issuer.issue(&credentials(), "", "REF-001").await,
            Err(ShroudError::InvalidInput(_))
        ));
        assert_eq!(ledger.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_substituted_secret_rejected() {
        let (issuer, ledger) = issuer();
        issuer.issue(&credentials(), "upvote", "REF-001").await.unwrap();

        for b in 10..15u8 {
            let mut swapped = credentials();
            swapped.nullifier_secret = SecretScalar::from_bytes([b; 32]);
            assert!(matches!(
                issuer.issue(&swapped, "upvote", "REF-001").await,
                Err(ShroudError::CredentialMismatch)
            ));
        }

        let mut wrong_trapdoor = credentials();
        wrong_trapdoor.trapdoor = SecretScalar::from_bytes([9; 32]);
        assert!(matches!(
            issuer.issue(&wrong_trapdoor, "upvote", "REF-002").await,
            Err(ShroudError::CredentialMismatch)
        ));

        let mut foreign = credentials();
        foreign.commitment = Hash256::from_bytes([3; 32]);
        assert!(matches!(
            issuer.issue(&foreign, "upvote", "REF-002").await,
            Err(ShroudError::CredentialMismatch)
        ));

        assert_eq!(ledger.count().await.unwrap(), 1);
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<parking_lot::Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock()).into_owned()
        }
    }

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[tokio::test]
    async fn test_rejections_logged_at_rejecting_step() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::WARN)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let (issuer, _) = issuer();
        issuer.issue(&credentials(), "upvote", "REF-001").await.unwrap();
        assert!(issuer.issue(&credentials(), "upvote", "REF-001").await.is_err());

        let mut swapped = credentials();
        swapped.nullifier_secret = SecretScalar::from_bytes([9; 32]);
        assert!(issuer.issue(&swapped, "upvote", "REF-001").await.is_err());

        let text = logs.text();
        assert!(text.contains("step=check_ledger"), "{}", text);
        assert!(text.contains("step=check_credentials"), "{}", text);
        assert!(!text.contains("step=derive_nullifier"), "{}", text);
    }

    #[test]
    fn test_step_names() {
        assert_eq!(IssueStep::CheckCredentials.to_string(), "check_credentials");
        assert_eq!(IssueStep::CheckLedger.to_string(), "check_ledger");
        assert_eq!(IssueStep::Done.to_string(), "done");
    }
}
