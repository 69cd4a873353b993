use crate::config::ProofConfig;
use serde::{Deserialize, Serialize};
use shroud_types::{Hash256, ShroudError, ShroudResult, HASH_SIZE, PROOF_BLOB_SIZE, PROOF_TIMESTAMP_SIZE};
use std::fmt;

/// Decoded `proofBlob`: `issued_at (u64 BE seconds) ‖ tag`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProofBlob {
    pub issued_at: u64,
    pub tag: Hash256,
}

impl ProofBlob {
    pub fn encode(&self) -> String {
        let mut bytes = [0u8; PROOF_BLOB_SIZE];
        bytes[..PROOF_TIMESTAMP_SIZE].copy_from_slice(&self.issued_at.to_be_bytes());
        bytes[PROOF_TIMESTAMP_SIZE..].copy_from_slice(self.tag.as_bytes());
        hex::encode(bytes)
    }

    pub fn decode(blob: &str) -> ShroudResult<Self> {
        if blob.is_empty() {
            return Err(ShroudError::MalformedProof("empty proof blob".into()));
        }

        let bytes = hex::decode(blob)
            .map_err(|_| ShroudError::MalformedProof("proof blob is not hex".into()))?;

        if bytes.len() != PROOF_BLOB_SIZE {
            return Err(ShroudError::MalformedProof(format!(
                "proof blob must be {} bytes, got {}",
                PROOF_BLOB_SIZE,
                bytes.len()
            )));
        }

        let mut ts = [0u8; PROOF_TIMESTAMP_SIZE];
        ts.copy_from_slice(&bytes[..PROOF_TIMESTAMP_SIZE]);
        let mut tag = [0u8; HASH_SIZE];
        tag.copy_from_slice(&bytes[PROOF_TIMESTAMP_SIZE..]);

        Ok(Self {
            issued_at: u64::from_be_bytes(ts),
            tag: Hash256::from_bytes(tag),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum VerificationFailure {
    Malformed(String),
    InvalidTag,
    Expired,
    Unverifiable,
    UnknownCommitment,
    RevokedIdentity,
}

impl VerificationFailure {
    pub fn to_error(&self) -> ShroudError {
        match self {
            VerificationFailure::Malformed(detail) => ShroudError::MalformedProof(detail.clone()),
            VerificationFailure::InvalidTag => ShroudError::MalformedProof("proof tag mismatch".into()),
            VerificationFailure::Expired => ShroudError::MalformedProof("proof outside freshness window".into()),
            VerificationFailure::Unverifiable => ShroudError::Unverifiable,
            VerificationFailure::UnknownCommitment => ShroudError::UnknownCommitment,
            VerificationFailure::RevokedIdentity => ShroudError::RevokedIdentity,
        }
    }
}

impl fmt::Display for VerificationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationFailure::Malformed(detail) => write!(f, "malformed proof: {}", detail),
            VerificationFailure::InvalidTag => write!(f, "invalid proof tag"),
            VerificationFailure::Expired => write!(f, "proof expired"),
            VerificationFailure::Unverifiable => write!(f, "no ledger entry for nullifier"),
            VerificationFailure::UnknownCommitment => write!(f, "unknown commitment"),
            VerificationFailure::RevokedIdentity => write!(f, "identity revoked"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationOutcome {
    pub valid: bool,
    pub reason: Option<VerificationFailure>,
}

impl VerificationOutcome {
    pub fn accepted() -> Self {
        Self { valid: true, reason: None }
    }

    pub fn rejected(reason: VerificationFailure) -> Self {
        Self { valid: false, reason: Some(reason) }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct VerificationPolicy {
    pub require_ledger_entry: bool,
    pub max_age_secs: Option<u64>,
    pub clock_skew_secs: u64,
}

impl Default for VerificationPolicy {
    fn default() -> Self {
        Self::from(&ProofConfig::default())
    }
}

impl From<&ProofConfig> for VerificationPolicy {
    fn from(config: &ProofConfig) -> Self {
        Self {
            require_ledger_entry: config.require_ledger_entry,
            max_age_secs: config.max_age_secs,
            clock_skew_secs: config.clock_skew_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_blob_layout() {
        let blob = ProofBlob {
            issued_at: 0x0102030405060708,
            tag: Hash256::from_bytes([0xaa; 32]),
        };
        let encoded = blob.encode();
        assert_eq!(encoded.len(), PROOF_BLOB_SIZE * 2);
        assert!(encoded.starts_with("0102030405060708aaaa"));
        assert_eq!(ProofBlob::decode(&encoded).unwrap(), blob);
    }

    #[test]
    fn test_blob_rejects_bad_input() {
        let long = "0".repeat(PROOF_BLOB_SIZE * 2 + 2);
        for bad in ["", "zz", "00", long.as_str()] {
            assert!(matches!(ProofBlob::decode(bad), Err(ShroudError::MalformedProof(_))));
        }
    }

    #[test]
    fn test_failure_maps_to_error() {
        assert!(matches!(VerificationFailure::RevokedIdentity.to_error(), ShroudError::RevokedIdentity));
        assert!(matches!(VerificationFailure::Unverifiable.to_error(), ShroudError::Unverifiable));
        assert!(matches!(VerificationFailure::InvalidTag.to_error(), ShroudError::MalformedProof(_)));
    }

    #[test]
    fn test_outcome_serializes_reason() {
        let outcome = VerificationOutcome::rejected(VerificationFailure::Expired);
        let json = serde_json::to_string(&outcome).unwrap();
        assert_eq!(json, r#"{"valid":false,"reason":{"kind":"expired"}}"#);
    }

    proptest! {
        #[test]
        fn prop_blob_decode_inverts_encode(issued_at in any::<u64>(), tag in any::<[u8; 32]>()) {
            let blob = ProofBlob { issued_at, tag: Hash256::from_bytes(tag) };
            prop_assert_eq!(ProofBlob::decode(&blob.encode()).unwrap(), blob);
        }

        #[test]
        fn prop_arbitrary_text_never_panics(text in ".{0,96}") {
            if let Err(e) = ProofBlob::decode(&text) {
                prop_assert!(matches!(e, ShroudError::MalformedProof(_)));
            }
        }
    }
}
