#![forbid(unsafe_code)]
#![warn(clippy::all)]

mod constants;
mod crypto;
mod error;
mod identity;
mod proof;

pub use constants::*;
pub use crypto::{Commitment, Hash256, NullifierHash, SecretScalar, SymmetricKey};
pub use error::{ShroudError, ShroudResult};
pub use identity::{IdentityBundle, IdentityRecord, ProofCredentials};
pub use proof::{LedgerEntry, ProofArtifact};

pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_hex_roundtrip() {
        let hash = Hash256::from_bytes([0xab; 32]);
        assert_eq!(hash.to_hex().len(), 64);
        assert!(Hash256::is_wire_hex(&hash.to_hex()));

        let parsed = Hash256::from_hex(&hash.to_hex()).unwrap();
        assert_eq!(hash, parsed);
    }

    #[test]
    fn test_hash_rejects_wrong_length() {
        assert!(Hash256::from_hex("abcd").is_err());
        assert!(Hash256::from_hex("zz").is_err());
        assert!(!Hash256::is_wire_hex("0xabcd"));
        assert!(!Hash256::is_wire_hex(&"g".repeat(64)));
        assert!(!Hash256::is_wire_hex(&"AB".repeat(32)));
    }

    #[test]
    fn test_hash_serializes_as_hex() {
        let hash = Hash256::from_bytes([0x01; 32]);
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{}\"", "01".repeat(32)));

        let back: Hash256 = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);

        let bin = bincode::serialize(&hash).unwrap();
        let back: Hash256 = bincode::deserialize(&bin).unwrap();
        assert_eq!(back, hash);
    }

    #[test]
    fn test_secrets_are_redacted() {
        let secret = SecretScalar::from_bytes([0x42; 32]);
        assert_eq!(format!("{:?}", secret), "SecretScalar([REDACTED])");

        let key = SymmetricKey::from_bytes([0x42; 32]);
        assert!(!format!("{:?}", key).contains("42"));
    }

    #[test]
    fn test_bundle_credentials() {
        let bundle = IdentityBundle {
            commitment: Hash256::from_bytes([1; 32]),
            group_nullifier_hash: Hash256::from_bytes([2; 32]),
            group_id: "g1".into(),
            trapdoor: SecretScalar::from_bytes([3; 32]),
            nullifier_secret: SecretScalar::from_bytes([4; 32]),
        };
        let creds = bundle.credentials();
        assert_eq!(creds.commitment, bundle.commitment);
        assert_eq!(creds.trapdoor, bundle.trapdoor);
        assert_eq!(creds.nullifier_secret, bundle.nullifier_secret);

        let json = serde_json::to_string(&bundle).unwrap();
        let back: IdentityBundle = serde_json::from_str(&json).unwrap();
        assert_eq!(back.trapdoor, bundle.trapdoor);
    }

    #[test]
    fn test_artifact_signal_accessors() {
        let artifact = ProofArtifact {
            proof_blob: "00".into(),
            public_signals: vec!["c".into(), "n".into(), "t".into()],
            nullifier_hash: "n".into(),
        };
        assert_eq!(artifact.commitment_signal(), Some("c"));
        assert_eq!(artifact.nullifier_signal(), Some("n"));
        assert_eq!(artifact.topic_signal(), Some("t"));

        let json = serde_json::to_value(&artifact).unwrap();
        assert!(json.get("proofBlob").is_some());
        assert!(json.get("publicSignals").is_some());
    }

    #[test]
    fn test_replay_classification() {
        assert!(ShroudError::AlreadyUsed.is_replay());
        assert!(ShroudError::DuplicateNullifier.is_replay());
        assert!(!ShroudError::UnknownCommitment.is_replay());
    }
}
