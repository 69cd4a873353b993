use crate::crypto::NullifierHash;
use serde::{Deserialize, Serialize};

/// Permanent record that one (identity, action, topic) slot has been spent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub nullifier_hash: NullifierHash,
    pub action: String,
    pub topic: String,
    pub created_at: i64,
}

/// Transmitted proof. Public signals are `[commitment, action_nullifier_hash, topic]`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProofArtifact {
    pub proof_blob: String,
    pub public_signals: Vec<String>,
    pub nullifier_hash: String,
}

impl ProofArtifact {
    pub fn commitment_signal(&self) -> Option<&str> {
        self.public_signals.first().map(String::as_str)
    }

    pub fn nullifier_signal(&self) -> Option<&str> {
        self.public_signals.get(1).map(String::as_str)
    }

    pub fn topic_signal(&self) -> Option<&str> {
        self.public_signals.get(2).map(String::as_str)
    }
}
