use serde::{Deserialize, Serialize};
use shroud_types::{Commitment, NullifierHash, ShroudError, ShroudResult};

/// Audit payloads handed to notarization sinks. Never carries secrets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NotaryRecord {
    IdentityRegistered {
        commitment: Commitment,
        group_id: String,
        created_at: i64,
    },
    ProofIssued {
        nullifier_hash: NullifierHash,
        action: String,
        topic: String,
        created_at: i64,
    },
    IdentityRevoked {
        commitment: Commitment,
        revoked_at: i64,
    },
}

impl NotaryRecord {
    pub fn kind(&self) -> &'static str {
        match self {
            NotaryRecord::IdentityRegistered { .. } => "identity_registered",
            NotaryRecord::ProofIssued { .. } => "proof_issued",
            NotaryRecord::IdentityRevoked { .. } => "identity_revoked",
        }
    }

    pub fn to_payload(&self) -> ShroudResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| ShroudError::Serialization(e.to_string()))
    }
}
