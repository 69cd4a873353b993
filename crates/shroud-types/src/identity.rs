use crate::crypto::{Commitment, Hash256, SecretScalar};
use serde::{Deserialize, Serialize};

/// Everything a participant receives from identity issuance.
///
/// This is the only place the trapdoor and nullifier secret ever leave the
/// issuing process; nothing in the server keeps a copy.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IdentityBundle {
    pub commitment: Commitment,
    pub group_nullifier_hash: Hash256,
    pub group_id: String,
    pub trapdoor: SecretScalar,
    pub nullifier_secret: SecretScalar,
}

impl IdentityBundle {
    pub fn credentials(&self) -> ProofCredentials {
        ProofCredentials {
            commitment: self.commitment,
            trapdoor: self.trapdoor.clone(),
            nullifier_secret: self.nullifier_secret.clone(),
        }
    }
}

/// The subset of a bundle needed to ask for a proof. Both secrets are
/// required so the issuer can check they open `commitment`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProofCredentials {
    pub commitment: Commitment,
    pub trapdoor: SecretScalar,
    pub nullifier_secret: SecretScalar,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    pub commitment: Commitment,
    pub group_nullifier_hash: Hash256,
    pub group_id: String,
    pub is_valid: bool,
    pub created_at: i64,
}
