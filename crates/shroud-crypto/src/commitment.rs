//! Commitment and nullifier derivations.
//!
//! # Security model
//!
//! This is a **commitment + keyed replay tag** scheme, not a zero-knowledge
//! proof system:
//!
//! - `commitment = H(trapdoor ‖ nullifier_secret)` is a public pseudonym. It is
//!   revealed in every proof, so proofs by the same identity are linkable.
//! - `action_nullifier = H(nullifier_secret ‖ action ‖ topic)` is deterministic,
//!   so a second attempt for the same slot collides in the ledger.
//! - The proof tag is a BLAKE3 keyed hash under a server-held key. Anyone holding
//!   the key can mint tags; verification is only meaningful on the server side.
//!
//! Binding and replay resistance reduce to the collision resistance of BLAKE3
//! and the entropy of the two 256-bit secrets. There is no hiding proof and no
//! soundness proof, unlike a Pedersen commitment with a Merkle membership
//! circuit. A succinct proof system can replace the tag behind the issuer and
//! verifier without changing the ledger contract.
//!
//! Every derivation uses its own BLAKE3 derive-key context and length-prefixes
//! each field, so `‖` is unambiguous.

use crate::blake3_ops::FieldHasher;
use shroud_types::{Commitment, Hash256, NullifierHash, SecretScalar, SymmetricKey};

const COMMITMENT_CONTEXT: &str = "shroud-v1 identity-commitment";
const GROUP_NULLIFIER_CONTEXT: &str = "shroud-v1 group-nullifier";
const ACTION_NULLIFIER_CONTEXT: &str = "shroud-v1 action-nullifier";
const PROOF_TAG_DOMAIN: &str = "shroud-v1 proof-tag";

pub fn compute_commitment(trapdoor: &SecretScalar, nullifier_secret: &SecretScalar) -> Commitment {
    FieldHasher::new_derive_key(COMMITMENT_CONTEXT)
        .field(trapdoor.as_bytes())
        .field(nullifier_secret.as_bytes())
        .finalize()
}

pub fn compute_group_nullifier(nullifier_secret: &SecretScalar, group_id: &str) -> Hash256 {
    FieldHasher::new_derive_key(GROUP_NULLIFIER_CONTEXT)
        .field(nullifier_secret.as_bytes())
        .field(group_id.as_bytes())
        .finalize()
}

/// `H(nullifier_secret ‖ action ‖ topic)`. No normalization: callers must agree on
/// canonical spellings or equivalent topics will not collide.
pub fn compute_action_nullifier(
    nullifier_secret: &SecretScalar,
    action: &str,
    topic: &str,
) -> NullifierHash {
    FieldHasher::new_derive_key(ACTION_NULLIFIER_CONTEXT)
        .field(nullifier_secret.as_bytes())
        .field(action.as_bytes())
        .field(topic.as_bytes())
        .finalize()
}

/// Keyed tag binding a proof to its commitment, slot, nullifier and issue time.
pub fn compute_proof_tag(
    key: &SymmetricKey,
    commitment: &Commitment,
    action: &str,
    topic: &str,
    nullifier: &NullifierHash,
    issued_at: u64,
) -> Hash256 {
    FieldHasher::new_keyed(key, PROOF_TAG_DOMAIN)
        .field(commitment.as_bytes())
        .field(action.as_bytes())
        .field(topic.as_bytes())
        .field(nullifier.as_bytes())
        .field(&issued_at.to_be_bytes())
        .finalize()
}
