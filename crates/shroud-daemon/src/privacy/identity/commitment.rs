use super::registry::IdentityRegistry;
use shroud_crypto::commitment::{compute_commitment, compute_group_nullifier};
use shroud_crypto::RandomFieldSource;
use shroud_types::{IdentityBundle, ShroudError, ShroudResult};
use std::sync::Arc;
use tracing::debug;

/// Issues identity commitments and registers them.
pub struct CommitmentScheme {
    random: Arc<dyn RandomFieldSource>,
    registry: Arc<dyn IdentityRegistry>,
}

impl CommitmentScheme {
    pub fn new(random: Arc<dyn RandomFieldSource>, registry: Arc<dyn IdentityRegistry>) -> Self {
        Self { random, registry }
    }

    /// Draws fresh secrets, registers the derived commitment and returns the
    /// full bundle. A registry collision surfaces as `DuplicateCommitment`;
    /// retrying draws new secrets.
    pub async fn issue(&self, group_id: &str) -> ShroudResult<IdentityBundle> {
        if group_id.is_empty() {
            return Err(ShroudError::InvalidInput("group id must not be empty".into()));
        }

        let trapdoor = self.random.scalar();
        let nullifier_secret = self.random.scalar();

        let commitment = compute_commitment(&trapdoor, &nullifier_secret);
        let group_nullifier_hash = compute_group_nullifier(&nullifier_secret, group_id);

        self.registry
            .put(&commitment, &group_nullifier_hash, group_id)
            .await?;

        debug!(commitment = %commitment.short(), group_id, "Identity commitment registered");

        Ok(IdentityBundle {
            commitment,
            group_nullifier_hash,
            group_id: group_id.to_string(),
            trapdoor,
            nullifier_secret,
        })
    }

    pub fn registry(&self) -> &Arc<dyn IdentityRegistry> {
        &self.registry
    }
}
