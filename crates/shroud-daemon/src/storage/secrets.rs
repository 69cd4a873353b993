use super::ShroudStorage;
use shroud_types::{ShroudError, ShroudResult, SymmetricKey, KEY_SIZE};
use tracing::info;
use zeroize::Zeroize;

const PROOF_KEY: &[u8] = b"proof_tag_key";

fn decode_key(bytes: &[u8]) -> ShroudResult<SymmetricKey> {
    let array: [u8; KEY_SIZE] = bytes
        .try_into()
        .map_err(|_| ShroudError::Storage("Stored proof key has invalid length".into()))?;
    Ok(SymmetricKey::from_bytes(array))
}

impl ShroudStorage {
    /// Returns the persisted proof tag key, generating it on first use.
    pub fn load_or_create_proof_key(&self) -> ShroudResult<SymmetricKey> {
        if let Some(bytes) = self
            .secrets
            .get(PROOF_KEY)
            .map_err(|e| self.storage_error("Failed to load proof key", e))?
        {
            return decode_key(&bytes);
        }

        let mut fresh = shroud_crypto::random_bytes::<KEY_SIZE>();
        let swapped = self
            .secrets
            .compare_and_swap(PROOF_KEY, None::<&[u8]>, Some(&fresh[..]))
            .map_err(|e| self.storage_error("Failed to store proof key", e));

        let key = match swapped {
            Ok(Ok(())) => {
                info!("Generated new proof key");
                self.audit_committed("secrets", "create", Some("proof_tag_key"));
                self.flush()?;
                Ok(SymmetricKey::from_bytes(fresh))
            }
            Ok(Err(conflict)) => match conflict.current {
                Some(current) => decode_key(&current),
                None => Err(ShroudError::Storage("Proof key vanished during creation".into())),
            },
            Err(e) => Err(e),
        };

        fresh.zeroize();
        key
    }
}
