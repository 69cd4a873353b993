#![deny(unsafe_code)]
#![warn(clippy::all)]

//! Cryptographic building blocks for the anonymous action ledger.
//!
//! - [`blake3_ops`]: the collision-resistant hash `H` with domain separation
//! - [`commitment`]: identity commitments, action nullifiers and proof tags
//! - [`random`]: the secure scalar source used for identity secrets
//! - [`encryption`]: authenticated content sealing (AES-256-GCM, 128-bit nonce)
//! - [`client_codec`]: text transport of sealed structured payloads

pub mod blake3_ops;
pub mod client_codec;
pub mod commitment;
pub mod encryption;
pub mod random;

pub use blake3_ops::*;
pub use client_codec::{decrypt_from_client, encrypt_for_client};
pub use commitment::*;
pub use encryption::{decrypt, encrypt, generate_content_key, EncryptedContent, CONTENT_AAD};
pub use random::{OsRandom, RandomFieldSource, SeededRandom};

pub fn random_bytes<const N: usize>() -> [u8; N] {
    use rand::RngCore;
    let mut bytes = [0u8; N];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    bytes
}

pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    use subtle::ConstantTimeEq;
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
