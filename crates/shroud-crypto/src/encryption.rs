use aes_gcm::aead::consts::U16;
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::aes::Aes256;
use aes_gcm::AesGcm;
use serde::{Deserialize, Serialize};
use shroud_types::{
    ShroudError, ShroudResult, SymmetricKey, CONTENT_NONCE_SIZE, CONTENT_TAG_SIZE, KEY_SIZE,
};
use zeroize::Zeroize;

/// AES-256-GCM with a 128-bit nonce.
type ContentCipher = AesGcm<Aes256, U16>;

/// Associated data bound into every tag; ciphertexts from other contexts never verify here.
pub const CONTENT_AAD: &[u8] = b"shroud-v1-content";

/// Sealed payload. All fields are lowercase hex. The key is returned to the
/// caller and never stored by this layer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedContent {
    pub ciphertext: String,
    pub iv: String,
    pub auth_tag: String,
    pub key: String,
}

pub fn generate_content_key() -> SymmetricKey {
    SymmetricKey::from_bytes(crate::random_bytes::<KEY_SIZE>())
}

pub(crate) fn seal(
    key: &SymmetricKey,
    plaintext: &[u8],
) -> ShroudResult<([u8; CONTENT_NONCE_SIZE], [u8; CONTENT_TAG_SIZE], Vec<u8>)> {
    let cipher = ContentCipher::new_from_slice(key.as_bytes())
        .map_err(|e| ShroudError::Crypto(e.to_string()))?;

    let iv = crate::random_bytes::<CONTENT_NONCE_SIZE>();
    let mut buffer = plaintext.to_vec();

    let tag = cipher
        .encrypt_in_place_detached(GenericArray::from_slice(&iv), CONTENT_AAD, &mut buffer)
        .map_err(|e| ShroudError::Crypto(e.to_string()))?;

    let mut tag_bytes = [0u8; CONTENT_TAG_SIZE];
    tag_bytes.copy_from_slice(tag.as_slice());
    Ok((iv, tag_bytes, buffer))
}

pub(crate) fn open(
    key: &SymmetricKey,
    iv: &[u8],
    tag: &[u8],
    ciphertext: &[u8],
) -> ShroudResult<Vec<u8>> {
    if iv.len() != CONTENT_NONCE_SIZE || tag.len() != CONTENT_TAG_SIZE {
        return Err(ShroudError::AuthenticationFailure);
    }

    let cipher = ContentCipher::new_from_slice(key.as_bytes())
        .map_err(|_| ShroudError::AuthenticationFailure)?;

    let mut buffer = ciphertext.to_vec();
    match cipher.decrypt_in_place_detached(
        GenericArray::from_slice(iv),
        CONTENT_AAD,
        &mut buffer,
        GenericArray::from_slice(tag),
    ) {
        Ok(()) => Ok(buffer),
        Err(_) => {
            buffer.zeroize();
            Err(ShroudError::AuthenticationFailure)
        }
    }
}

/// Seals `plaintext`. A fresh key is generated when `key` is `None`.
pub fn encrypt(plaintext: &[u8], key: Option<&SymmetricKey>) -> ShroudResult<EncryptedContent> {
    let generated;
    let key = match key {
        Some(k) => k,
        None => {
            generated = generate_content_key();
            &generated
        }
    };

    let (iv, tag, ciphertext) = seal(key, plaintext)?;

    Ok(EncryptedContent {
        ciphertext: hex::encode(ciphertext),
        iv: hex::encode(iv),
        auth_tag: hex::encode(tag),
        key: key.to_hex(),
    })
}

/// Opens a sealed payload. Every malformed component is reported as
/// [`ShroudError::AuthenticationFailure`]; no partial plaintext is returned.
pub fn decrypt(content: &EncryptedContent) -> ShroudResult<Vec<u8>> {
    let key = SymmetricKey::from_hex(&content.key).map_err(|_| ShroudError::AuthenticationFailure)?;
    let iv = hex::decode(&content.iv).map_err(|_| ShroudError::AuthenticationFailure)?;
    let tag = hex::decode(&content.auth_tag).map_err(|_| ShroudError::AuthenticationFailure)?;
    let ciphertext = hex::decode(&content.ciphertext).map_err(|_| ShroudError::AuthenticationFailure)?;

    open(&key, &iv, &tag, &ciphertext)
}
