//! Text transport for sealed structured payloads.
//!
//! Wire layout before base64:
//! `version (1) ‖ iv_len (u16 BE) ‖ iv ‖ tag_len (u16 BE) ‖ tag ‖ ct_len (u32 BE) ‖ ct`

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shroud_types::{ShroudError, ShroudResult, SymmetricKey};

const CODEC_VERSION: u8 = 1;

pub fn encrypt_for_client<T: Serialize + ?Sized>(payload: &T, key: &SymmetricKey) -> ShroudResult<String> {
    let json = serde_json::to_vec(payload).map_err(|e| ShroudError::Serialization(e.to_string()))?;
    let (iv, tag, ciphertext) = crate::encryption::seal(key, &json)?;

    let ct_len = u32::try_from(ciphertext.len())
        .map_err(|_| ShroudError::InvalidInput("payload too large".into()))?;

    let mut frame = Vec::with_capacity(1 + 2 + iv.len() + 2 + tag.len() + 4 + ciphertext.len());
    frame.push(CODEC_VERSION);
    frame.extend_from_slice(&(iv.len() as u16).to_be_bytes());
    frame.extend_from_slice(&iv);
    frame.extend_from_slice(&(tag.len() as u16).to_be_bytes());
    frame.extend_from_slice(&tag);
    frame.extend_from_slice(&ct_len.to_be_bytes());
    frame.extend_from_slice(&ciphertext);

    Ok(STANDARD.encode(frame))
}

pub fn decrypt_from_client<T: DeserializeOwned>(text: &str, key: &SymmetricKey) -> ShroudResult<T> {
    let frame = STANDARD
        .decode(text.trim())
        .map_err(|_| ShroudError::AuthenticationFailure)?;

    let mut reader = FrameReader::new(&frame);
    if reader.take(1)?[0] != CODEC_VERSION {
        return Err(ShroudError::AuthenticationFailure);
    }
    let iv_len = u16::from_be_bytes(reader.array::<2>()?) as usize;
    let iv = reader.take(iv_len)?;
    let tag_len = u16::from_be_bytes(reader.array::<2>()?) as usize;
    let tag = reader.take(tag_len)?;
    let ct_len = u32::from_be_bytes(reader.array::<4>()?) as usize;
    let ciphertext = reader.take(ct_len)?;
    if !reader.is_empty() {
        return Err(ShroudError::AuthenticationFailure);
    }

    let plaintext = crate::encryption::open(key, iv, tag, ciphertext)?;
    serde_json::from_slice(&plaintext).map_err(|_| ShroudError::AuthenticationFailure)
}

struct FrameReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> FrameReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, n: usize) -> ShroudResult<&'a [u8]> {
        let end = self.pos.checked_add(n).ok_or(ShroudError::AuthenticationFailure)?;
        let slice = self.data.get(self.pos..end).ok_or(ShroudError::AuthenticationFailure)?;
        self.pos = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> ShroudResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn is_empty(&self) -> bool {
        self.pos == self.data.len()
    }
}
