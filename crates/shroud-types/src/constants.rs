pub const HASH_SIZE: usize = 32;

pub const SCALAR_SIZE: usize = 32;

pub const KEY_SIZE: usize = 32;

pub const CONTENT_NONCE_SIZE: usize = 16;

pub const CONTENT_TAG_SIZE: usize = 16;

pub const PUBLIC_SIGNAL_COUNT: usize = 3;

pub const PROOF_TIMESTAMP_SIZE: usize = 8;

pub const PROOF_BLOB_SIZE: usize = PROOF_TIMESTAMP_SIZE + HASH_SIZE;
