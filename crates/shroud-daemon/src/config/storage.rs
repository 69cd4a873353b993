use serde::{Deserialize, Serialize};
use super::constants::{DEFAULT_CACHE_CAPACITY_BYTES, DEFAULT_FLUSH_INTERVAL_MS};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub cache_capacity_bytes: u64,
    pub flush_every_ms: Option<u64>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            cache_capacity_bytes: DEFAULT_CACHE_CAPACITY_BYTES,
            flush_every_ms: Some(DEFAULT_FLUSH_INTERVAL_MS),
        }
    }
}
