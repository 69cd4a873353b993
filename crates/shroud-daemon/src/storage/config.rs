use crate::config::ShroudConfig;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub path: PathBuf,
    pub cache_capacity_bytes: u64,
    pub flush_every_ms: Option<u64>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::from(&ShroudConfig::default())
    }
}

impl From<&ShroudConfig> for StorageConfig {
    fn from(config: &ShroudConfig) -> Self {
        Self {
            path: config.storage_path(),
            cache_capacity_bytes: config.storage.cache_capacity_bytes,
            flush_every_ms: config.storage.flush_every_ms,
        }
    }
}
