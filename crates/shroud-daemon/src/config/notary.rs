use serde::{Deserialize, Serialize};
use super::constants::*;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct NotaryConfig {
    pub enabled: bool,
    /// Content-addressed store endpoint.
    pub content_store_url: Option<String>,
    /// Distributed ledger anchoring endpoint.
    pub ledger_url: Option<String>,
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub request_timeout_secs: u64,
}

impl Default for NotaryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            content_store_url: None,
            ledger_url: None,
            max_attempts: DEFAULT_NOTARY_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_NOTARY_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_NOTARY_MAX_DELAY_MS,
            request_timeout_secs: DEFAULT_NOTARY_TIMEOUT_SECS,
        }
    }
}

impl NotaryConfig {
    pub fn endpoints(&self) -> Vec<(&'static str, &str)> {
        let mut endpoints = Vec::new();
        if let Some(url) = self.content_store_url.as_deref() {
            endpoints.push(("content-store", url));
        }
        if let Some(url) = self.ledger_url.as_deref() {
            endpoints.push(("ledger", url));
        }
        endpoints
    }
}
