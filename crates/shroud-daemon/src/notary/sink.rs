use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use parking_lot::Mutex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shroud_types::{ShroudError, ShroudResult};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tracing::debug;

/// External anchoring target (content-addressed store, distributed ledger).
#[async_trait]
pub trait NotarizationSink: Send + Sync {
    fn name(&self) -> &str;

    /// Anchors `payload` and returns the sink's reference for it.
    async fn anchor(&self, payload: &[u8]) -> ShroudResult<String>;
}

#[derive(Serialize)]
struct AnchorRequest<'a> {
    payload: &'a str,
}

#[derive(Deserialize)]
struct AnchorResponse {
    reference: String,
}

pub struct HttpNotarySink {
    name: String,
    url: String,
    client: Client,
}

impl HttpNotarySink {
    pub fn new(name: impl Into<String>, url: impl Into<String>, timeout: Duration) -> ShroudResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ShroudError::Notarization(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            name: name.into(),
            url: url.into(),
            client,
        })
    }
}

#[async_trait]
impl NotarizationSink for HttpNotarySink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn anchor(&self, payload: &[u8]) -> ShroudResult<String> {
        debug!("HTTP POST: {}", self.url);
        let encoded = STANDARD.encode(payload);

        let response = self
            .client
            .post(&self.url)
            .json(&AnchorRequest { payload: &encoded })
            .send()
            .await
            .map_err(|e| ShroudError::Notarization(format!("{} request failed: {}", self.name, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ShroudError::Notarization(format!(
                "{} returned HTTP {}",
                self.name, status
            )));
        }

        let body: AnchorResponse = response
            .json()
            .await
            .map_err(|e| ShroudError::Notarization(format!("{} response unreadable: {}", self.name, e)))?;

        Ok(body.reference)
    }
}

/// Records anchored payloads in memory. References are BLAKE3 digests.
pub struct MemorySink {
    name: String,
    anchored: Mutex<Vec<Vec<u8>>>,
    failures_remaining: AtomicU32,
}

impl MemorySink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            anchored: Mutex::new(Vec::new()),
            failures_remaining: AtomicU32::new(0),
        }
    }

    /// Fails the next `count` anchor calls before succeeding.
    pub fn failing(name: impl Into<String>, count: u32) -> Self {
        let sink = Self::new(name);
        sink.failures_remaining.store(count, Ordering::SeqCst);
        sink
    }

    pub fn anchored(&self) -> Vec<Vec<u8>> {
        self.anchored.lock().clone()
    }
}

#[async_trait]
impl NotarizationSink for MemorySink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn anchor(&self, payload: &[u8]) -> ShroudResult<String> {
        let failed = self
            .failures_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(ShroudError::Notarization(format!("{} unavailable", self.name)));
        }

        self.anchored.lock().push(payload.to_vec());
        Ok(shroud_crypto::blake3_hash(payload).to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_sink_records() {
        let sink = MemorySink::new("memory");
        let reference = sink.anchor(b"payload").await.unwrap();
        assert_eq!(reference, shroud_crypto::blake3_hash(b"payload").to_hex());
        assert_eq!(sink.anchored(), vec![b"payload".to_vec()]);
    }

    #[tokio::test]
    async fn test_failing_sink_recovers() {
        let sink = MemorySink::failing("flaky", 2);
        assert!(sink.anchor(b"x").await.is_err());
        assert!(sink.anchor(b"x").await.is_err());
        assert!(sink.anchor(b"x").await.is_ok());
        assert_eq!(sink.anchored().len(), 1);
    }

    #[tokio::test]
    async fn test_http_sink_unreachable() {
        let sink = HttpNotarySink::new("ledger", "http://127.0.0.1:9/anchor", Duration::from_millis(200)).unwrap();
        assert_eq!(sink.name(), "ledger");
        assert!(matches!(sink.anchor(b"x").await, Err(ShroudError::Notarization(_))));
    }
}
