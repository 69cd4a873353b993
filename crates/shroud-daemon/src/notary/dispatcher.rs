use super::backoff::BackoffStrategy;
use super::record::NotaryRecord;
use super::sink::{HttpNotarySink, NotarizationSink};
use crate::config::NotaryConfig;
use serde::{Deserialize, Serialize};
use shroud_types::ShroudResult;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl From<&NotaryConfig> for RetryPolicy {
    fn from(config: &NotaryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
        }
    }
}

#[derive(Default)]
struct NotaryStats {
    dispatched: AtomicU64,
    anchored: AtomicU64,
    retries: AtomicU64,
    abandoned: AtomicU64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotaryStatsSnapshot {
    pub dispatched: u64,
    pub anchored: u64,
    pub retries: u64,
    pub abandoned: u64,
}

/// Decrements the in-flight count when a delivery task ends, panics included.
struct InFlightGuard(Arc<watch::Sender<usize>>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.send_modify(|n| *n = n.saturating_sub(1));
    }
}

/// Fire-and-forget delivery of audit records to every configured sink.
/// Each sink retries independently; failures are logged and never reported
/// back to the caller.
pub struct Notarizer {
    sinks: Vec<Arc<dyn NotarizationSink>>,
    retry: RetryPolicy,
    stats: Arc<NotaryStats>,
    in_flight: Arc<watch::Sender<usize>>,
    idle: watch::Receiver<usize>,
}

impl Notarizer {
    pub fn new(sinks: Vec<Arc<dyn NotarizationSink>>, retry: RetryPolicy) -> Self {
        let (tx, rx) = watch::channel(0usize);
        Self {
            sinks,
            retry,
            stats: Arc::new(NotaryStats::default()),
            in_flight: Arc::new(tx),
            idle: rx,
        }
    }

    pub fn disabled() -> Self {
        Self::new(Vec::new(), RetryPolicy::from(&NotaryConfig::default()))
    }

    pub fn from_config(config: &NotaryConfig) -> ShroudResult<Self> {
        if !config.enabled {
            return Ok(Self::disabled());
        }

        let timeout = Duration::from_secs(config.request_timeout_secs);
        let mut sinks: Vec<Arc<dyn NotarizationSink>> = Vec::new();
        for (name, url) in config.endpoints() {
            sinks.push(Arc::new(HttpNotarySink::new(name, url, timeout)?));
        }

        info!("Notarization enabled with {} sink(s)", sinks.len());
        Ok(Self::new(sinks, RetryPolicy::from(config)))
    }

    pub fn is_enabled(&self) -> bool {
        !self.sinks.is_empty()
    }

    /// Queues `record` for every sink. Must be called from within a tokio runtime.
    pub fn dispatch(&self, record: NotaryRecord) {
        if self.sinks.is_empty() {
            return;
        }

        let payload = match record.to_payload() {
            Ok(payload) => Arc::new(payload),
            Err(e) => {
                warn!("Dropping {} notarization: {}", record.kind(), e);
                return;
            }
        };

        for sink in &self.sinks {
            self.stats.dispatched.fetch_add(1, Ordering::Relaxed);
            self.in_flight.send_modify(|n| *n += 1);

            let guard = InFlightGuard(Arc::clone(&self.in_flight));
            let sink = Arc::clone(sink);
            let payload = Arc::clone(&payload);
            let stats = Arc::clone(&self.stats);
            let retry = self.retry;
            let kind = record.kind();

            tokio::spawn(async move {
                let _guard = guard;
                deliver(sink, &payload, retry, &stats, kind).await;
            });
        }
    }

    /// Resolves once no deliveries are in flight.
    pub async fn wait_idle(&self) {
        let mut rx = self.idle.clone();
        while *rx.borrow() != 0 {
            if rx.changed().await.is_err() {
                break;
            }
        }
    }

    pub fn stats(&self) -> NotaryStatsSnapshot {
        NotaryStatsSnapshot {
            dispatched: self.stats.dispatched.load(Ordering::Relaxed),
            anchored: self.stats.anchored.load(Ordering::Relaxed),
            retries: self.stats.retries.load(Ordering::Relaxed),
            abandoned: self.stats.abandoned.load(Ordering::Relaxed),
        }
    }
}

async fn deliver(
    sink: Arc<dyn NotarizationSink>,
    payload: &[u8],
    retry: RetryPolicy,
    stats: &NotaryStats,
    kind: &str,
) {
    let mut backoff = BackoffStrategy::exponential(retry.base_delay, retry.max_delay)
        .with_max_attempts(retry.max_attempts.saturating_sub(1));

    loop {
        match sink.anchor(payload).await {
            Ok(reference) => {
                stats.anchored.fetch_add(1, Ordering::Relaxed);
                debug!(sink = sink.name(), kind, reference = %reference, "Notarized");
                return;
            }
            Err(e) => match backoff.next_delay() {
                Some(delay) => {
                    stats.retries.fetch_add(1, Ordering::Relaxed);
                    debug!(sink = sink.name(), kind, "Notarization failed, retrying in {:?}: {}", delay, e);
                    tokio::time::sleep(delay).await;
                }
                None => {
                    stats.abandoned.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        sink = sink.name(),
                        kind,
                        attempts = backoff.attempts() + 1,
                        "Notarization abandoned: {}",
                        e
                    );
                    return;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notary::MemorySink;
    use shroud_types::Hash256;

    fn fast_retry(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
        }
    }

    fn record() -> NotaryRecord {
        NotaryRecord::ProofIssued {
            nullifier_hash: Hash256::from_bytes([5; 32]),
            action: "upvote".into(),
            topic: "REF-001".into(),
            created_at: 1_700_000_000,
        }
    }

    #[tokio::test]
    async fn test_dispatch_to_all_sinks() {
        let a = Arc::new(MemorySink::new("a"));
        let b = Arc::new(MemorySink::new("b"));
        let sinks: Vec<Arc<dyn NotarizationSink>> = vec![a.clone(), b.clone()];
        let notarizer = Notarizer::new(sinks, fast_retry(3));

        notarizer.dispatch(record());
        notarizer.wait_idle().await;

        assert_eq!(a.anchored().len(), 1);
        assert_eq!(b.anchored().len(), 1);
        let stats = notarizer.stats();
        assert_eq!(stats.dispatched, 2);
        assert_eq!(stats.anchored, 2);

        let decoded: NotaryRecord = serde_json::from_slice(&a.anchored()[0]).unwrap();
        assert_eq!(decoded, record());
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let flaky = Arc::new(MemorySink::failing("flaky", 2));
        let notarizer = Notarizer::new(vec![flaky.clone() as Arc<dyn NotarizationSink>], fast_retry(5));

        notarizer.dispatch(record());
        notarizer.wait_idle().await;

        assert_eq!(flaky.anchored().len(), 1);
        assert_eq!(notarizer.stats().retries, 2);
        assert_eq!(notarizer.stats().abandoned, 0);
    }

    #[tokio::test]
    async fn test_abandons_after_max_attempts() {
        let dead = Arc::new(MemorySink::failing("dead", 100));
        let notarizer = Notarizer::new(vec![dead.clone() as Arc<dyn NotarizationSink>], fast_retry(3));

        notarizer.dispatch(record());
        notarizer.wait_idle().await;

        assert!(dead.anchored().is_empty());
        let stats = notarizer.stats();
        assert_eq!(stats.retries, 2);
        assert_eq!(stats.abandoned, 1);
    }

    #[tokio::test]
    async fn test_disabled_is_noop() {
        let notarizer = Notarizer::disabled();
        assert!(!notarizer.is_enabled());
        notarizer.dispatch(record());
        notarizer.wait_idle().await;
        assert_eq!(notarizer.stats(), NotaryStatsSnapshot::default());
    }

    #[test]
    fn test_payload_has_no_secret_fields() {
        let payload = String::from_utf8(record().to_payload().unwrap()).unwrap();
        assert!(payload.contains("\"event\":\"proof_issued\""));
        assert!(!payload.contains("secret"));
        assert!(!payload.contains("trapdoor"));
    }
}
