mod config;
mod identities;
mod metrics;
mod nullifiers;
mod secrets;
mod types;

pub use config::*;
pub use metrics::*;
pub use types::*;

use shroud_types::{ShroudError, ShroudResult};
use sled::{Db, Tree};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

const CURRENT_SCHEMA_VERSION: u32 = 1;
const SCHEMA_KEY: &[u8] = b"__schema_version__";

/// Durable registry, ledger and key store over sled.
pub struct ShroudStorage {
    db: Db,
    schema: Tree,
    identities: Tree,
    group_nullifiers: Tree,
    nullifiers: Tree,
    secrets: Tree,
    audit_log: Tree,
    storage_config: StorageConfig,
    metrics: Arc<StorageMetrics>,
    opened_at: Instant,
}

impl ShroudStorage {
    pub fn open(config: StorageConfig) -> ShroudResult<Self> {
        let path = &config.path;
        info!("Opening storage at {:?}", path);

        let db = sled::Config::new()
            .path(path)
            .cache_capacity(config.cache_capacity_bytes)
            .mode(sled::Mode::HighThroughput)
            .flush_every_ms(config.flush_every_ms)
            .open()
            .map_err(|e| ShroudError::Storage(format!("Failed to open database: {}", e)))?;

        let storage = Self::create_from_db(db, config)?;
        storage.ensure_schema()?;

        info!("Storage opened successfully (schema version {})", CURRENT_SCHEMA_VERSION);
        Ok(storage)
    }

    pub fn in_memory() -> ShroudResult<Self> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .map_err(|e| ShroudError::Storage(format!("Failed to open temp database: {}", e)))?;

        let config = StorageConfig {
            path: std::path::PathBuf::new(),
            ..Default::default()
        };

        let storage = Self::create_from_db(db, config)?;
        storage.ensure_schema()?;
        Ok(storage)
    }

    fn create_from_db(db: Db, config: StorageConfig) -> ShroudResult<Self> {
        Ok(Self {
            schema: Self::open_tree(&db, "schema")?,
            identities: Self::open_tree(&db, "identities")?,
            group_nullifiers: Self::open_tree(&db, "group_nullifiers")?,
            nullifiers: Self::open_tree(&db, "nullifiers")?,
            secrets: Self::open_tree(&db, "secrets")?,
            audit_log: Self::open_tree(&db, "audit_log")?,
            db,
            storage_config: config,
            metrics: Arc::new(StorageMetrics::new()),
            opened_at: Instant::now(),
        })
    }

    fn open_tree(db: &Db, name: &str) -> ShroudResult<Tree> {
        db.open_tree(name)
            .map_err(|e| ShroudError::Storage(format!("Failed to open {} tree: {}", name, e)))
    }

    fn ensure_schema(&self) -> ShroudResult<()> {
        match self.schema_version()? {
            0 => self.initialize_schema(),
            version if version > CURRENT_SCHEMA_VERSION => Err(ShroudError::Storage(format!(
                "Database schema version {} is newer than supported {}",
                version, CURRENT_SCHEMA_VERSION
            ))),
            _ => Ok(()),
        }
    }

    fn initialize_schema(&self) -> ShroudResult<()> {
        info!("Initializing new database with schema version {}", CURRENT_SCHEMA_VERSION);
        self.write_schema(&SchemaInfo {
            version: CURRENT_SCHEMA_VERSION,
            created_at: chrono::Utc::now().timestamp(),
        })?;
        self.flush()
    }

    fn write_schema(&self, info: &SchemaInfo) -> ShroudResult<()> {
        let bytes = bincode::serialize(info)
            .map_err(|e| ShroudError::Storage(format!("Failed to serialize schema: {}", e)))?;

        self.schema
            .insert(SCHEMA_KEY, bytes)
            .map_err(|e| ShroudError::Storage(format!("Failed to store schema: {}", e)))?;
        Ok(())
    }

    /// Stored schema version, `0` for an uninitialized database.
    pub fn schema_version(&self) -> ShroudResult<u32> {
        match self
            .schema
            .get(SCHEMA_KEY)
            .map_err(|e| ShroudError::Storage(format!("Failed to read schema: {}", e)))?
        {
            Some(bytes) => {
                let info: SchemaInfo = bincode::deserialize(&bytes)
                    .map_err(|e| ShroudError::Storage(format!("Failed to deserialize schema: {}", e)))?;
                Ok(info.version)
            }
            None => Ok(0),
        }
    }

    fn log_audit(&self, tree: &str, operation: &str, details: Option<&str>) -> ShroudResult<()> {
        let entry = AuditLogEntry {
            timestamp: chrono::Utc::now().timestamp_millis(),
            tree: tree.to_string(),
            operation: operation.to_string(),
            details: details.map(String::from),
        };

        let id = self
            .db
            .generate_id()
            .map_err(|e| ShroudError::Storage(format!("Audit id error: {}", e)))?;
        let mut key = [0u8; 16];
        key[..8].copy_from_slice(&entry.timestamp.to_be_bytes());
        key[8..].copy_from_slice(&id.to_be_bytes());

        let value = bincode::serialize(&entry)
            .map_err(|e| ShroudError::Storage(format!("Audit serialize error: {}", e)))?;

        self.audit_log
            .insert(key, value)
            .map_err(|e| ShroudError::Storage(format!("Audit write error: {}", e)))?;

        Ok(())
    }

    /// Audits a write that has already committed. A failed audit write is
    /// logged and counted, never reported as a failure of the write itself.
    pub(crate) fn audit_committed(&self, tree: &str, operation: &str, details: Option<&str>) {
        let outcome = self.log_audit(tree, operation, details);
        self.settle_audit(outcome, tree, operation);
    }

    fn settle_audit(&self, outcome: ShroudResult<()>, tree: &str, operation: &str) {
        if let Err(e) = outcome {
            self.metrics.errors.fetch_add(1, Ordering::Relaxed);
            error!(tree, operation, error = %e, "Audit write failed after commit");
        }
    }

    /// Most recent audit entries, oldest first.
    pub fn recent_audit(&self, limit: usize) -> ShroudResult<Vec<AuditLogEntry>> {
        let mut entries = Vec::with_capacity(limit);
        for item in self.audit_log.iter().rev().take(limit) {
            let (_, value) = item.map_err(|e| ShroudError::Storage(format!("Audit read error: {}", e)))?;
            let entry: AuditLogEntry = bincode::deserialize(&value)
                .map_err(|e| ShroudError::Storage(format!("Audit deserialize error: {}", e)))?;
            entries.push(entry);
        }
        entries.reverse();
        Ok(entries)
    }

    pub fn tree_sizes(&self) -> TreeSizes {
        TreeSizes {
            identities: self.identities.len(),
            group_nullifiers: self.group_nullifiers.len(),
            nullifiers: self.nullifiers.len(),
            audit_log: self.audit_log.len(),
        }
    }

    pub fn flush(&self) -> ShroudResult<()> {
        self.metrics.flushes.fetch_add(1, Ordering::Relaxed);
        self.db
            .flush()
            .map_err(|e| ShroudError::Storage(format!("Flush error: {}", e)))?;
        Ok(())
    }

    pub async fn flush_async(&self) -> ShroudResult<()> {
        self.metrics.flushes.fetch_add(1, Ordering::Relaxed);
        self.db
            .flush_async()
            .await
            .map_err(|e| ShroudError::Storage(format!("Flush error: {}", e)))?;
        Ok(())
    }

    pub fn size_on_disk(&self) -> ShroudResult<u64> {
        self.db
            .size_on_disk()
            .map_err(|e| ShroudError::Storage(format!("Size error: {}", e)))
    }

    pub fn storage_metrics(&self) -> Arc<StorageMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn uptime(&self) -> std::time::Duration {
        self.opened_at.elapsed()
    }

    pub fn data_path(&self) -> &std::path::Path {
        &self.storage_config.path
    }

    pub fn is_in_memory(&self) -> bool {
        self.storage_config.path.as_os_str().is_empty()
    }

    fn storage_error(&self, context: &str, e: impl std::fmt::Display) -> ShroudError {
        self.metrics.errors.fetch_add(1, Ordering::Relaxed);
        tracing::error!("{}: {}", context, e);
        ShroudError::Storage(format!("{}: {}", context, e))
    }
}
