use super::commands::Cli;
use anyhow::{anyhow, Context, Result};
use serde::Serialize;
use shroud_daemon::{LoggingConfig, ShroudConfig, ShroudService, ShroudStorage, StorageConfig};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const NOTARY_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

pub fn init_logging(cli: &Cli, logging: &LoggingConfig) -> Result<()> {
    let level = if cli.quiet {
        "warn".to_string()
    } else {
        match cli.verbose {
            0 => logging.level.to_string(),
            1 => "info,shroud_daemon=debug".to_string(),
            2 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level));

    let log_file = cli.log_file.as_ref().or(logging.file.as_ref());
    let writer = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {:?}", path))?;
            BoxMakeWriter::new(std::sync::Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let location = logging.source_location;
    let (json_layer, text_layer) = if logging.json {
        let layer = fmt::layer()
            .json()
            .with_writer(writer)
            .with_file(location)
            .with_line_number(location);
        (Some(layer), None)
    } else {
        let layer = fmt::layer()
            .with_writer(writer)
            .with_ansi(log_file.is_none())
            .with_target(cli.verbose >= 2)
            .with_file(location)
            .with_line_number(location);
        (None, Some(layer))
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialise logging: {}", e))
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let contents = serde_json::to_string_pretty(value)?;
    std::fs::write(path, contents).with_context(|| format!("Failed to write {:?}", path))
}

pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    serde_json::from_str(&contents).with_context(|| format!("Failed to parse {:?}", path))
}

pub fn read_stdin() -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    std::io::stdin()
        .read_to_end(&mut buffer)
        .context("Failed to read stdin")?;
    Ok(buffer)
}

/// Opens the sled store under the configured data directory and wires a service over it.
pub fn open_service(config: &ShroudConfig) -> Result<(Arc<ShroudStorage>, ShroudService)> {
    let storage = ShroudStorage::open(StorageConfig::from(config))
        .with_context(|| format!("Failed to open storage at {:?}", config.storage_path()))?;
    let storage = Arc::new(storage);
    let service = ShroudService::from_storage(storage.clone(), config)?;
    Ok((storage, service))
}

/// Gives in-flight notarizations a bounded window, then flushes the store.
pub async fn shutdown(storage: &ShroudStorage, service: &ShroudService) -> Result<()> {
    if tokio::time::timeout(NOTARY_DRAIN_TIMEOUT, service.notarizer().wait_idle())
        .await
        .is_err()
    {
        tracing::warn!("Notarization still in flight at exit");
    }
    storage.flush_async().await?;
    Ok(())
}

pub fn ok_line(message: &str) {
    println!("\x1b[38;5;46m[+]\x1b[0m {}", message);
}

pub fn warn_line(message: &str) {
    println!("\x1b[38;5;226m[!]\x1b[0m {}", message);
}

pub fn fail_line(message: &str) {
    println!("\x1b[38;5;196m[-]\x1b[0m {}", message);
}

pub fn field_line(label: &str, value: &str) {
    println!("  {:<14} \x1b[38;5;51m{}\x1b[0m", label, value);
}
