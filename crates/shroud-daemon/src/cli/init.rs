use super::commands::OutputFormat;
use super::utils::{field_line, ok_line, open_service, print_json, warn_line};
use anyhow::{Context, Result};
use shroud_daemon::ShroudConfig;
use std::path::Path;

pub async fn init_store(
    config_path: &Path,
    config: &ShroudConfig,
    force: bool,
    format: OutputFormat,
) -> Result<()> {
    if config_path.exists() && !force {
        warn_line(&format!("Configuration already exists at {:?}", config_path));
        println!("Use --force to overwrite");
        return Ok(());
    }

    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("Failed to create data directory {:?}", config.data_dir))?;

    config.save(config_path)?;

    let (storage, service) = open_service(config)?;
    let schema_version = storage.schema_version()?;
    let stats = service.stats().await?;
    storage.flush_async().await?;

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "config": config_path,
            "data_dir": config.data_dir,
            "storage": config.storage_path(),
            "schema_version": schema_version,
            "registered_identities": stats.registered_identities,
            "recorded_nullifiers": stats.recorded_nullifiers,
        }))?,
        OutputFormat::Text => {
            ok_line("Shroud initialized");
            field_line("Config:", &config_path.display().to_string());
            field_line("Data:", &config.data_dir.display().to_string());
            field_line("Schema:", &format!("v{}", schema_version));
            println!();
            println!("Next: \x1b[38;5;51mshroud identity issue --group <GROUP>\x1b[0m");
        }
    }

    Ok(())
}
