use super::commands::OutputFormat;
use super::utils::{field_line, open_service, print_json};
use anyhow::Result;
use shroud_daemon::ShroudConfig;

const RECENT_AUDIT_ENTRIES: usize = 10;

pub async fn show_stats(config: &ShroudConfig, format: OutputFormat) -> Result<()> {
    let (storage, service) = open_service(config)?;

    let stats = service.stats().await?;
    let trees = storage.tree_sizes();
    let metrics = storage.storage_metrics().snapshot();
    let size_on_disk = storage.size_on_disk()?;
    let audit = storage.recent_audit(RECENT_AUDIT_ENTRIES)?;

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({
            "service": stats,
            "trees": trees,
            "storage": metrics,
            "size_on_disk": size_on_disk,
            "recent_audit": audit,
        }))?,
        OutputFormat::Text => {
            println!("\x1b[1;38;5;46mShroud statistics\x1b[0m");
            field_line("Identities:", &stats.registered_identities.to_string());
            field_line("Nullifiers:", &stats.recorded_nullifiers.to_string());
            field_line("Audit log:", &trees.audit_log.to_string());
            field_line("Disk:", &format!("{} KiB", size_on_disk / 1024));
            field_line("Notary:", if service.notarizer().is_enabled() { "enabled" } else { "disabled" });

            if !audit.is_empty() {
                println!();
                println!("\x1b[38;5;245mRecent activity\x1b[0m");
                for entry in &audit {
                    let when = chrono::DateTime::from_timestamp_millis(entry.timestamp)
                        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                        .unwrap_or_default();
                    println!(
                        "  {}  {:<16} {:<10} {}",
                        when,
                        entry.tree,
                        entry.operation,
                        entry.details.as_deref().unwrap_or("")
                    );
                }
            }
        }
    }

    Ok(())
}
