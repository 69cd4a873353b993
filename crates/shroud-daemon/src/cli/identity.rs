use super::commands::{IdentityAction, OutputFormat};
use super::utils::{field_line, ok_line, open_service, print_json, shutdown, warn_line, write_json};
use anyhow::{Context, Result};
use shroud_daemon::ShroudConfig;
use shroud_types::{Commitment, Hash256, IdentityRecord};

pub async fn handle_identity(action: IdentityAction, config: &ShroudConfig, format: OutputFormat) -> Result<()> {
    let (storage, service) = open_service(config)?;

    match action {
        IdentityAction::Issue { group, output } => {
            let bundle = service.issue_identity(&group).await?;

            match output {
                Some(path) => {
                    write_json(&path, &bundle)?;
                    match format {
                        OutputFormat::Json => print_json(&serde_json::json!({
                            "commitment": bundle.commitment,
                            "group_id": bundle.group_id,
                            "bundle": path,
                        }))?,
                        OutputFormat::Text => {
                            ok_line("Identity issued");
                            field_line("Commitment:", &bundle.commitment.to_hex());
                            field_line("Group:", &bundle.group_id);
                            field_line("Bundle:", &path.display().to_string());
                            warn_line("The bundle holds your secrets. Keep it private.");
                        }
                    }
                }
                None => print_json(&bundle)?,
            }
        }
        IdentityAction::Show { commitment } => {
            let commitment = parse_commitment(&commitment)?;
            match service.identity(&commitment).await? {
                Some(record) => print_record(&record, format)?,
                None => anyhow::bail!("No identity registered for {}", commitment),
            }
        }
        IdentityAction::Revoke { commitment } => {
            let commitment = parse_commitment(&commitment)?;
            let record = service.revoke_identity(&commitment).await?;
            match format {
                OutputFormat::Json => print_json(&record)?,
                OutputFormat::Text => ok_line(&format!("Identity {} revoked", record.commitment.short())),
            }
        }
    }

    shutdown(&storage, &service).await
}

fn parse_commitment(value: &str) -> Result<Commitment> {
    Hash256::from_hex(value.trim()).context("Commitment must be 64 hex characters")
}

fn print_record(record: &IdentityRecord, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(record),
        OutputFormat::Text => {
            let created = chrono::DateTime::from_timestamp(record.created_at, 0)
                .map(|t| t.to_rfc3339())
                .unwrap_or_else(|| record.created_at.to_string());
            field_line("Commitment:", &record.commitment.to_hex());
            field_line("Group:", &record.group_id);
            field_line("Group hash:", &record.group_nullifier_hash.to_hex());
            field_line("Status:", if record.is_valid { "valid" } else { "revoked" });
            field_line("Created:", &created);
            Ok(())
        }
    }
}
