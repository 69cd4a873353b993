use super::commands::{OutputFormat, ProofAction};
use super::utils::{fail_line, field_line, ok_line, open_service, print_json, read_json, shutdown, write_json};
use anyhow::Result;
use shroud_daemon::ShroudConfig;
use shroud_types::{IdentityBundle, ProofArtifact};

pub async fn handle_proof(action: ProofAction, config: &ShroudConfig, format: OutputFormat) -> Result<()> {
    let (storage, service) = open_service(config)?;

    let accepted = match action {
        ProofAction::Issue { bundle, action, topic, output } => {
            let bundle: IdentityBundle = read_json(&bundle)?;
            let artifact = service.issue_proof(&bundle.credentials(), &action, &topic).await?;

            match output {
                Some(path) => {
                    write_json(&path, &artifact)?;
                    if format == OutputFormat::Text {
                        ok_line(&format!("Proof issued for {} / {}", action, topic));
                        field_line("Nullifier:", &artifact.nullifier_hash);
                        field_line("Artifact:", &path.display().to_string());
                    } else {
                        print_json(&artifact)?;
                    }
                }
                None => print_json(&artifact)?,
            }
            true
        }
        ProofAction::Verify { proof, action, topic } => {
            let artifact: ProofArtifact = read_json(&proof)?;
            let outcome = service.verify_proof_detailed(&artifact, &action, &topic).await?;

            match format {
                OutputFormat::Json => print_json(&outcome)?,
                OutputFormat::Text => match &outcome.reason {
                    None => ok_line("Proof accepted"),
                    Some(reason) => fail_line(&format!("Proof rejected: {}", reason)),
                },
            }
            outcome.valid
        }
    };

    shutdown(&storage, &service).await?;

    if !accepted {
        anyhow::bail!("proof verification failed");
    }
    Ok(())
}
