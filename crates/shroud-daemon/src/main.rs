mod cli;

use clap::Parser;
use cli::{
    decrypt_content, encrypt_content, handle_config, handle_identity, handle_proof, init_logging,
    init_store, show_stats, Cli, Commands,
};
use shroud_daemon::{ShroudConfig, DEFAULT_CONFIG_FILE};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| ShroudConfig::default().data_dir);
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| data_dir.join(DEFAULT_CONFIG_FILE));

    let mut config = ShroudConfig::load(&config_path)?;
    if let Some(dir) = cli.data_dir.clone() {
        config.data_dir = dir;
    }

    init_logging(&cli, &config.logging)?;
    config.log_security_warnings();

    let format = cli.format;
    match cli.command {
        Commands::Init { force } => {
            init_store(&config_path, &config, force, format).await?;
        }
        Commands::Identity { action } => {
            handle_identity(action, &config, format).await?;
        }
        Commands::Proof { action } => {
            handle_proof(action, &config, format).await?;
        }
        Commands::Encrypt { key, input } => {
            encrypt_content(key, input, format)?;
        }
        Commands::Decrypt { input } => {
            decrypt_content(input)?;
        }
        Commands::Stats => {
            show_stats(&config, format).await?;
        }
        Commands::Config { action } => {
            handle_config(&config_path, &config, action, format)?;
        }
    }

    Ok(())
}
