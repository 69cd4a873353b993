use super::commands::{ConfigAction, OutputFormat};
use super::utils::print_json;
use anyhow::Result;
use shroud_daemon::ShroudConfig;
use std::path::Path;

pub fn handle_config(
    config_path: &Path,
    config: &ShroudConfig,
    action: Option<ConfigAction>,
    format: OutputFormat,
) -> Result<()> {
    match action {
        Some(ConfigAction::Show) | None => match format {
            OutputFormat::Json => print_json(config)?,
            OutputFormat::Text => {
                if !config_path.exists() {
                    println!("\x1b[38;5;245m# No configuration file at {:?}; showing defaults\x1b[0m", config_path);
                }
                print!("{}", toml::to_string_pretty(config)?);
            }
        },
        Some(ConfigAction::Path) => println!("{}", config_path.display()),
    }
    Ok(())
}
