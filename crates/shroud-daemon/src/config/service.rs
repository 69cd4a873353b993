use serde::{Deserialize, Serialize};
use shroud_types::{ShroudError, ShroudResult};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::constants::{DEFAULT_CONFIG_FILE, DEFAULT_DATA_DIR_NAME};
use super::identity::IdentityConfig;
use super::logging::LoggingConfig;
use super::notary::NotaryConfig;
use super::proof::ProofConfig;
use super::storage::StorageSettings;
use super::types::{LogLevel, SecurityWarning, WarningSeverity};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ShroudConfig {
    pub data_dir: PathBuf,
    pub storage: StorageSettings,
    pub proof: ProofConfig,
    pub identity: IdentityConfig,
    pub notary: NotaryConfig,
    pub logging: LoggingConfig,
}

impl Default for ShroudConfig {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("/var/lib/shroud"));

        Self {
            data_dir: home.join(DEFAULT_DATA_DIR_NAME),
            storage: StorageSettings::default(),
            proof: ProofConfig::default(),
            identity: IdentityConfig::default(),
            notary: NotaryConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ShroudConfig {
    pub fn default_path() -> PathBuf {
        Self::default().data_dir.join(DEFAULT_CONFIG_FILE)
    }

    pub fn load(path: impl AsRef<Path>) -> ShroudResult<Self> {
        let path = path.as_ref();

        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .map_err(|e| ShroudError::Config(format!("Failed to read config: {}", e)))?;

            toml::from_str(&contents)
                .map_err(|e| ShroudError::Config(format!("Failed to parse config: {}", e)))?
        } else {
            info!("Config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> ShroudResult<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ShroudError::Config(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ShroudError::Config(format!("Failed to create config dir: {}", e)))?;
        }

        std::fs::write(path.as_ref(), contents)
            .map_err(|e| ShroudError::Config(format!("Failed to write config: {}", e)))?;

        info!("Configuration saved to {:?}", path.as_ref());
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `SHROUD_*` overrides read through `lookup`. Unparseable values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("SHROUD_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }

        if let Some(level) = lookup("SHROUD_LOG_LEVEL") {
            self.logging.level = LogLevel::parse(&level).unwrap_or(LogLevel::Info);
        }

        if lookup("SHROUD_LOG_JSON").is_some() {
            self.logging.json = true;
        }

        if let Some(value) = lookup("SHROUD_REQUIRE_LEDGER_ENTRY") {
            if let Some(flag) = parse_flag(&value) {
                self.proof.require_ledger_entry = flag;
                if !flag {
                    warn!("Ledger entry requirement disabled via environment");
                }
            }
        }

        if let Some(value) = lookup("SHROUD_PROOF_MAX_AGE_SECS") {
            if let Ok(secs) = value.parse::<u64>() {
                self.proof.max_age_secs = if secs == 0 { None } else { Some(secs) };
            }
        }

        if let Some(url) = lookup("SHROUD_NOTARY_CONTENT_STORE_URL") {
            self.notary.content_store_url = Some(url);
            self.notary.enabled = true;
        }

        if let Some(url) = lookup("SHROUD_NOTARY_LEDGER_URL") {
            self.notary.ledger_url = Some(url);
            self.notary.enabled = true;
        }

        if let Some(value) = lookup("SHROUD_NOTARY_ENABLED") {
            if let Some(flag) = parse_flag(&value) {
                self.notary.enabled = flag;
            }
        }
    }

    pub fn validate(&self) -> ShroudResult<()> {
        if self.identity.max_issue_attempts == 0 {
            return Err(ShroudError::Config(
                "identity.max_issue_attempts must be at least 1".into(),
            ));
        }

        if let Some(0) = self.proof.max_age_secs {
            return Err(ShroudError::Config(
                "proof.max_age_secs must be positive; omit it to disable the freshness window".into(),
            ));
        }

        if self.notary.enabled {
            if self.notary.max_attempts == 0 {
                return Err(ShroudError::Config(
                    "notary.max_attempts must be at least 1".into(),
                ));
            }

            if self.notary.base_delay_ms > self.notary.max_delay_ms {
                return Err(ShroudError::Config(
                    "notary.base_delay_ms cannot exceed notary.max_delay_ms".into(),
                ));
            }

            for (name, url) in self.notary.endpoints() {
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    return Err(ShroudError::Config(format!(
                        "Invalid {} endpoint: {}",
                        name, url
                    )));
                }
            }

            if self.notary.endpoints().is_empty() {
                warn!("Notarization enabled but no endpoints configured");
            }
        }

        if self.storage.cache_capacity_bytes < 1024 * 1024 {
            return Err(ShroudError::Config(
                "storage.cache_capacity_bytes must be at least 1 MiB".into(),
            ));
        }

        Ok(())
    }

    pub fn check_security_warnings(&self) -> Vec<SecurityWarning> {
        let mut warnings = Vec::new();

        if !self.proof.require_ledger_entry {
            warnings.push(SecurityWarning {
                severity: WarningSeverity::High,
                message: "Proofs without a ledger entry are accepted as fresh.".into(),
                recommendation: "Set proof.require_ledger_entry = true so only issued proofs verify.".into(),
            });
        }

        if self.proof.max_age_secs.is_none() {
            warnings.push(SecurityWarning {
                severity: WarningSeverity::Medium,
                message: "Proof freshness window is disabled.".into(),
                recommendation: "Set proof.max_age_secs to bound how long an issued proof verifies.".into(),
            });
        }

        for (name, url) in self.notary.endpoints() {
            if url.starts_with("http://") {
                warnings.push(SecurityWarning {
                    severity: WarningSeverity::Medium,
                    message: format!("Notary {} endpoint uses plaintext HTTP.", name),
                    recommendation: "Use an https:// endpoint for notarization.".into(),
                });
            }
        }

        if self.notary.enabled && self.notary.endpoints().is_empty() {
            warnings.push(SecurityWarning {
                severity: WarningSeverity::Low,
                message: "Notarization is enabled but has no endpoints.".into(),
                recommendation: "Configure notary.content_store_url or notary.ledger_url.".into(),
            });
        }

        warnings
    }

    pub fn log_security_warnings(&self) {
        let warnings = self.check_security_warnings();
        if warnings.is_empty() {
            info!("Security check passed - no warnings");
            return;
        }

        for warning in &warnings {
            match warning.severity {
                WarningSeverity::High => {
                    warn!("SECURITY: {}", warning.message);
                    warn!("  -> {}", warning.recommendation);
                }
                WarningSeverity::Medium => {
                    warn!("{}", warning.message);
                    info!("  -> {}", warning.recommendation);
                }
                WarningSeverity::Low => {
                    info!("Note: {}", warning.message);
                }
            }
        }
    }

    pub fn storage_path(&self) -> PathBuf {
        self.data_dir.join("db")
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
