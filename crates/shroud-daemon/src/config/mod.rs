mod constants;
mod identity;
mod logging;
mod notary;
mod proof;
mod service;
mod storage;
mod types;

pub use constants::*;
pub use identity::IdentityConfig;
pub use logging::LoggingConfig;
pub use notary::NotaryConfig;
pub use proof::ProofConfig;
pub use service::ShroudConfig;
pub use storage::StorageSettings;
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn overrides(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_default_config_validation() {
        let config = ShroudConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.proof.require_ledger_entry);
        assert_eq!(config.identity.max_issue_attempts, DEFAULT_MAX_ISSUE_ATTEMPTS);
        assert!(!config.notary.enabled);
    }

    #[test]
    fn test_zero_issue_attempts_rejected() {
        let mut config = ShroudConfig::default();
        config.identity.max_issue_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_max_age_rejected() {
        let mut config = ShroudConfig::default();
        config.proof.max_age_secs = Some(0);
        assert!(config.validate().is_err());

        config.proof.max_age_secs = None;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_notary_endpoint() {
        let mut config = ShroudConfig::default();
        config.notary.enabled = true;
        config.notary.ledger_url = Some("ftp://anchor.example".into());
        assert!(config.validate().is_err());

        config.notary.ledger_url = Some("https://anchor.example/v1".into());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_backoff_bounds_checked() {
        let mut config = ShroudConfig::default();
        config.notary.enabled = true;
        config.notary.base_delay_ms = 10_000;
        config.notary.max_delay_ms = 1_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env = overrides(&[
            ("SHROUD_DATA_DIR", "/tmp/shroud-test"),
            ("SHROUD_LOG_LEVEL", "DEBUG"),
            ("SHROUD_LOG_JSON", "1"),
            ("SHROUD_REQUIRE_LEDGER_ENTRY", "false"),
            ("SHROUD_PROOF_MAX_AGE_SECS", "0"),
            ("SHROUD_NOTARY_LEDGER_URL", "https://anchor.example"),
        ]);

        let mut config = ShroudConfig::default();
        config.apply_overrides(|k| env.get(k).cloned());

        assert_eq!(config.data_dir, std::path::PathBuf::from("/tmp/shroud-test"));
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert!(config.logging.json);
        assert!(!config.proof.require_ledger_entry);
        assert_eq!(config.proof.max_age_secs, None);
        assert!(config.notary.enabled);
        assert_eq!(config.notary.endpoints(), vec![("ledger", "https://anchor.example")]);
    }

    #[test]
    fn test_unparseable_flag_ignored() {
        let env = overrides(&[("SHROUD_REQUIRE_LEDGER_ENTRY", "maybe")]);
        let mut config = ShroudConfig::default();
        config.apply_overrides(|k| env.get(k).cloned());
        assert!(config.proof.require_ledger_entry);
    }

    #[test]
    fn test_security_warnings() {
        let config = ShroudConfig::default();
        assert!(config.check_security_warnings().is_empty());

        let mut config = ShroudConfig::default();
        config.proof.require_ledger_entry = false;
        config.proof.max_age_secs = None;
        let warnings = config.check_security_warnings();
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().any(|w| w.severity == WarningSeverity::High));
    }

    #[test]
    fn test_config_serialization() {
        let mut config = ShroudConfig::default();
        config.proof.clock_skew_secs = 5;
        config.notary.content_store_url = Some("https://store.example".into());

        let toml_str = toml::to_string_pretty(&config).expect("Failed to serialize");
        let parsed: ShroudConfig = toml::from_str(&toml_str).expect("Failed to parse");
        assert_eq!(parsed.proof.clock_skew_secs, 5);
        assert_eq!(parsed.notary.content_store_url.as_deref(), Some("https://store.example"));
        assert_eq!(parsed.data_dir, config.data_dir);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: ShroudConfig = toml::from_str("[proof]\nrequire_ledger_entry = false\n").unwrap();
        assert!(!parsed.proof.require_ledger_entry);
        assert_eq!(parsed.proof.clock_skew_secs, DEFAULT_CLOCK_SKEW_SECS);
        assert_eq!(parsed.logging.level, LogLevel::Info);
    }

    #[test]
    fn test_save_and_load() {
        let dir = std::env::temp_dir().join(format!("shroud-config-{}", std::process::id()));
        let path = dir.join("config.toml");

        let mut config = ShroudConfig::default();
        config.identity.max_issue_attempts = 7;
        config.save(&path).unwrap();

        let loaded = ShroudConfig::load(&path).unwrap();
        assert_eq!(loaded.identity.max_issue_attempts, 7);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
