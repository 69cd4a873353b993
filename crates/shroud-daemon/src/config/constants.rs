pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

pub const DEFAULT_DATA_DIR_NAME: &str = ".shroud";

pub const DEFAULT_PROOF_MAX_AGE_SECS: u64 = 86_400;

pub const DEFAULT_CLOCK_SKEW_SECS: u64 = 30;

pub const DEFAULT_MAX_ISSUE_ATTEMPTS: u32 = 3;

pub const DEFAULT_NOTARY_MAX_ATTEMPTS: u32 = 5;

pub const DEFAULT_NOTARY_BASE_DELAY_MS: u64 = 500;

pub const DEFAULT_NOTARY_MAX_DELAY_MS: u64 = 30_000;

pub const DEFAULT_NOTARY_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_CACHE_CAPACITY_BYTES: u64 = 64 * 1024 * 1024;

pub const DEFAULT_FLUSH_INTERVAL_MS: u64 = 1_000;
