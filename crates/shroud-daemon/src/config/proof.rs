use serde::{Deserialize, Serialize};
use super::constants::{DEFAULT_CLOCK_SKEW_SECS, DEFAULT_PROOF_MAX_AGE_SECS};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ProofConfig {
    /// Reject proofs whose nullifier has no ledger entry instead of treating them as fresh.
    pub require_ledger_entry: bool,
    /// `None` disables the freshness window.
    pub max_age_secs: Option<u64>,
    pub clock_skew_secs: u64,
}

impl Default for ProofConfig {
    fn default() -> Self {
        Self {
            require_ledger_entry: true,
            max_age_secs: Some(DEFAULT_PROOF_MAX_AGE_SECS),
            clock_skew_secs: DEFAULT_CLOCK_SKEW_SECS,
        }
    }
}
