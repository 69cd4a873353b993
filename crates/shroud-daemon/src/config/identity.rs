use serde::{Deserialize, Serialize};
use super::constants::DEFAULT_MAX_ISSUE_ATTEMPTS;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub max_issue_attempts: u32,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            max_issue_attempts: DEFAULT_MAX_ISSUE_ATTEMPTS,
        }
    }
}
