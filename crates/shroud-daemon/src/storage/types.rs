use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaInfo {
    pub version: u32,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeSizes {
    pub identities: usize,
    pub group_nullifiers: usize,
    pub nullifiers: usize,
    pub audit_log: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub timestamp: i64,
    pub tree: String,
    pub operation: String,
    pub details: Option<String>,
}
