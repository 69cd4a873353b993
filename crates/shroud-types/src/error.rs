use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShroudError {
    #[error("Capability already used for this action and topic")]
    AlreadyUsed,

    #[error("Malformed proof: {0}")]
    MalformedProof(String),

    #[error("Unknown identity commitment")]
    UnknownCommitment,

    #[error("Identity has been revoked")]
    RevokedIdentity,

    #[error("Credentials do not open the identity commitment")]
    CredentialMismatch,

    #[error("Identity commitment already registered")]
    DuplicateCommitment,

    #[error("Nullifier already recorded")]
    DuplicateNullifier,

    #[error("Authentication failure")]
    AuthenticationFailure,

    #[error("Proof has no matching ledger entry")]
    Unverifiable,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Notarization error: {0}")]
    Notarization(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ShroudError {
    /// Replay rejections are routine outcomes, not faults.
    pub fn is_replay(&self) -> bool {
        matches!(self, ShroudError::AlreadyUsed | ShroudError::DuplicateNullifier)
    }
}

pub type ShroudResult<T> = Result<T, ShroudError>;
