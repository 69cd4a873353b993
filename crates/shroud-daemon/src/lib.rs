#![allow(missing_docs)]
#![warn(clippy::all)]

//! Single-use action proofs over identity commitments.
//!
//! A participant is issued an identity commitment once, then asks for one
//! proof per `(action, topic)` slot. The nullifier ledger accepts each slot's
//! nullifier exactly once, so a second request for the same slot is rejected
//! even under concurrent load.

pub mod config;
pub mod notary;
pub mod privacy;
pub mod storage;

pub use config::{
    IdentityConfig, LogLevel, LoggingConfig, NotaryConfig, ProofConfig, ShroudConfig,
    StorageSettings, DEFAULT_CONFIG_FILE,
};
pub use notary::{
    BackoffStrategy, HttpNotarySink, MemorySink, NotarizationSink, Notarizer, NotaryRecord,
    NotaryStatsSnapshot, RetryPolicy,
};
pub use privacy::{
    ActionNullifierDeriver, CommitmentScheme, IdentityRegistry, InMemoryIdentityRegistry,
    InMemoryNullifierLedger, IssueStep, NullifierLedger, ProofBlob, ProofIssuer, ProofVerifier,
    ServiceComponents, ServiceStats, ShroudService, VerificationFailure, VerificationOutcome,
    VerificationPolicy,
};
pub use storage::{ShroudStorage, StorageConfig, StorageMetrics};
