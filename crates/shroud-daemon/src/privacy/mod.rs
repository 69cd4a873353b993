pub mod identity;
pub mod nullifier;
pub mod proof;
mod service;

pub use identity::{CommitmentScheme, IdentityRegistry, InMemoryIdentityRegistry};
pub use nullifier::{ActionNullifierDeriver, InMemoryNullifierLedger, NullifierLedger};
pub use proof::{
    IssueStep, ProofBlob, ProofIssuer, ProofVerifier, VerificationFailure, VerificationOutcome,
    VerificationPolicy,
};
pub use service::{ServiceComponents, ServiceStats, ShroudService};
