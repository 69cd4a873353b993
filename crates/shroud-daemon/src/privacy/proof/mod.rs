mod issuer;
mod types;
mod verifier;

pub use issuer::{IssueStep, ProofIssuer};
pub use types::{ProofBlob, VerificationFailure, VerificationOutcome, VerificationPolicy};
pub use verifier::ProofVerifier;
