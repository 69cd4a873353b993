mod commitment;
mod registry;

pub use commitment::CommitmentScheme;
pub use registry::{IdentityRegistry, InMemoryIdentityRegistry};
