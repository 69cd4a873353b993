mod deriver;
mod ledger;

pub use deriver::ActionNullifierDeriver;
pub(crate) use ledger::entry_matches;
pub use ledger::{InMemoryNullifierLedger, NullifierLedger};
