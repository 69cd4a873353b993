mod backoff;
mod dispatcher;
mod record;
mod sink;

pub use backoff::BackoffStrategy;
pub use dispatcher::{Notarizer, NotaryStatsSnapshot, RetryPolicy};
pub use record::NotaryRecord;
pub use sink::{HttpNotarySink, MemorySink, NotarizationSink};
