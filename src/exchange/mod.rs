pub mod entry;
pub mod history;
pub mod store;
pub mod tokens;

pub use entry::{Exchange, LogEntry};
pub use history::{ExchangeLog, RecordOutcome};
pub use store::{JsonFileStore, LogStore, MemoryStore};
pub use tokens::approx_token_count;
