pub mod collector;
pub mod comparisons;
pub mod format;
pub mod summary;

pub use collector::{start_of_local_day_ms, UsageCollector};
pub use comparisons::Comparisons;
pub use format::{format_fixed, format_number};
pub use summary::{PeriodStats, UsageSummary};
