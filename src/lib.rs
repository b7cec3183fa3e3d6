pub mod compute;
pub mod config;
pub mod error;
pub mod exchange;
pub mod projection;
pub mod stats;

#[cfg(feature = "cli")]
pub mod visualization;

#[cfg(target_arch = "wasm32")]
pub mod wasm;

// Re-export key types
pub use compute::{
    cost_model, AffineEstimator, CostModel, EnergyBreakdown, EnergyEstimator, EstimateResult,
    FlopBreakdown,
};
pub use config::{Config, CostMethod, HardwareProfile, ModelProfile};
pub use error::{ConfigError, StoreError};
pub use exchange::{approx_token_count, Exchange, ExchangeLog, JsonFileStore, LogEntry, LogStore};
pub use projection::{project, ExchangeGenerator, ProjectionSummary};
pub use stats::{UsageCollector, UsageSummary};

#[cfg(feature = "cli")]
pub use visualization::{ContextSweep, SweepPoint};
