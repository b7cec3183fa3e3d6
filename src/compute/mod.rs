pub mod affine;
pub mod arithmetic;
pub mod engine;

pub use affine::AffineEstimator;
pub use arithmetic::FlopBreakdown;
pub use engine::{EnergyBreakdown, EnergyEstimator};

use serde::{Deserialize, Serialize};

use crate::config::{Config, CostMethod};

/// Energy and emissions attributed to one exchange
///
/// Serialized in camelCase. `energyUsage` and `co2Emissions`, the keys the
/// browser extension writes, are accepted when reading, and missing fields
/// read as zero so partial log entries still aggregate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EstimateResult {
    #[serde(rename = "numGPUs", alias = "numGpus")]
    pub num_gpus: u32,
    #[serde(alias = "energyUsage")]
    pub total_energy_wh: f64,
    #[serde(alias = "co2Emissions")]
    pub co2_emissions_kg: f64,
    pub flop_breakdown: FlopBreakdown,
    pub method: CostMethod,
}

/// A strategy that turns token counts into an energy estimate
///
/// Implementations must be pure: the same arguments always give the same
/// result, and negative token counts behave as zero.
pub trait CostModel: Send + Sync {
    fn method(&self) -> CostMethod;

    fn estimate(&self, input_tokens: i64, output_tokens: i64) -> EstimateResult;

    /// Energy per generated token in Wh; prefill is amortized over the output
    fn energy_per_token(&self, input_tokens: i64, output_tokens: i64) -> f64 {
        self.estimate(input_tokens, output_tokens).total_energy_wh / output_tokens.max(1) as f64
    }
}

/// Build the cost model selected by `estimator.method`
pub fn cost_model(config: &Config) -> Box<dyn CostModel> {
    match config.estimator.method {
        CostMethod::FlopProxy => Box::new(EnergyEstimator::from_config(config)),
        CostMethod::Affine => Box::new(AffineEstimator::from_config(config)),
    }
}
