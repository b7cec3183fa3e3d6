use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

fn default_min_energy_wh() -> f64 {
    0.01
}

/// Which cost model turns token counts into energy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostMethod {
    /// FLOP-based proxy: FLOPs -> accelerator time -> energy
    #[default]
    FlopProxy,
    /// Legacy empirical fit: energy per output token affine in model size
    Affine,
}

impl CostMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            CostMethod::FlopProxy => "flop_proxy",
            CostMethod::Affine => "affine",
        }
    }
}

impl std::str::FromStr for CostMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "flop_proxy" | "flop" => Ok(CostMethod::FlopProxy),
            "affine" | "linear" => Ok(CostMethod::Affine),
            _ => Err(format!("Unknown cost method: {}", s)),
        }
    }
}

impl std::fmt::Display for CostMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coefficients of the affine per-token fit
/// energy_per_token_wh = energy_alpha * active_params_billions + energy_beta
/// latency_per_token_s = latency_alpha * active_params_billions + latency_beta
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffineCoefficients {
    pub energy_alpha: f64,
    pub energy_beta: f64,
    pub latency_alpha: f64,
    pub latency_beta: f64,
}

impl Default for AffineCoefficients {
    fn default() -> Self {
        Self {
            energy_alpha: 8.91e-5,
            energy_beta: 1.43e-3,
            latency_alpha: 8.02e-4,
            latency_beta: 2.23e-2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Cost model used for estimates: "flop_proxy" or "affine"
    #[serde(default)]
    pub method: CostMethod,

    /// Smallest energy ever reported for an exchange, in Wh
    #[serde(default = "default_min_energy_wh")]
    pub min_energy_wh: f64,

    /// Only read when method = "affine"
    #[serde(default)]
    pub affine: AffineCoefficients,
}

impl EstimatorConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.min_energy_wh.is_finite() && self.min_energy_wh >= 0.0) {
            return Err(ConfigError::invalid("estimator.min_energy_wh", "must be non-negative"));
        }
        let a = &self.affine;
        if [a.energy_alpha, a.energy_beta, a.latency_alpha, a.latency_beta]
            .iter()
            .any(|c| !c.is_finite() || *c < 0.0)
        {
            return Err(ConfigError::invalid(
                "estimator.affine",
                "coefficients must be finite and non-negative",
            ));
        }
        Ok(())
    }
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            method: CostMethod::default(),
            min_energy_wh: default_min_energy_wh(),
            affine: AffineCoefficients::default(),
        }
    }
}
