use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

fn default_arrival_pattern() -> String {
    "poisson".to_string()
}

fn default_days() -> u32 {
    30
}

/// Longest projection accepted, in days
pub const MAX_DAYS: u32 = 3650;

/// Largest expected number of exchanges (per day times days) accepted
pub const MAX_EXPECTED_EXCHANGES: f64 = 1e7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkloadConfig {
    /// Arrival pattern: "poisson" or "fixed_rate"
    #[serde(default = "default_arrival_pattern")]
    pub arrival_pattern: String,

    /// Mean number of exchanges per day
    pub exchanges_per_day: f64,

    /// Number of days to project
    #[serde(default = "default_days")]
    pub days: u32,

    /// Prompt length distribution (tokens)
    pub input_len_dist: LengthDistribution,

    /// Response length distribution (tokens)
    pub output_len_dist: LengthDistribution,

    /// Random seed for reproducibility
    pub seed: u64,
}

impl WorkloadConfig {
    pub fn validate(&self) -> Result<()> {
        match self.arrival_pattern.to_lowercase().as_str() {
            "poisson" | "fixed_rate" => {}
            other => {
                return Err(ConfigError::invalid(
                    "workload.arrival_pattern",
                    format!("unknown pattern {:?}", other),
                ))
            }
        }
        if !(self.exchanges_per_day.is_finite() && self.exchanges_per_day > 0.0) {
            return Err(ConfigError::invalid("workload.exchanges_per_day", "must be positive"));
        }
        if self.days == 0 || self.days > MAX_DAYS {
            return Err(ConfigError::invalid(
                "workload.days",
                format!("must be between 1 and {}", MAX_DAYS),
            ));
        }
        if self.exchanges_per_day * self.days as f64 > MAX_EXPECTED_EXCHANGES {
            return Err(ConfigError::invalid(
                "workload.exchanges_per_day",
                format!(
                    "{} per day over {} days exceeds {:.0e} exchanges",
                    self.exchanges_per_day, self.days, MAX_EXPECTED_EXCHANGES
                ),
            ));
        }
        self.input_len_dist.validate("workload.input_len_dist")?;
        self.output_len_dist.validate("workload.output_len_dist")?;
        Ok(())
    }
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            arrival_pattern: default_arrival_pattern(),
            exchanges_per_day: 25.0,
            days: default_days(),
            input_len_dist: LengthDistribution::LogNormal { mean: 4.5, std_dev: 1.0 },
            output_len_dist: LengthDistribution::LogNormal { mean: 5.8, std_dev: 0.7 },
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum LengthDistribution {
    #[serde(rename = "fixed")]
    Fixed { value: u32 },

    #[serde(rename = "uniform")]
    Uniform { min: u32, max: u32 },

    #[serde(rename = "normal")]
    Normal { mean: f64, std_dev: f64 },

    #[serde(rename = "lognormal")]
    LogNormal { mean: f64, std_dev: f64 },
}

impl LengthDistribution {
    /// Sample a token count from this distribution
    pub fn sample<R: rand::Rng>(&self, rng: &mut R) -> u32 {
        use rand_distr::Distribution;

        match self {
            LengthDistribution::Fixed { value } => *value,
            LengthDistribution::Uniform { min, max } => {
                if min >= max {
                    *min
                } else {
                    rng.gen_range(*min..=*max)
                }
            }
            LengthDistribution::Normal { mean, std_dev } => rand_distr::Normal::new(*mean, *std_dev)
                .map(|normal| normal.sample(rng).max(1.0) as u32)
                .unwrap_or(mean.max(1.0) as u32),
            LengthDistribution::LogNormal { mean, std_dev } => {
                rand_distr::LogNormal::new(*mean, *std_dev)
                    .map(|lognormal| lognormal.sample(rng).max(1.0) as u32)
                    .unwrap_or(mean.exp().max(1.0) as u32)
            }
        }
    }

    fn validate(&self, field: &'static str) -> Result<()> {
        match self {
            LengthDistribution::Fixed { .. } => Ok(()),
            LengthDistribution::Uniform { min, max } if min > max => Err(ConfigError::invalid(
                field,
                format!("uniform min {} exceeds max {}", min, max),
            )),
            LengthDistribution::Uniform { .. } => Ok(()),
            LengthDistribution::Normal { mean, std_dev }
            | LengthDistribution::LogNormal { mean, std_dev } => {
                if mean.is_finite() && std_dev.is_finite() && *std_dev >= 0.0 {
                    Ok(())
                } else {
                    Err(ConfigError::invalid(field, "mean and std_dev must be finite, std_dev >= 0"))
                }
            }
        }
    }
}
