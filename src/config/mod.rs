pub mod estimator;
pub mod hardware;
pub mod model;
pub mod workload;

pub use estimator::{AffineCoefficients, CostMethod, EstimatorConfig};
pub use hardware::HardwareProfile;
pub use model::ModelProfile;
pub use workload::{LengthDistribution, WorkloadConfig};

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Top-level configuration that aggregates all sub-configs
///
/// Every section and every field is optional in TOML; anything missing falls
/// back to the built-in proxy profile, so an empty file is a valid
/// configuration and a section may override a single knob.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelProfile,
    #[serde(default)]
    pub hardware: HardwareProfile,
    #[serde(default)]
    pub estimator: EstimatorConfig,
    #[serde(default)]
    pub workload: WorkloadConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&contents)?;
        log::info!(
            "Loaded config from {}: model={}, hardware={}, method={}",
            path.as_ref().display(),
            config.model.name,
            config.hardware.name,
            config.estimator.method
        );
        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.model.validate()?;
        self.hardware.validate()?;
        self.estimator.validate()?;
        self.workload.validate()?;
        Ok(())
    }
}
