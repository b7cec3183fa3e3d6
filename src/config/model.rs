use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

fn default_activation_ratio() -> f64 {
    0.2
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelProfile {
    /// Model name (e.g., "GPT-4o proxy")
    pub name: String,

    /// Active non-embedding parameters that participate in each token
    pub active_params: f64,

    /// Attention FLOP coefficient, a = 4 * L * h_q * d_h
    /// Multiplies the token-pair count to give attention FLOPs
    pub attention_coeff: f64,

    /// Total parameters in the model (all experts included for MoE)
    /// Only used to size how many accelerators must hold the weights
    pub total_params: f64,

    /// Fraction of total parameters active per token (informational)
    #[serde(default = "default_activation_ratio")]
    pub activation_ratio: f64,
}

impl ModelProfile {
    /// Proxy profile for a ~300B total / ~101B active frontier chat model
    pub fn gpt4o_proxy() -> Self {
        Self {
            name: "GPT-4o proxy".to_string(),
            active_params: 1.0117e11,
            attention_coeff: 2.6351e6,
            total_params: 300e9,
            activation_ratio: default_activation_ratio(),
        }
    }

    /// Active parameters in billions, the unit the affine model is fitted in
    pub fn active_params_billions(&self) -> f64 {
        self.active_params / 1e9
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.active_params.is_finite() && self.active_params > 0.0) {
            return Err(ConfigError::invalid("model.active_params", "must be a positive number"));
        }
        if !(self.attention_coeff.is_finite() && self.attention_coeff >= 0.0) {
            return Err(ConfigError::invalid("model.attention_coeff", "must be non-negative"));
        }
        if !(self.total_params.is_finite() && self.total_params >= self.active_params) {
            return Err(ConfigError::invalid(
                "model.total_params",
                format!("must be at least active_params ({})", self.active_params),
            ));
        }
        Ok(())
    }
}

impl Default for ModelProfile {
    fn default() -> Self {
        Self::gpt4o_proxy()
    }
}
