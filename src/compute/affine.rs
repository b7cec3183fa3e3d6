//! Legacy empirical cost model
//!
//! Energy and latency per generated token are affine in the active parameter
//! count (in billions). Prompt length does not enter the energy; the FLOP
//! breakdown is still reported so results have the same shape as the FLOP
//! proxy.

use super::arithmetic::{self, SECONDS_PER_HOUR};
use super::{CostModel, EstimateResult};
use crate::config::{AffineCoefficients, Config, CostMethod, HardwareProfile, ModelProfile};

#[derive(Debug, Clone)]
pub struct AffineEstimator {
    model: ModelProfile,
    hardware: HardwareProfile,
    coefficients: AffineCoefficients,
    min_energy_wh: f64,
    num_gpus: u32,
}

impl AffineEstimator {
    pub fn new(model: ModelProfile, hardware: HardwareProfile, coefficients: AffineCoefficients) -> Self {
        let num_gpus = arithmetic::num_gpus(&model, &hardware);
        Self {
            model,
            hardware,
            coefficients,
            min_energy_wh: 0.01,
            num_gpus,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let mut estimator = Self::new(
            config.model.clone(),
            config.hardware.clone(),
            config.estimator.affine.clone(),
        );
        estimator.min_energy_wh = config.estimator.min_energy_wh.max(0.0);
        estimator
    }

    pub fn num_gpus(&self) -> u32 {
        self.num_gpus
    }

    /// GPU energy per generated token on one accelerator, in Wh
    pub fn energy_per_token_per_gpu_wh(&self) -> f64 {
        let c = &self.coefficients;
        c.energy_alpha * self.model.active_params_billions() + c.energy_beta
    }

    /// Generation latency per token, in seconds
    pub fn latency_per_token_seconds(&self) -> f64 {
        let c = &self.coefficients;
        c.latency_alpha * self.model.active_params_billions() + c.latency_beta
    }
}

impl CostModel for AffineEstimator {
    fn method(&self) -> CostMethod {
        CostMethod::Affine
    }

    fn estimate(&self, input_tokens: i64, output_tokens: i64) -> EstimateResult {
        let t_out = arithmetic::clamp_tokens(output_tokens);
        let num_gpus = self.num_gpus;
        let hw = &self.hardware;

        let gpu_energy_wh = t_out * self.energy_per_token_per_gpu_wh() * num_gpus as f64;
        let latency_seconds = t_out * self.latency_per_token_seconds();
        let server_energy_wh = arithmetic::server_energy_wh(latency_seconds, num_gpus, hw);

        let total_energy_wh = (hw.pue * (gpu_energy_wh + server_energy_wh)).max(self.min_energy_wh);

        log::debug!(
            "affine: out={} latency={:.3}s energy={:.5}Wh ({:.2} h of node time)",
            output_tokens,
            latency_seconds,
            total_energy_wh,
            latency_seconds / SECONDS_PER_HOUR
        );

        EstimateResult {
            num_gpus,
            total_energy_wh,
            co2_emissions_kg: arithmetic::co2_kg(total_energy_wh, hw),
            flop_breakdown: arithmetic::estimate_flops(&self.model, input_tokens, output_tokens),
            method: CostMethod::Affine,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_estimator() -> AffineEstimator {
        AffineEstimator::from_config(&Config::default())
    }

    #[test]
    fn test_per_token_coefficients() {
        let estimator = create_test_estimator();
        // 8.91e-5 * 101.17 + 1.43e-3
        assert!((estimator.energy_per_token_per_gpu_wh() - 0.010444247).abs() < 1e-8);
        // 8.02e-4 * 101.17 + 2.23e-2
        assert!((estimator.latency_per_token_seconds() - 0.1034383).abs() < 1e-6);
    }

    #[test]
    fn test_zero_output_is_floor() {
        let estimator = create_test_estimator();
        let result = estimator.estimate(500, 0);
        assert_eq!(result.total_energy_wh, 0.01);
        assert_eq!(result.method, CostMethod::Affine);
        // Prefill still shows up in the FLOP breakdown
        assert!(result.flop_breakdown.prefill_flops > 0.0);
    }

    #[test]
    fn test_linear_in_output_tokens() {
        let estimator = create_test_estimator();
        let e100 = estimator.estimate(0, 100).total_energy_wh;
        let e200 = estimator.estimate(0, 200).total_energy_wh;
        assert!((e200 - 2.0 * e100).abs() < 1e-12);
    }

    #[test]
    fn test_prompt_does_not_change_energy() {
        let estimator = create_test_estimator();
        assert_eq!(
            estimator.estimate(0, 100).total_energy_wh,
            estimator.estimate(50_000, 100).total_energy_wh
        );
    }

    #[test]
    fn test_hand_computed_total() {
        let estimator = create_test_estimator();
        let result = estimator.estimate(0, 10);
        let gpu = 10.0 * estimator.energy_per_token_per_gpu_wh() * 3.0;
        let latency = 10.0 * estimator.latency_per_token_seconds();
        let server = 800.0 * latency / 3600.0 * (3.0 / 8.0);
        let expected = 1.2 * (gpu + server);
        assert!((result.total_energy_wh - expected).abs() < 1e-12);
    }

    #[test]
    fn test_negative_output_clamps() {
        let estimator = create_test_estimator();
        assert_eq!(estimator.estimate(0, -10), estimator.estimate(0, 0));
    }
}
