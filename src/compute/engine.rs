//! FLOP-proxy energy estimator
//!
//! Turns prefill/decode FLOPs into accelerator time, then into facility
//! energy and emissions.

use super::arithmetic::{self, FlopBreakdown, SECONDS_PER_HOUR};
use super::{CostModel, EstimateResult};
use crate::config::{Config, CostMethod, HardwareProfile, ModelProfile};

/// Intermediate quantities of one FLOP-proxy estimate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyBreakdown {
    pub prefill_seconds: f64,
    pub decode_seconds: f64,
    pub gpu_energy_wh: f64,
    pub server_energy_wh: f64,
    pub it_energy_wh: f64,
    /// Facility energy before the minimum-energy floor
    pub facility_energy_wh: f64,
    pub result: EstimateResult,
}

#[derive(Debug, Clone)]
pub struct EnergyEstimator {
    model: ModelProfile,
    hardware: HardwareProfile,
    min_energy_wh: f64,
    num_gpus: u32,
}

impl EnergyEstimator {
    pub fn new(model: ModelProfile, hardware: HardwareProfile) -> Self {
        let num_gpus = arithmetic::num_gpus(&model, &hardware);
        Self {
            model,
            hardware,
            min_energy_wh: 0.01,
            num_gpus,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.model.clone(), config.hardware.clone())
            .with_min_energy_wh(config.estimator.min_energy_wh)
    }

    /// Override the reporting floor (default 0.01 Wh)
    pub fn with_min_energy_wh(mut self, min_energy_wh: f64) -> Self {
        self.min_energy_wh = min_energy_wh.max(0.0);
        self
    }

    pub fn model(&self) -> &ModelProfile {
        &self.model
    }

    pub fn hardware(&self) -> &HardwareProfile {
        &self.hardware
    }

    /// Accelerators hosting the model; a property of the deployment, not the request
    pub fn num_gpus(&self) -> u32 {
        self.num_gpus
    }

    pub fn estimate_flops(&self, input_tokens: i64, output_tokens: i64) -> FlopBreakdown {
        arithmetic::estimate_flops(&self.model, input_tokens, output_tokens)
    }

    /// Estimate with every intermediate quantity exposed
    pub fn estimate_detailed(&self, input_tokens: i64, output_tokens: i64) -> EnergyBreakdown {
        let flops = self.estimate_flops(input_tokens, output_tokens);
        let num_gpus = self.num_gpus;
        let hw = &self.hardware;

        let prefill_seconds =
            arithmetic::phase_seconds(flops.prefill_flops, hw.prefill_utilization, num_gpus, hw);
        let decode_seconds =
            arithmetic::phase_seconds(flops.decode_flops, hw.decode_utilization, num_gpus, hw);
        let total_seconds = prefill_seconds + decode_seconds;

        let gpu_energy_wh = num_gpus as f64 * hw.gpu_power_watts * total_seconds / SECONDS_PER_HOUR;
        let server_energy_wh = arithmetic::server_energy_wh(total_seconds, num_gpus, hw);
        let it_energy_wh = gpu_energy_wh + server_energy_wh;
        let facility_energy_wh = hw.pue * it_energy_wh;

        let total_energy_wh = facility_energy_wh.max(self.min_energy_wh);

        let result = EstimateResult {
            num_gpus,
            total_energy_wh,
            co2_emissions_kg: arithmetic::co2_kg(total_energy_wh, hw),
            flop_breakdown: flops,
            method: CostMethod::FlopProxy,
        };

        log::debug!(
            "flop_proxy: in={} out={} flops={:.3e} t={:.4}s energy={:.5}Wh",
            input_tokens,
            output_tokens,
            flops.total_flops,
            total_seconds,
            total_energy_wh
        );

        EnergyBreakdown {
            prefill_seconds,
            decode_seconds,
            gpu_energy_wh,
            server_energy_wh,
            it_energy_wh,
            facility_energy_wh,
            result,
        }
    }
}

impl CostModel for EnergyEstimator {
    fn method(&self) -> CostMethod {
        CostMethod::FlopProxy
    }

    fn estimate(&self, input_tokens: i64, output_tokens: i64) -> EstimateResult {
        self.estimate_detailed(input_tokens, output_tokens).result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn create_test_estimator() -> EnergyEstimator {
        EnergyEstimator::from_config(&Config::default())
    }

    #[test]
    fn test_zero_tokens_hits_floor() {
        let estimator = create_test_estimator();
        let result = estimator.estimate(0, 0);

        assert_eq!(result.total_energy_wh, 0.01);
        assert!((result.co2_emissions_kg - 4.18e-6).abs() < 1e-15);
        assert_eq!(result.flop_breakdown.total_flops, 0.0);
        assert_eq!(result.num_gpus, 3);
        assert_eq!(result.method, CostMethod::FlopProxy);
    }

    #[test]
    fn test_negative_input_equals_zero() {
        let estimator = create_test_estimator();
        assert_eq!(estimator.estimate(-5, 10), estimator.estimate(0, 10));
        assert_eq!(estimator.estimate(10, -5), estimator.estimate(10, 0));
    }

    #[test]
    fn test_no_decode_without_output() {
        let estimator = create_test_estimator();
        assert_eq!(estimator.estimate_flops(100, 0).decode_flops, 0.0);
    }

    #[test]
    fn test_num_gpus_stable() {
        let estimator = create_test_estimator();
        let first = estimator.num_gpus();
        for _ in 0..10 {
            assert_eq!(estimator.num_gpus(), first);
        }
        assert!(first >= 1);
    }

    #[test]
    fn test_energy_pipeline_by_hand() {
        let estimator = create_test_estimator();
        let detail = estimator.estimate_detailed(1000, 500);
        let flops = detail.result.flop_breakdown;

        // 3 GPUs at 1.979e15 FLOP/s
        let t_prefill = flops.prefill_flops / (0.5 * 3.0 * 1.979e15);
        let t_decode = flops.decode_flops / (0.1 * 3.0 * 1.979e15);
        assert!((detail.prefill_seconds - t_prefill).abs() < 1e-12);
        assert!((detail.decode_seconds - t_decode).abs() < 1e-12);

        let t = t_prefill + t_decode;
        let gpu = 3.0 * 700.0 * t / 3600.0;
        let server = 800.0 * t / 3600.0 * (3.0 / 8.0);
        let total = 1.2 * (gpu + server);

        assert!((detail.gpu_energy_wh - gpu).abs() < 1e-12);
        assert!((detail.server_energy_wh - server).abs() < 1e-12);
        assert!((detail.result.total_energy_wh - total).abs() < 1e-12);
        assert!(total > 0.01);
        assert!((detail.result.co2_emissions_kg - total / 1000.0 * 0.418).abs() < 1e-15);
    }

    #[test]
    fn test_long_response_above_floor() {
        let estimator = create_test_estimator();
        // ~0.8 Wh per second of accelerator time with defaults; 500 tokens is well past the floor
        let result = estimator.estimate(200, 500);
        assert!(result.total_energy_wh > 0.01);
    }

    #[test]
    fn test_energy_per_token_identity_for_single_token() {
        let estimator = create_test_estimator();
        for context in [0, 1, 100, 10_000, 100_000] {
            assert_eq!(
                estimator.energy_per_token(context, 1),
                estimator.estimate(context, 1).total_energy_wh
            );
        }
    }

    #[test]
    fn test_energy_per_token_divides_by_output() {
        let estimator = create_test_estimator();
        let total = estimator.estimate(2000, 400).total_energy_wh;
        assert!((estimator.energy_per_token(2000, 400) - total / 400.0).abs() < 1e-15);
        // Zero output divides by one
        assert_eq!(
            estimator.energy_per_token(2000, 0),
            estimator.estimate(2000, 0).total_energy_wh
        );
    }

    #[test]
    fn test_custom_floor() {
        let estimator = create_test_estimator().with_min_energy_wh(0.0);
        let result = estimator.estimate(0, 0);
        assert_eq!(result.total_energy_wh, 0.0);
        assert_eq!(result.co2_emissions_kg, 0.0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_energy_floor_holds(t_in in 0i64..200_000, t_out in 0i64..200_000) {
            let estimator = create_test_estimator();
            prop_assert!(estimator.estimate(t_in, t_out).total_energy_wh >= 0.01);
        }

        #[test]
        fn prop_co2_monotone_in_output(t_in in 0i64..100_000, t_out in 0i64..100_000) {
            let estimator = create_test_estimator();
            let a = estimator.estimate(t_in, t_out);
            let b = estimator.estimate(t_in, t_out + 1);
            prop_assert!(b.co2_emissions_kg >= a.co2_emissions_kg);
            prop_assert!(b.flop_breakdown.decode_flops > a.flop_breakdown.decode_flops);
            if a.total_energy_wh > 0.01 {
                prop_assert!(b.co2_emissions_kg > a.co2_emissions_kg);
            }
        }

        #[test]
        fn prop_prefill_monotone_in_input(t_in in 0i64..100_000, t_out in 0i64..10_000, step in 1i64..1000) {
            let estimator = create_test_estimator();
            let a = estimator.estimate_flops(t_in, t_out);
            let b = estimator.estimate_flops(t_in + step, t_out);
            prop_assert!(b.prefill_flops >= a.prefill_flops);
        }

        #[test]
        fn prop_negative_is_zero(neg in i64::MIN..0, t_out in 0i64..10_000) {
            let estimator = create_test_estimator();
            prop_assert_eq!(estimator.estimate(neg, t_out), estimator.estimate(0, t_out));
        }

        #[test]
        fn prop_result_finite(t_in in 0i64..1_000_000, t_out in 0i64..1_000_000) {
            let result = create_test_estimator().estimate(t_in, t_out);
            prop_assert!(result.total_energy_wh.is_finite());
            prop_assert!(result.co2_emissions_kg.is_finite());
            prop_assert!(result.flop_breakdown.total_flops >= 0.0);
        }
    }
}
