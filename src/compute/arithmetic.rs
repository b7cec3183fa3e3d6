//! Core inference-cost formulas shared by the cost models

use serde::{Deserialize, Serialize};

use crate::config::{HardwareProfile, ModelProfile};

/// Utilization floor used in time denominators
pub const MIN_UTILIZATION: f64 = 1e-9;

pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// FLOPs split by inference phase
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlopBreakdown {
    pub prefill_flops: f64,
    pub decode_flops: f64,
    pub total_flops: f64,
}

/// Clamp a token count to a non-negative float
pub fn clamp_tokens(tokens: i64) -> f64 {
    tokens.max(0) as f64
}

/// Coerce a JS-style number to a token count: NaN, infinities and negatives become 0
pub fn tokens_from_f64(value: f64) -> i64 {
    if value.is_finite() && value > 0.0 {
        value.trunc().min(i64::MAX as f64) as i64
    } else {
        0
    }
}

/// Calculate prefill and decode FLOPs
/// F_prefill = 2 * N * Tin + a * Tin^2
/// F_decode  = 2 * N * Tout + a * (Tin * Tout + Tout * (Tout - 1) / 2)
pub fn estimate_flops(model: &ModelProfile, input_tokens: i64, output_tokens: i64) -> FlopBreakdown {
    let t_in = clamp_tokens(input_tokens);
    let t_out = clamp_tokens(output_tokens);
    let n = model.active_params;
    let a = model.attention_coeff;

    // Linear matmul term plus full self-attention over the prompt
    let prefill_flops = 2.0 * n * t_in + a * t_in * t_in;

    // Each generated token attends to the whole prompt and to every earlier
    // generated token; the second sum is 0 + 1 + ... + (Tout - 1)
    let decode_flops = if t_out > 0.0 {
        2.0 * n * t_out + a * (t_in * t_out + t_out * (t_out - 1.0) / 2.0)
    } else {
        0.0
    };

    FlopBreakdown {
        prefill_flops,
        decode_flops,
        total_flops: prefill_flops + decode_flops,
    }
}

/// Number of accelerators needed to keep the full model resident
/// Formula: ceil(overhead * total_params * bits / 8 / memory_per_gpu), at least 1
pub fn num_gpus(model: &ModelProfile, hardware: &HardwareProfile) -> u32 {
    let required = hardware.resident_bytes(model.total_params);
    let gpus = (required / hardware.gpu_memory_bytes).ceil();
    if gpus.is_finite() && gpus >= 1.0 {
        gpus.min(u32::MAX as f64) as u32
    } else {
        1
    }
}

/// Wall-clock seconds to execute `flops` on `num_gpus` accelerators at `utilization`
/// Assumes perfect linear scaling across accelerators
pub fn phase_seconds(flops: f64, utilization: f64, num_gpus: u32, hardware: &HardwareProfile) -> f64 {
    let effective_flops = utilization.max(MIN_UTILIZATION) * num_gpus as f64 * hardware.gpu_flops_per_sec;
    if effective_flops > 0.0 {
        flops / effective_flops
    } else {
        0.0
    }
}

/// Non-accelerator server energy, amortized by the fraction of a node in use
pub fn server_energy_wh(seconds: f64, num_gpus: u32, hardware: &HardwareProfile) -> f64 {
    let node_fraction = num_gpus as f64 / hardware.gpus_per_node.max(1) as f64;
    hardware.server_overhead_watts_per_node * seconds / SECONDS_PER_HOUR * node_fraction
}

/// Emissions in kg for an energy in Wh
pub fn co2_kg(energy_wh: f64, hardware: &HardwareProfile) -> f64 {
    energy_wh / 1000.0 * hardware.emission_factor_kg_per_kwh
}
