use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

fn default_memory_overhead_multiplier() -> f64 {
    1.2
}

fn default_gpus_per_node() -> u32 {
    8
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HardwareProfile {
    /// Accelerator name (e.g., "H100", "A100")
    pub name: String,

    /// Sustained power draw of one accelerator under load, in watts
    pub gpu_power_watts: f64,

    /// Peak throughput of one accelerator in FLOP/s (bf16)
    pub gpu_flops_per_sec: f64,

    /// Fraction of peak realized during prefill (compute-bound)
    pub prefill_utilization: f64,

    /// Fraction of peak realized during decode (memory-bandwidth-bound)
    pub decode_utilization: f64,

    /// Addressable memory per accelerator in bytes
    pub gpu_memory_bytes: f64,

    /// Bits per weight assumed when sizing memory residency
    pub weight_bits: u32,

    /// Inflation for activations, KV cache and fragmentation
    #[serde(default = "default_memory_overhead_multiplier")]
    pub memory_overhead_multiplier: f64,

    /// Non-accelerator power of one server node, in watts
    pub server_overhead_watts_per_node: f64,

    /// Accelerators installed per node
    #[serde(default = "default_gpus_per_node")]
    pub gpus_per_node: u32,

    /// Power usage effectiveness: facility energy / IT energy
    pub pue: f64,

    /// Grid carbon intensity in kgCO2e per kWh
    pub emission_factor_kg_per_kwh: f64,
}

impl HardwareProfile {
    /// H100 80GB class node with world-average grid intensity
    pub fn h100() -> Self {
        Self {
            name: "H100 80GB".to_string(),
            gpu_power_watts: 700.0,
            gpu_flops_per_sec: 1.979e15,
            prefill_utilization: 0.5,
            decode_utilization: 0.1,
            gpu_memory_bytes: 80e9,
            weight_bits: 4,
            memory_overhead_multiplier: default_memory_overhead_multiplier(),
            server_overhead_watts_per_node: 800.0,
            gpus_per_node: default_gpus_per_node(),
            pue: 1.2,
            emission_factor_kg_per_kwh: 0.418,
        }
    }

    /// Bytes needed to keep `params` weights resident, overhead included
    pub fn resident_bytes(&self, params: f64) -> f64 {
        self.memory_overhead_multiplier * params * (self.weight_bits as f64 / 8.0)
    }

    pub fn validate(&self) -> Result<()> {
        positive("hardware.gpu_power_watts", self.gpu_power_watts)?;
        positive("hardware.gpu_flops_per_sec", self.gpu_flops_per_sec)?;
        positive("hardware.gpu_memory_bytes", self.gpu_memory_bytes)?;
        utilization("hardware.prefill_utilization", self.prefill_utilization)?;
        utilization("hardware.decode_utilization", self.decode_utilization)?;

        if self.weight_bits == 0 {
            return Err(ConfigError::invalid("hardware.weight_bits", "must be at least 1"));
        }
        if !(self.memory_overhead_multiplier.is_finite() && self.memory_overhead_multiplier >= 1.0) {
            return Err(ConfigError::invalid(
                "hardware.memory_overhead_multiplier",
                "must be at least 1.0",
            ));
        }
        if !(self.server_overhead_watts_per_node.is_finite() && self.server_overhead_watts_per_node >= 0.0) {
            return Err(ConfigError::invalid(
                "hardware.server_overhead_watts_per_node",
                "must be non-negative",
            ));
        }
        if self.gpus_per_node == 0 {
            return Err(ConfigError::invalid("hardware.gpus_per_node", "must be at least 1"));
        }
        if !(self.pue.is_finite() && self.pue >= 1.0) {
            return Err(ConfigError::invalid("hardware.pue", "must be at least 1.0"));
        }
        if !(self.emission_factor_kg_per_kwh.is_finite() && self.emission_factor_kg_per_kwh >= 0.0) {
            return Err(ConfigError::invalid(
                "hardware.emission_factor_kg_per_kwh",
                "must be non-negative",
            ));
        }
        Ok(())
    }
}

impl Default for HardwareProfile {
    fn default() -> Self {
        Self::h100()
    }
}

fn positive(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be positive, got {}", value)))
    }
}

fn utilization(field: &'static str, value: f64) -> Result<()> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be in (0, 1], got {}", value)))
    }
}
