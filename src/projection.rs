//! Projected footprint of a usage pattern
//!
//! A what-if helper layered on the estimator: synthetic exchanges arrive over
//! a number of days with token lengths drawn from the configured
//! distributions, and each is run through a cost model. Nothing else in the
//! crate depends on it.

use rand::{rngs::StdRng, SeedableRng};
use rand_distr::{Distribution, Exp};
use serde::Serialize;

use crate::compute::CostModel;
use crate::config::workload::MAX_DAYS;
use crate::config::WorkloadConfig;

pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Hard stop on generated exchanges, twice the validated expected maximum
pub const MAX_PROJECTED_EXCHANGES: usize = 20_000_000;

/// One synthetic exchange
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticExchange {
    /// Seconds since the start of the projection
    pub arrival_time: f64,
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl SyntheticExchange {
    pub fn day(&self) -> usize {
        (self.arrival_time / SECONDS_PER_DAY) as usize
    }
}

/// Generates exchanges based on workload configuration
pub struct ExchangeGenerator {
    workload: WorkloadConfig,
    rng: StdRng,
    next_arrival_time: f64,
    horizon: f64,
    exchanges_generated: usize,
}

impl ExchangeGenerator {
    pub fn new(workload: WorkloadConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(workload.seed);
        let next_arrival_time = Self::sample_next_arrival(
            0.0,
            &workload.arrival_pattern,
            workload.exchanges_per_day,
            &mut rng,
        );
        let horizon = workload.days.min(MAX_DAYS) as f64 * SECONDS_PER_DAY;

        Self {
            workload,
            rng,
            next_arrival_time,
            horizon,
            exchanges_generated: 0,
        }
    }

    /// Sample the next arrival time after `current_time`
    fn sample_next_arrival(current_time: f64, pattern: &str, per_day: f64, rng: &mut StdRng) -> f64 {
        let gap = SECONDS_PER_DAY / per_day;
        match pattern.to_lowercase().as_str() {
            "fixed_rate" => current_time + gap,
            _ => match Exp::new(per_day / SECONDS_PER_DAY) {
                Ok(exp) => current_time + exp.sample(rng),
                Err(_) => current_time + gap,
            },
        }
    }

    pub fn num_generated(&self) -> usize {
        self.exchanges_generated
    }

    pub fn is_finished(&self) -> bool {
        self.next_arrival_time >= self.horizon
    }
}

impl Iterator for ExchangeGenerator {
    type Item = SyntheticExchange;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_finished() {
            return None;
        }

        let exchange = SyntheticExchange {
            arrival_time: self.next_arrival_time,
            input_tokens: self.workload.input_len_dist.sample(&mut self.rng),
            output_tokens: self.workload.output_len_dist.sample(&mut self.rng),
        };

        self.next_arrival_time = Self::sample_next_arrival(
            self.next_arrival_time,
            &self.workload.arrival_pattern,
            self.workload.exchanges_per_day,
            &mut self.rng,
        );
        self.exchanges_generated += 1;
        Some(exchange)
    }
}

/// Aggregate footprint of a projected workload
#[derive(Debug, Clone, Serialize)]
pub struct ProjectionSummary {
    pub days: u32,
    pub exchanges: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub energy_wh: f64,
    pub co2_kg: f64,
    pub energy_per_day_wh: f64,
    pub energy_per_exchange_mean_wh: f64,
    pub energy_per_exchange_p50_wh: f64,
    pub energy_per_exchange_p90_wh: f64,
    pub energy_per_exchange_p99_wh: f64,
    /// Energy per simulated day, in Wh
    pub daily_energy_wh: Vec<f64>,
}

impl ProjectionSummary {
    pub fn print(&self) {
        println!("\n=== Projection ({} days) ===\n", self.days);
        println!("  Exchanges:     {}", self.exchanges);
        println!(
            "  Tokens:        {} in / {} out",
            self.input_tokens, self.output_tokens
        );
        println!("  Energy:        {:.2} Wh ({:.2} Wh/day)", self.energy_wh, self.energy_per_day_wh);
        println!("  Emissions:     {:.3} kg CO2e", self.co2_kg);
        println!(
            "  Per exchange:  mean={:.4}, p50={:.4}, p90={:.4}, p99={:.4} Wh",
            self.energy_per_exchange_mean_wh,
            self.energy_per_exchange_p50_wh,
            self.energy_per_exchange_p90_wh,
            self.energy_per_exchange_p99_wh
        );
    }
}

/// Run every generated exchange through `model` and aggregate
pub fn project(workload: &WorkloadConfig, model: &dyn CostModel) -> ProjectionSummary {
    let days = workload.days.clamp(1, MAX_DAYS);
    let mut daily_energy_wh = vec![0.0; days as usize];
    let mut samples = Vec::new();
    let mut input_tokens = 0u64;
    let mut output_tokens = 0u64;
    let mut co2_kg = 0.0;

    let mut generator = ExchangeGenerator::new(workload.clone());
    for exchange in generator.by_ref().take(MAX_PROJECTED_EXCHANGES) {
        let result = model.estimate(exchange.input_tokens as i64, exchange.output_tokens as i64);
        input_tokens += exchange.input_tokens as u64;
        output_tokens += exchange.output_tokens as u64;
        co2_kg += result.co2_emissions_kg;
        if let Some(day) = daily_energy_wh.get_mut(exchange.day()) {
            *day += result.total_energy_wh;
        }
        samples.push(result.total_energy_wh);
    }

    if !generator.is_finished() {
        log::warn!(
            "Projection stopped after {} exchanges; the workload exceeds the supported size",
            MAX_PROJECTED_EXCHANGES
        );
    }

    let energy_wh: f64 = samples.iter().sum();
    log::info!(
        "Projected {} exchanges over {} days: {:.2} Wh",
        samples.len(),
        days,
        energy_wh
    );

    ProjectionSummary {
        days,
        exchanges: samples.len() as u64,
        input_tokens,
        output_tokens,
        energy_wh,
        co2_kg,
        energy_per_day_wh: energy_wh / days as f64,
        energy_per_exchange_mean_wh: mean(&samples),
        energy_per_exchange_p50_wh: percentile(&samples, 0.5),
        energy_per_exchange_p90_wh: percentile(&samples, 0.9),
        energy_per_exchange_p99_wh: percentile(&samples, 0.99),
        daily_energy_wh,
    }
}

/// Calculate percentile of unsorted samples
fn percentile(samples: &[f64], p: f64) -> f64 {
    let mut sorted: Vec<f64> = samples.iter().filter(|x| !x.is_nan()).copied().collect();
    if sorted.is_empty() {
        return 0.0;
    }
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let idx = ((sorted.len() as f64 - 1.0) * p) as usize;
    sorted[idx]
}

fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}
