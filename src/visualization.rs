use plotters::prelude::*;
use serde::Serialize;
use std::error::Error;

use crate::compute::CostModel;
use crate::config::CostMethod;
use crate::projection::ProjectionSummary;

/// Energy of one exchange at a given context length
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepPoint {
    pub context_tokens: u32,
    pub energy_per_token_wh: f64,
    pub total_energy_wh: f64,
    pub co2_kg: f64,
}

/// Sweep points produced by one cost model
#[derive(Debug, Clone, Serialize)]
pub struct SweepSeries {
    pub method: CostMethod,
    pub points: Vec<SweepPoint>,
}

/// Collect and plot energy per generated token across context lengths
#[derive(Debug, Clone, Serialize)]
pub struct ContextSweep {
    pub output_tokens: u32,
    pub series: Vec<SweepSeries>,
}

impl ContextSweep {
    pub fn new(output_tokens: u32) -> Self {
        Self {
            output_tokens,
            series: Vec::new(),
        }
    }

    /// Powers of two from 128 up to and including `max_context`
    pub fn default_contexts(max_context: u32) -> Vec<u32> {
        let mut contexts = Vec::new();
        let mut context = 128u32;
        while context <= max_context {
            contexts.push(context);
            match context.checked_mul(2) {
                Some(next) => context = next,
                None => break,
            }
        }
        contexts
    }

    /// Evaluate `model` at each context length and record the series
    pub fn add_series(&mut self, model: &dyn CostModel, contexts: &[u32]) {
        let output_tokens = self.output_tokens as i64;
        let points = contexts
            .iter()
            .map(|&context| {
                let result = model.estimate(context as i64, output_tokens);
                SweepPoint {
                    context_tokens: context,
                    energy_per_token_wh: model.energy_per_token(context as i64, output_tokens),
                    total_energy_wh: result.total_energy_wh,
                    co2_kg: result.co2_emissions_kg,
                }
            })
            .collect();

        self.series.push(SweepSeries {
            method: model.method(),
            points,
        });
    }

    fn max_context(&self) -> f64 {
        self.series
            .iter()
            .flat_map(|s| s.points.iter())
            .map(|p| p.context_tokens as f64)
            .fold(1.0, f64::max)
    }

    fn min_context(&self) -> f64 {
        self.series
            .iter()
            .flat_map(|s| s.points.iter())
            .map(|p| p.context_tokens.max(1) as f64)
            .fold(f64::INFINITY, f64::min)
            .min(self.max_context())
    }

    /// Plot energy per token against context length, one line per cost model
    pub fn plot_energy_per_token(&self, path: &str) -> Result<(), Box<dyn Error>> {
        let root = BitMapBackend::new(path, (1024, 768)).into_drawing_area();
        root.fill(&WHITE)?;

        let min_context = self.min_context();
        let max_context = self.max_context().max(min_context * 2.0);
        let max_energy = self
            .series
            .iter()
            .flat_map(|s| s.points.iter())
            .map(|p| p.energy_per_token_wh * 1000.0)
            .fold(0.0, f64::max)
            .max(1e-3);

        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!("Energy per Token ({} output tokens)", self.output_tokens),
                ("sans-serif", 40),
            )
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d((min_context..max_context).log_scale(), 0.0..max_energy * 1.1)?;

        chart
            .configure_mesh()
            .x_desc("Context Length (tokens)")
            .y_desc("Energy per Token (mWh)")
            .draw()?;

        let colors = [BLUE, RED, GREEN, MAGENTA];
        for (series, color) in self.series.iter().zip(colors.iter().cycle()) {
            let color = *color;
            chart
                .draw_series(LineSeries::new(
                    series
                        .points
                        .iter()
                        .map(|p| (p.context_tokens.max(1) as f64, p.energy_per_token_wh * 1000.0)),
                    &color,
                ))?
                .label(series.method.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;

        root.present()?;
        Ok(())
    }
}

/// Plot projected energy per day
pub fn plot_daily_energy(summary: &ProjectionSummary, path: &str) -> Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, (1024, 768)).into_drawing_area();
    root.fill(&WHITE)?;

    let days = summary.daily_energy_wh.len().max(1);
    let max_energy = summary
        .daily_energy_wh
        .iter()
        .copied()
        .fold(0.0, f64::max)
        .max(1e-3);

    let mut chart = ChartBuilder::on(&root)
        .caption("Projected Energy per Day", ("sans-serif", 40))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0usize..days, 0.0..max_energy * 1.1)?;

    chart
        .configure_mesh()
        .x_desc("Day")
        .y_desc("Energy (Wh)")
        .draw()?;

    chart.draw_series(
        summary
            .daily_energy_wh
            .iter()
            .enumerate()
            .map(|(day, &wh)| Rectangle::new([(day, 0.0), (day + 1, wh)], BLUE.mix(0.6).filled())),
    )?;

    chart.draw_series(LineSeries::new(
        (0..=days).map(|day| (day, summary.energy_per_day_wh)),
        &RED,
    ))?
    .label("Mean")
    .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}
