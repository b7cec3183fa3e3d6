use serde::Serialize;

use super::comparisons::Comparisons;
use super::format::format_fixed;

/// Totals for one reporting window
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodStats {
    pub messages: u64,
    pub energy_wh: f64,
    pub co2_kg: f64,
    pub comparisons: Comparisons,
}

impl PeriodStats {
    pub fn new(messages: u64, energy_wh: f64, co2_kg: f64) -> Self {
        Self {
            messages,
            energy_wh,
            co2_kg,
            comparisons: Comparisons::from_energy_wh(energy_wh),
        }
    }

    /// Mean energy per message, 0 when empty
    pub fn energy_per_message_wh(&self) -> f64 {
        if self.messages == 0 {
            0.0
        } else {
            self.energy_wh / self.messages as f64
        }
    }
}

/// Summary of logged usage
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageSummary {
    pub today: PeriodStats,
    pub lifetime: PeriodStats,
    /// Entries that carried no energy value
    pub entries_missing_energy: u64,
}

impl UsageSummary {
    pub fn print(&self) {
        println!("\n=== Usage ===\n");
        print_period("Today", &self.today);
        println!();
        print_period("Lifetime", &self.lifetime);

        if self.entries_missing_energy > 0 {
            println!(
                "\n  {} logs have missing energy usage values",
                self.entries_missing_energy
            );
        }
    }
}

fn print_period(label: &str, stats: &PeriodStats) {
    println!("{}:", label);
    println!("  Messages:    {}", format_fixed(stats.messages as f64, 0, false));
    println!("  Energy:      {} Wh", format_fixed(stats.energy_wh, 2, true));
    println!("  Emissions:   {:.2} g CO2e", stats.co2_kg * 1000.0);
    println!("  Equivalent to:");
    println!("    {:.0} g CO2 (US grid)", stats.comparisons.co2_grams);
    println!("    {:.2} miles driven", stats.comparisons.miles_driven);
    println!("    {:.3} tree-years of absorption", stats.comparisons.tree_years);
    println!("    {:.2} L of cooling water", stats.comparisons.water_liters);
}
