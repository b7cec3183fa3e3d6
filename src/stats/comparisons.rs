use serde::Serialize;

/// US-average grid intensity used for the everyday comparisons, g/kWh
pub const CO2_GRAMS_PER_KWH: f64 = 367.0;

/// Miles driven whose CO2 one kWh offsets
pub const MILES_PER_KWH: f64 = 0.67;

/// Annual CO2 uptake of one mature tree, kg
pub const TREE_KG_CO2_PER_YEAR: f64 = 22.0;

/// Power-plant cooling water, litres per kWh
pub const WATER_LITERS_PER_KWH: f64 = 2.2;

/// Everyday equivalents of an amount of energy
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Comparisons {
    pub co2_grams: f64,
    pub miles_driven: f64,
    /// Fraction of one mature tree's yearly absorption
    pub tree_years: f64,
    pub water_liters: f64,
}

impl Comparisons {
    pub fn from_energy_wh(energy_wh: f64) -> Self {
        let kwh = energy_wh / 1000.0;
        let co2_grams = kwh * CO2_GRAMS_PER_KWH;
        Self {
            co2_grams,
            miles_driven: kwh * MILES_PER_KWH,
            tree_years: co2_grams / 1000.0 / TREE_KG_CO2_PER_YEAR,
            water_liters: kwh * WATER_LITERS_PER_KWH,
        }
    }
}
