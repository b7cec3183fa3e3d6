use wasm_bindgen::prelude::*;

use crate::compute::arithmetic::tokens_from_f64;
use crate::compute::{cost_model, CostModel, EnergyEstimator};
use crate::exchange::{approx_token_count, LogEntry};
use crate::stats::UsageCollector;
use crate::Config;

fn default_estimator() -> EnergyEstimator {
    EnergyEstimator::from_config(&Config::default())
}

/// Estimate one exchange from token counts
///
/// NaN, infinite and negative numbers count as zero tokens.
#[wasm_bindgen]
pub fn estimate_exchange(input_tokens: f64, output_tokens: f64) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let result = default_estimator().estimate(tokens_from_f64(input_tokens), tokens_from_f64(output_tokens));
    Ok(serde_wasm_bindgen::to_value(&result)?)
}

/// Estimate one exchange from its text, approximating tokens at four characters each
#[wasm_bindgen]
pub fn estimate_text(user_message: &str, assistant_response: &str) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let result = default_estimator().estimate(
        approx_token_count(user_message) as i64,
        approx_token_count(assistant_response) as i64,
    );
    Ok(serde_wasm_bindgen::to_value(&result)?)
}

/// Energy in Wh per generated token
#[wasm_bindgen]
pub fn energy_per_token(input_tokens: f64, output_tokens: f64) -> f64 {
    default_estimator().energy_per_token(tokens_from_f64(input_tokens), tokens_from_f64(output_tokens))
}

/// Estimate with a JSON-encoded configuration; missing sections use the defaults
#[wasm_bindgen]
pub fn estimate_with_config(config_json: &str, input_tokens: f64, output_tokens: f64) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let config: Config = serde_json::from_str(config_json)
        .map_err(|e| JsValue::from_str(&format!("Config parse error: {}", e)))?;
    config
        .validate()
        .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?;

    let result = cost_model(&config).estimate(tokens_from_f64(input_tokens), tokens_from_f64(output_tokens));
    Ok(serde_wasm_bindgen::to_value(&result)?)
}

/// Today and lifetime totals for a JSON array of stored log entries
#[wasm_bindgen]
pub fn usage_summary(logs_json: &str, start_of_day_ms: f64) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let entries: Vec<LogEntry> = serde_json::from_str(logs_json)
        .map_err(|e| JsValue::from_str(&format!("Log parse error: {}", e)))?;

    let mut collector = UsageCollector::new(start_of_day_ms as i64);
    collector.record_all(&entries);
    Ok(serde_wasm_bindgen::to_value(&collector.compute_summary())?)
}
