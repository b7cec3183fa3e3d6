use footprint::compute::CostModel;
use footprint::config::WorkloadConfig;
use footprint::exchange::{JsonFileStore, LogStore, MemoryStore, RecordOutcome};
use footprint::stats::UsageCollector;
use footprint::{
    approx_token_count, cost_model, project, Config, CostMethod, EnergyEstimator, Exchange, ExchangeLog,
};

fn estimator() -> EnergyEstimator {
    EnergyEstimator::from_config(&Config::default())
}

#[test]
fn test_empty_exchange_hits_floor() {
    let result = estimator().estimate(0, 0);
    assert_eq!(result.num_gpus, 3);
    assert!((result.total_energy_wh - 0.01).abs() < 1e-12);
    assert!((result.co2_emissions_kg - 4.18e-6).abs() < 1e-12);
    assert_eq!(result.flop_breakdown.total_flops, 0.0);
}

#[test]
fn test_negative_tokens_behave_as_zero() {
    let model = estimator();
    assert_eq!(model.estimate(-5, 10), model.estimate(0, 10));
    assert_eq!(model.estimate(10, -5), model.estimate(10, 0));
}

#[test]
fn test_long_exchange_scales_with_output() {
    let model = estimator();
    let short = model.estimate(2_000, 200);
    let long = model.estimate(2_000, 2_000);
    assert!(long.total_energy_wh > short.total_energy_wh);
    assert!(long.co2_emissions_kg > short.co2_emissions_kg);
    assert_eq!(
        long.flop_breakdown.prefill_flops,
        short.flop_breakdown.prefill_flops
    );
}

#[test]
fn test_energy_per_token_with_single_output() {
    let model = estimator();
    for context in [0, 128, 8_192, 131_072] {
        assert_eq!(
            model.energy_per_token(context, 1),
            model.estimate(context, 1).total_energy_wh
        );
    }
}

#[test]
fn test_config_file_selects_affine() {
    let config = Config::from_toml_str(
        r#"
        [estimator]
        method = "affine"

        [hardware]
        pue = 1.1
        "#,
    )
    .unwrap();

    let model = cost_model(&config);
    assert_eq!(model.method(), CostMethod::Affine);
    let result = model.estimate(500, 500);
    assert_eq!(result.method, CostMethod::Affine);
    assert!(result.total_energy_wh >= 0.01);
}

#[test]
fn test_record_persist_and_report() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("logs.json");
    let model = cost_model(&Config::default());

    let mut store = JsonFileStore::new(&path);
    let mut history = ExchangeLog::from_entries(store.load().unwrap());
    assert!(history.is_empty());

    let partial = Exchange::new("Explain the borrow checker", "It");
    let complete = Exchange::new(
        "Explain the borrow checker",
        "It enforces aliasing XOR mutability at compile time.",
    );
    assert_eq!(history.record(&partial, 1_000, model.as_ref()), RecordOutcome::Inserted);
    assert_eq!(history.record(&complete, 2_000, model.as_ref()), RecordOutcome::Updated);
    assert_eq!(history.record(&partial, 3_000, model.as_ref()), RecordOutcome::Unchanged);
    store.save(history.entries()).unwrap();

    let reloaded = JsonFileStore::new(&path).load().unwrap();
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded[0].timestamp, 1_000);
    assert_eq!(reloaded[0].last_updated, 2_000);
    assert_eq!(
        reloaded[0].assistant_token_count,
        approx_token_count(&complete.assistant_response)
    );

    let mut collector = UsageCollector::new(1_500);
    collector.record_all(&reloaded);
    let summary = collector.compute_summary();
    assert_eq!(summary.lifetime.messages, 1);
    // Today is keyed on the first-seen timestamp
    assert_eq!(summary.today.messages, 0);
    assert!((summary.lifetime.energy_wh - reloaded[0].energy_wh()).abs() < 1e-12);
}

#[test]
fn test_memory_store_round_trip() {
    let model = estimator();
    let mut history = ExchangeLog::new();
    history.record(&Exchange::new("a", "b"), 5, &model);

    let mut store = MemoryStore::new();
    store.save(history.entries()).unwrap();
    assert_eq!(store.load().unwrap(), history.entries());
}

#[test]
fn test_projection_is_seeded() {
    let workload = WorkloadConfig {
        days: 7,
        exchanges_per_day: 30.0,
        ..WorkloadConfig::default()
    };
    let model = estimator();

    let a = project(&workload, &model);
    let b = project(&workload, &model);
    assert!(a.exchanges > 0);
    assert_eq!(a.exchanges, b.exchanges);
    assert_eq!(a.energy_wh, b.energy_wh);
    assert_eq!(a.daily_energy_wh.len(), 7);
    assert!(a.energy_per_exchange_p50_wh <= a.energy_per_exchange_p99_wh);
}
