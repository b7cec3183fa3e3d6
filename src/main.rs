use chrono::{Local, Utc};
use clap::{Parser, Subcommand};
use colored::Colorize;
use footprint::compute::{cost_model, AffineEstimator, CostModel, EnergyEstimator};
use footprint::config::CostMethod;
use footprint::exchange::{approx_token_count, Exchange, ExchangeLog, JsonFileStore, LogStore};
use footprint::projection::project;
use footprint::stats::{format_fixed, UsageCollector};
use footprint::visualization::{plot_daily_energy, ContextSweep};
use footprint::Config;
use serde::Serialize;
use std::error::Error;
use std::path::PathBuf;
use tabled::{settings::Style, Table, Tabled};

#[derive(Parser, Debug)]
#[command(author, version, about = "Energy and carbon footprint of LLM chat exchanges", long_about = None)]
struct Args {
    /// Path to a TOML configuration file (built-in profile when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Show the configuration and intermediate quantities
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Very verbose debug output
    #[arg(long, global = true)]
    debug: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Estimate one exchange from token counts or text
    Estimate {
        #[arg(short, long, default_value_t = 0, allow_hyphen_values = true)]
        input_tokens: i64,

        #[arg(short, long, default_value_t = 1, allow_hyphen_values = true)]
        output_tokens: i64,

        /// Prompt text; its approximate token count replaces --input-tokens
        #[arg(long)]
        prompt: Option<String>,

        /// Response text; its approximate token count replaces --output-tokens
        #[arg(long)]
        response: Option<String>,

        /// Cost model to use instead of the configured one
        #[arg(short, long)]
        method: Option<CostMethod>,
    },

    /// Energy per generated token across context lengths
    Sweep {
        #[arg(short, long, default_value_t = 1)]
        output_tokens: u32,

        /// Largest context length; lengths are powers of two from 128
        #[arg(long, default_value_t = 131_072)]
        max_context: u32,

        /// Include every cost model, not only the configured one
        #[arg(long)]
        compare: bool,

        /// Write a PNG chart to this path
        #[arg(long)]
        plot: Option<PathBuf>,
    },

    /// Record one exchange into a log file
    Record {
        #[arg(long)]
        log: PathBuf,

        #[arg(long)]
        prompt: String,

        #[arg(long)]
        response: String,

        #[arg(long)]
        conversation: Option<String>,

        #[arg(long, default_value = "")]
        url: String,
    },

    /// Summarize today's and lifetime usage from a log file
    Report {
        #[arg(long)]
        log: PathBuf,
    },

    /// Project the footprint of the configured workload
    Project {
        /// Override the number of days
        #[arg(long)]
        days: Option<u32>,

        /// Override the number of exchanges per day
        #[arg(long)]
        per_day: Option<f64>,

        /// Write a PNG chart of daily energy to this path
        #[arg(long)]
        plot: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum VerbosityLevel {
    Quiet,
    Normal,
    Verbose,
    Debug,
}

impl Args {
    fn verbosity_level(&self) -> VerbosityLevel {
        if self.debug {
            VerbosityLevel::Debug
        } else if self.verbose {
            VerbosityLevel::Verbose
        } else if self.quiet {
            VerbosityLevel::Quiet
        } else {
            VerbosityLevel::Normal
        }
    }
}

/// Output settings shared by every subcommand
struct Output {
    verbosity: VerbosityLevel,
    use_color: bool,
    json: bool,
}

impl Output {
    fn heading(&self, text: &str) {
        if self.use_color {
            println!("\n{}", text.yellow().bold());
        } else {
            println!("\n{}", text);
        }
    }

    fn rule(&self) {
        if self.use_color {
            println!("{}", "━".repeat(60).bright_black());
        } else {
            println!("{}", "━".repeat(60));
        }
    }

    fn print_json<T: Serialize>(&self, value: &T) -> Result<(), Box<dyn Error>> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }
}

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Value")]
    value: String,
}

impl MetricRow {
    fn new(metric: &str, value: String) -> Self {
        Self {
            metric: metric.to_string(),
            value,
        }
    }
}

#[derive(Tabled)]
struct SweepRow {
    #[tabled(rename = "Method")]
    method: String,
    #[tabled(rename = "Context")]
    context: u32,
    #[tabled(rename = "Wh / token")]
    energy_per_token: String,
    #[tabled(rename = "Total Wh")]
    total: String,
    #[tabled(rename = "g CO2e")]
    co2: String,
}

fn main() {
    let args = Args::parse();
    let verbosity = args.verbosity_level();

    let default_filter = match verbosity {
        VerbosityLevel::Debug => "debug",
        VerbosityLevel::Verbose => "info",
        _ => "warn",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    if let Err(e) = run(args, verbosity) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args, verbosity: VerbosityLevel) -> Result<(), Box<dyn Error>> {
    let config = match &args.config {
        Some(path) => Config::from_file(path)
            .map_err(|e| format!("loading configuration from {:?}: {}", path, e))?,
        None => Config::default(),
    };

    let out = Output {
        verbosity,
        use_color: !args.no_color,
        json: args.json,
    };

    if out.verbosity >= VerbosityLevel::Verbose && !out.json {
        print_config_summary(&config, &out);
    }

    match args.command {
        Command::Estimate {
            input_tokens,
            output_tokens,
            prompt,
            response,
            method,
        } => {
            let input_tokens = prompt.map_or(input_tokens, |text| approx_token_count(&text) as i64);
            let output_tokens = response.map_or(output_tokens, |text| approx_token_count(&text) as i64);
            run_estimate(&config, method, input_tokens, output_tokens, &out)
        }
        Command::Sweep {
            output_tokens,
            max_context,
            compare,
            plot,
        } => run_sweep(&config, output_tokens, max_context, compare, plot, &out),
        Command::Record {
            log,
            prompt,
            response,
            conversation,
            url,
        } => {
            let mut exchange = Exchange::new(prompt, response).with_url(url);
            if let Some(id) = conversation {
                exchange = exchange.with_conversation(id);
            }
            run_record(&config, log, &exchange, &out)
        }
        Command::Report { log } => run_report(log, &out),
        Command::Project { days, per_day, plot } => {
            let mut workload = config.workload.clone();
            if let Some(days) = days {
                workload.days = days;
            }
            if let Some(per_day) = per_day {
                workload.exchanges_per_day = per_day;
            }
            let mut projected = config.clone();
            projected.workload = workload;
            projected.validate()?;
            run_project(&projected, plot, &out)
        }
    }
}

fn print_config_summary(config: &Config, out: &Output) {
    if out.use_color {
        println!("{}", "Configuration:".green().bold());
    } else {
        println!("Configuration:");
    }
    println!(
        "  Model: {} ({:.1}B active, {:.0}B total)",
        config.model.name,
        config.model.active_params_billions(),
        config.model.total_params / 1e9
    );
    println!(
        "  Hardware: {} ({} W, {:.3e} FLOP/s, {} per node)",
        config.hardware.name,
        config.hardware.gpu_power_watts,
        config.hardware.gpu_flops_per_sec,
        config.hardware.gpus_per_node
    );
    println!(
        "  Utilization: prefill {:.0}%, decode {:.0}%",
        config.hardware.prefill_utilization * 100.0,
        config.hardware.decode_utilization * 100.0
    );
    println!(
        "  PUE: {}, grid: {} kg CO2e/kWh",
        config.hardware.pue, config.hardware.emission_factor_kg_per_kwh
    );
    println!("  Method: {}", config.estimator.method);
}

fn run_estimate(
    config: &Config,
    method: Option<CostMethod>,
    input_tokens: i64,
    output_tokens: i64,
    out: &Output,
) -> Result<(), Box<dyn Error>> {
    let mut config = config.clone();
    if let Some(method) = method {
        config.estimator.method = method;
    }
    let model = cost_model(&config);
    let result = model.estimate(input_tokens, output_tokens);

    if out.json {
        return out.print_json(&result);
    }

    if out.verbosity == VerbosityLevel::Quiet {
        println!(
            "{:.4} Wh, {:.3} g CO2e",
            result.total_energy_wh,
            result.co2_emissions_kg * 1000.0
        );
        return Ok(());
    }

    out.heading("EXCHANGE ESTIMATE");
    let mut rows = vec![
        MetricRow::new("Method", result.method.to_string()),
        MetricRow::new("Input tokens", input_tokens.max(0).to_string()),
        MetricRow::new("Output tokens", output_tokens.max(0).to_string()),
        MetricRow::new("GPUs", result.num_gpus.to_string()),
        MetricRow::new("Prefill FLOPs", format!("{:.3e}", result.flop_breakdown.prefill_flops)),
        MetricRow::new("Decode FLOPs", format!("{:.3e}", result.flop_breakdown.decode_flops)),
        MetricRow::new("Energy (Wh)", format!("{:.4}", result.total_energy_wh)),
        MetricRow::new(
            "Energy per token (Wh)",
            format!("{:.6}", model.energy_per_token(input_tokens, output_tokens)),
        ),
        MetricRow::new("Emissions (g CO2e)", format!("{:.3}", result.co2_emissions_kg * 1000.0)),
    ];

    if out.verbosity >= VerbosityLevel::Verbose && config.estimator.method == CostMethod::FlopProxy {
        let detail = EnergyEstimator::from_config(&config).estimate_detailed(input_tokens, output_tokens);
        rows.push(MetricRow::new("Prefill time (s)", format!("{:.4}", detail.prefill_seconds)));
        rows.push(MetricRow::new("Decode time (s)", format!("{:.4}", detail.decode_seconds)));
        rows.push(MetricRow::new("GPU energy (Wh)", format!("{:.4}", detail.gpu_energy_wh)));
        rows.push(MetricRow::new("Server energy (Wh)", format!("{:.4}", detail.server_energy_wh)));
        rows.push(MetricRow::new(
            "Facility energy, unfloored (Wh)",
            format!("{:.4}", detail.facility_energy_wh),
        ));
    }

    println!("{}", Table::new(&rows).with(Style::rounded()));
    Ok(())
}

fn run_sweep(
    config: &Config,
    output_tokens: u32,
    max_context: u32,
    compare: bool,
    plot: Option<PathBuf>,
    out: &Output,
) -> Result<(), Box<dyn Error>> {
    let contexts = ContextSweep::default_contexts(max_context);
    let mut sweep = ContextSweep::new(output_tokens);

    if compare {
        sweep.add_series(&EnergyEstimator::from_config(config), &contexts);
        sweep.add_series(&AffineEstimator::from_config(config), &contexts);
    } else {
        sweep.add_series(cost_model(config).as_ref(), &contexts);
    }

    if let Some(path) = &plot {
        sweep.plot_energy_per_token(&path.to_string_lossy())?;
        log::info!("Wrote sweep chart to {:?}", path);
    }

    if out.json {
        return out.print_json(&sweep);
    }

    out.heading(&format!("ENERGY PER TOKEN ({} output tokens)", output_tokens));
    let rows: Vec<SweepRow> = sweep
        .series
        .iter()
        .flat_map(|series| {
            series.points.iter().map(move |p| SweepRow {
                method: series.method.to_string(),
                context: p.context_tokens,
                energy_per_token: format!("{:.6}", p.energy_per_token_wh),
                total: format!("{:.4}", p.total_energy_wh),
                co2: format!("{:.3}", p.co2_kg * 1000.0),
            })
        })
        .collect();
    println!("{}", Table::new(&rows).with(Style::rounded()));

    if let Some(path) = plot {
        println!("\nChart written to {:?}", path);
    }
    Ok(())
}

fn run_record(config: &Config, log_path: PathBuf, exchange: &Exchange, out: &Output) -> Result<(), Box<dyn Error>> {
    let mut store = JsonFileStore::new(&log_path);
    let mut history = ExchangeLog::from_entries(store.load()?);
    let outcome = history.record(exchange, Utc::now().timestamp_millis(), cost_model(config).as_ref());

    if outcome.changed() {
        store.save(history.entries())?;
    }

    if out.json {
        return out.print_json(&serde_json::json!({
            "outcome": format!("{:?}", outcome),
            "entries": history.len(),
        }));
    }
    if out.verbosity >= VerbosityLevel::Normal {
        println!("{:?}: {} entries in {:?}", outcome, history.len(), log_path);
    }
    Ok(())
}

fn run_report(log_path: PathBuf, out: &Output) -> Result<(), Box<dyn Error>> {
    let entries = JsonFileStore::new(&log_path).load()?;
    let mut collector = UsageCollector::for_local_day(Local::now());
    collector.record_all(&entries);
    let summary = collector.compute_summary();

    if out.json {
        return out.print_json(&summary);
    }

    if out.verbosity == VerbosityLevel::Quiet {
        println!(
            "today: {} messages, {} Wh | lifetime: {} messages, {} Wh",
            summary.today.messages,
            format_fixed(summary.today.energy_wh, 2, true),
            summary.lifetime.messages,
            format_fixed(summary.lifetime.energy_wh, 2, true)
        );
        return Ok(());
    }

    summary.print();
    out.rule();
    Ok(())
}

fn run_project(config: &Config, plot: Option<PathBuf>, out: &Output) -> Result<(), Box<dyn Error>> {
    let model = cost_model(config);
    let summary = project(&config.workload, model.as_ref());

    if let Some(path) = &plot {
        plot_daily_energy(&summary, &path.to_string_lossy())?;
        log::info!("Wrote projection chart to {:?}", path);
    }

    if out.json {
        return out.print_json(&summary);
    }

    if out.verbosity == VerbosityLevel::Quiet {
        println!(
            "{} exchanges, {:.2} Wh, {:.3} kg CO2e",
            summary.exchanges, summary.energy_wh, summary.co2_kg
        );
        return Ok(());
    }

    summary.print();
    out.rule();
    if let Some(path) = plot {
        println!("Chart written to {:?}", path);
    }
    Ok(())
}
