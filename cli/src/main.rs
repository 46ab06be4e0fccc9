//! Hospital flow command-line driver
//!
//! Runs a scenario document through the engine and prints the decisions.
//! Logs go to stderr so JSON output on stdout stays machine-readable.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use hospital_flow_core::{
    count_actions, DecisionRecord, Scenario, SimulationConfig, SimulationReport,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "hospital-flow")]
#[command(about = "Patient-flow decision support simulation")]
#[command(version)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a scenario and print every decision
    Run {
        #[command(flatten)]
        input: InputArgs,

        /// Only show decisions for this patient
        #[arg(short, long)]
        patient: Option<String>,

        /// Only show the last decision of each patient
        #[arg(long)]
        final_only: bool,

        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Show the latest decision and engine explanation for one patient
    Explain {
        #[command(flatten)]
        input: InputArgs,

        #[arg(short, long)]
        patient: String,
    },
    /// Print the default configuration as JSON
    Config,
}

#[derive(clap::Args, Debug)]
struct InputArgs {
    /// Scenario JSON (capacity, snapshots, observations)
    #[arg(short, long)]
    scenario: PathBuf,

    /// Config JSON overriding the defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stable-sort observations by timestamp before running
    #[arg(long)]
    sort: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn load_config(path: Option<&Path>) -> Result<SimulationConfig> {
    match path {
        Some(path) => {
            let json = read_file(path)?;
            SimulationConfig::from_json(&json)
                .with_context(|| format!("invalid config {}", path.display()))
        }
        None => Ok(SimulationConfig::default()),
    }
}

fn run_scenario(input: &InputArgs) -> Result<SimulationReport> {
    let config = load_config(input.config.as_deref())?;
    let json = read_file(&input.scenario)?;
    info!(
        scenario = %input.scenario.display(),
        window_size = config.window_size,
        sort = input.sort,
        "loading scenario"
    );
    let scenario = Scenario::from_json(&json)
        .with_context(|| format!("invalid scenario {}", input.scenario.display()))?;
    let report = scenario
        .run(config, input.sort)
        .with_context(|| format!("simulation of {} failed", input.scenario.display()))?;
    Ok(report)
}

/// Records shown by `run`, after the `--final-only` and `--patient` filters
fn select_records<'a>(
    report: &'a SimulationReport,
    patient: Option<&str>,
    final_only: bool,
) -> Vec<&'a DecisionRecord> {
    let records: Vec<_> = if final_only {
        report.final_per_patient()
    } else {
        report.records.iter().collect()
    };
    records
        .into_iter()
        .filter(|r| patient.map_or(true, |p| r.patient_id == p))
        .collect()
}

/// Text footer; counts cover only the shown records
fn summary(report: &SimulationReport, records: &[&DecisionRecord]) -> Vec<String> {
    let mut lines = vec![format!(
        "{} decisions from {} observations (window {})",
        records.len(),
        report.observations_processed,
        report.window_size
    )];
    for (action, count) in count_actions(records.iter().copied()) {
        if count > 0 {
            lines.push(format!("  {:<10} {}", action, count));
        }
    }
    lines
}

fn print_run(
    report: &SimulationReport,
    patient: Option<&str>,
    final_only: bool,
    format: OutputFormat,
) -> Result<()> {
    let records = select_records(report, patient, final_only);

    match format {
        OutputFormat::Json => {
            let body = serde_json::json!({
                "run_id": report.run_id,
                "config_hash": report.config_hash,
                "window_size": report.window_size,
                "observations_processed": report.observations_processed,
                "records": records,
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        OutputFormat::Text => {
            for record in &records {
                println!("{}", record);
            }
            println!();
            for line in summary(report, &records) {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

fn print_explanation(report: &SimulationReport, patient: &str) -> Result<()> {
    let record = report
        .last_for_patient(patient)
        .ok_or_else(|| anyhow!("no decision recorded for patient {}", patient))?;

    println!("{}", record);
    println!();
    println!("Pressure:    {:.2}", record.pressure);
    println!("Explanation: {}", record.explanation());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    match cli.command {
        Commands::Run {
            input,
            patient,
            final_only,
            format,
        } => {
            let report = run_scenario(&input)?;
            print_run(&report, patient.as_deref(), final_only, format)
        }
        Commands::Explain { input, patient } => {
            let report = run_scenario(&input)?;
            print_explanation(&report, &patient)
        }
        Commands::Config => {
            let config = SimulationConfig::default();
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}
