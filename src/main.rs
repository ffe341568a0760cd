//! Policy Reform CLI
//!
//! Applies an optional reform file to current-law policy and prints the
//! projected parameter values year by year.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use policy_reform::policy::{DEFAULT_NUM_YEARS, LAST_BUDGET_YEAR};
use policy_reform::{ParameterDefaults, Policy, PolicyConfig, YearValue};

#[derive(Parser, Debug)]
#[command(name = "policy_reform", version, about = "Project tax policy parameters under a reform")]
struct Cli {
    /// Reform file (JSON with // comments), parameter -> year -> value
    #[arg(long)]
    reform: Option<PathBuf>,

    /// Parameter defaults JSON (default: bundled current law)
    #[arg(long)]
    defaults: Option<PathBuf>,

    #[arg(long, default_value_t = policy_reform::parameters::JSON_START_YEAR)]
    start_year: i32,

    #[arg(long, default_value_t = DEFAULT_NUM_YEARS)]
    num_years: usize,

    /// Parameter to show; repeat for several (default: all)
    #[arg(long = "param")]
    params: Vec<String>,

    /// Write the projected table to a CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    #[arg(long, help = "Output machine-readable JSON")]
    json: bool,
}

/// One cell of the projected table in long format
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    year: i32,
    parameter: &'a str,
    column: usize,
    value: f64,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = PolicyConfig::default().with_years(cli.start_year, cli.num_years);
    if let Some(path) = &cli.defaults {
        let defaults = ParameterDefaults::from_path(path)
            .with_context(|| format!("loading parameter defaults {}", path.display()))?;
        config = config.with_parameter_defaults(defaults);
    }
    let mut policy = Policy::new(config).context("building current-law policy")?;

    if let Some(path) = &cli.reform {
        // Malformed files are echoed through the error log by the reader
        let reform = Policy::read_json_reform_file(path)?;
        policy
            .implement_reform(&reform)
            .with_context(|| format!("implementing reform {}", path.display()))?;
    }

    let snapshot = policy.table().snapshot(&cli.params)?;

    if let Some(path) = &cli.csv {
        let mut writer = csv::Writer::from_path(path)
            .with_context(|| format!("creating {}", path.display()))?;
        for (year, row) in &snapshot.values {
            for (name, value) in row {
                for (column, v) in value.columns().iter().enumerate() {
                    writer.serialize(CsvRow {
                        year: *year,
                        parameter: name,
                        column,
                        value: *v,
                    })?;
                }
            }
        }
        writer.flush()?;
        println!("Projected table written to: {}", path.display());
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    println!("Policy Reform v{}", env!("CARGO_PKG_VERSION"));
    println!("======================\n");
    println!(
        "Window: {}-{} (budget window ends {})",
        snapshot.start_year, snapshot.end_year, LAST_BUDGET_YEAR
    );
    if let Some(path) = &cli.reform {
        println!("Reform: {}", path.display());
    }
    println!();

    let names: Vec<&String> = snapshot
        .values
        .values()
        .next()
        .map(|row| row.keys().collect())
        .unwrap_or_default();
    for name in names {
        let long_name = policy.table().long_name(name).unwrap_or("");
        println!("{} {}", name, long_name);
        println!("{}", "-".repeat(60));
        for (year, row) in &snapshot.values {
            if let Some(value) = row.get(name) {
                println!("  {:>4}  {}", year, format_value(value));
            }
        }
        println!();
    }

    Ok(())
}

fn format_value(value: &YearValue) -> String {
    value
        .columns()
        .iter()
        .map(|v| {
            if *v >= policy_reform::parameters::UNLIMITED {
                format!("{:>12}", "unlimited")
            } else {
                format!("{:>12.2}", v)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
