//! budget-pivot CLI - Roll up a position budget export into a styled pivot report
//!
//! # Main Commands
//!
//! ```bash
//! budget-pivot report budget.csv                 # Writes budget_pivot.xlsx
//! budget-pivot report budget.csv -o out.json     # Sink chosen by extension
//! budget-pivot report budget.xlsx -c report.json # Custom configuration
//! ```
//!
//! # Debug Commands
//!
//! ```bash
//! budget-pivot inspect budget.csv   # Normalized records with derived metrics
//! budget-pivot example-config       # Default configuration as JSON
//! ```

use budget_pivot::logs::log_error;
use budget_pivot::{default_output_path, generate_report, inspect_records, ReportConfig};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "budget-pivot")]
#[command(about = "Roll up position budgets into a forecast pivot report", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the pivot report
    Report {
        /// Input file (.csv, .xlsx, .xls, .ods)
        input: PathBuf,

        /// Output file: .xlsx, .csv or .json (default: <input>_pivot.xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print normalized records with derived metrics as JSON
    Inspect {
        /// Input file
        input: PathBuf,

        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the default configuration
    ExampleConfig,
}

fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Report { input, output, config } => cmd_report(&input, output, config.as_deref()),
        Commands::Inspect { input, config } => cmd_inspect(&input, config.as_deref()),
        Commands::ExampleConfig => cmd_example_config(),
    };

    if let Err(e) = result {
        log_error(format!("{:?}", e));
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn cmd_report(
    input: &Path,
    output: Option<PathBuf>,
    config: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = ReportConfig::load_or_default(config)?;
    let output = output.unwrap_or_else(|| default_output_path(input));

    let stats = generate_report(input, &output, &config)?;

    println!(
        "Report written to {} ({} groups, {} records)",
        output.display(),
        stats.groups,
        stats.records_kept
    );
    Ok(())
}

fn cmd_inspect(input: &Path, config: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = ReportConfig::load_or_default(config)?;
    let records = inspect_records(input, &config)?;
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}

fn cmd_example_config() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", ReportConfig::default().to_json()?);
    Ok(())
}
