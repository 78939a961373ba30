//! Command implementations for the bloom timing CLI.
//!
//! Observations come in as CSV, the analysis goes out as JSON (or, for
//! the trend, as CSV plus an optional JSON summary). The library crates
//! never touch files.

use clap::Subcommand;

pub mod analyze;
pub mod input;
pub mod trend;
pub mod validate;

#[derive(Subcommand)]
pub enum Command {
    /// Classify the current season and write the bloom report
    Analyze {
        /// Input path for the flowering observations CSV
        #[arg(short = 'o', long)]
        observations_csv: String,

        /// Output path for the report JSON
        #[arg(short = 'j', long)]
        report_json: String,

        /// Analysis date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<String>,

        /// Candidate species CSV (scientific_name,common_name); defaults to the built-in pool
        #[arg(long)]
        species_csv: Option<String>,

        /// JSON file overriding analysis thresholds
        #[arg(long)]
        config: Option<String>,

        /// Maximum number of indicator species to report
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Export per-species yearly onset anomalies across the baseline window
    Trend {
        /// Input path for the flowering observations CSV
        #[arg(short = 'o', long)]
        observations_csv: String,

        /// Output path for the trend CSV
        #[arg(short = 'c', long)]
        trend_csv: String,

        /// Output path for the trend summary JSON (yearly means, fitted line)
        #[arg(short = 's', long)]
        summary_json: Option<String>,

        /// Herbarium specimens CSV (species,collected_on,phenology) to compare against
        #[arg(long)]
        herbarium_csv: Option<String>,

        /// Analysis date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<String>,

        /// Candidate species CSV; defaults to the built-in pool
        #[arg(long)]
        species_csv: Option<String>,

        /// JSON file overriding analysis thresholds
        #[arg(long)]
        config: Option<String>,
    },

    /// Normalize an observations CSV and report rejected records
    Validate {
        /// Input path for the flowering observations CSV
        #[arg(short = 'o', long)]
        observations_csv: String,

        /// Analysis date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<String>,

        /// JSON file overriding analysis thresholds
        #[arg(long)]
        config: Option<String>,
    },
}

pub fn run(command: Command) -> anyhow::Result<()> {
    match command {
        Command::Analyze {
            observations_csv,
            report_json,
            date,
            species_csv,
            config,
            limit,
        } => analyze::run_analyze(
            &observations_csv,
            &report_json,
            date.as_deref(),
            species_csv.as_deref(),
            config.as_deref(),
            limit,
        ),
        Command::Trend {
            observations_csv,
            trend_csv,
            summary_json,
            herbarium_csv,
            date,
            species_csv,
            config,
        } => trend::run_trend(
            &observations_csv,
            trend::TrendOutputs {
                trend_csv: &trend_csv,
                summary_json: summary_json.as_deref(),
                herbarium_csv: herbarium_csv.as_deref(),
            },
            date.as_deref(),
            species_csv.as_deref(),
            config.as_deref(),
        ),
        Command::Validate {
            observations_csv,
            date,
            config,
        } => validate::run_validate(&observations_csv, date.as_deref(), config.as_deref()),
    }
}
