//! The `analyze` command: observations CSV in, bloom report JSON out.

use crate::input::{analysis_date, load_config, load_pool, read_observations};
use anyhow::Context;
use bloom_data::{analyze, AnalysisConfig, BloomReport};
use bloom_obs::species::SpeciesPool;
use bloom_utils::dates::format_date;
use chrono::{DateTime, NaiveDate, Utc};
use log::info;
use std::{
    fs::File,
    io::{BufWriter, Read, Write},
};

/// Normalize `reader` and run the full analysis over it.
pub fn build_report<R: Read>(
    reader: R,
    pool: &SpeciesPool,
    today: NaiveDate,
    generated_at: DateTime<Utc>,
    config: &AnalysisConfig,
) -> anyhow::Result<BloomReport> {
    let batch = read_observations(reader, today, config)?;
    Ok(analyze(batch.observations, pool, today, generated_at, config))
}

pub fn write_report<W: Write>(report: &BloomReport, writer: W) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(writer, report).context("failed to serialize report")
}

pub fn run_analyze(
    observations_csv: &str,
    report_json: &str,
    date: Option<&str>,
    species_csv: Option<&str>,
    config_path: Option<&str>,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(limit) = limit {
        config.indicator_limit = limit;
        config.validate()?;
    }
    let today = analysis_date(date)?;
    let pool = load_pool(species_csv)?;
    info!(
        "Analyzing {} as of {} against {} candidate species",
        observations_csv,
        format_date(&today),
        pool.len()
    );

    let input = File::open(observations_csv).with_context(|| format!("failed to open {observations_csv}"))?;
    let report = build_report(input, &pool, today, Utc::now(), &config)?;

    let file = File::create(report_json).with_context(|| format!("failed to create {report_json}"))?;
    let mut writer = BufWriter::new(file);
    write_report(&report, &mut writer)?;
    writer.flush()?;

    info!(
        "Report written to {}: {} ({} indicator species)",
        report_json,
        report.overall.status,
        report.species.len()
    );
    Ok(())
}
