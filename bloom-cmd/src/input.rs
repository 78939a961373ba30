//! Loading everything a command needs: date, config, species pool and
//! the normalized observation batch.

use anyhow::Context;
use bloom_data::AnalysisConfig;
use bloom_obs::{
    observation::{NormalizeWindow, NormalizedBatch},
    species::SpeciesPool,
};
use bloom_utils::dates::{parse_date, window_start};
use chrono::{Datelike, Local, NaiveDate};
use log::info;
use std::{fs::File, io::Read};

/// The analysis date: the given `YYYY-MM-DD`, or today.
pub fn analysis_date(date: Option<&str>) -> anyhow::Result<NaiveDate> {
    match date {
        Some(s) => parse_date(s),
        None => Ok(Local::now().date_naive()),
    }
}

/// Parse a JSON config override. Missing keys keep their defaults.
pub fn parse_config(json: &str) -> anyhow::Result<AnalysisConfig> {
    let config: AnalysisConfig = serde_json::from_str(json).context("invalid config JSON")?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: Option<&str>) -> anyhow::Result<AnalysisConfig> {
    match path {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {path}"))?;
            parse_config(&json).with_context(|| format!("bad config {path}"))
        }
        None => Ok(AnalysisConfig::default()),
    }
}

pub fn load_pool(path: Option<&str>) -> anyhow::Result<SpeciesPool> {
    let pool = match path {
        Some(path) => {
            let csv_object = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read species pool {path}"))?;
            SpeciesPool::parse_csv(&csv_object)
                .with_context(|| format!("failed to parse species pool {path}"))?
        }
        None => SpeciesPool::default_pool(),
    };
    if pool.is_empty() {
        anyhow::bail!("species pool is empty");
    }
    Ok(pool)
}

/// Normalize a CSV stream of observations for a run on `today`.
///
/// Records dated before the baseline window or after `today` are
/// rejected along with malformed ones.
pub fn read_observations<R: Read>(
    reader: R,
    today: NaiveDate,
    config: &AnalysisConfig,
) -> anyhow::Result<NormalizedBatch> {
    let window = NormalizeWindow {
        first_year: window_start(today.year(), config.baseline_years),
        today,
    };
    let batch = NormalizedBatch::from_csv_reader(reader, &window)
        .context("observations CSV has no readable header")?;
    info!(
        "{} observations accepted, {} rejected",
        batch.observations.len(),
        batch.rejected.len()
    );
    Ok(batch)
}

pub fn open_observations(
    path: &str,
    today: NaiveDate,
    config: &AnalysisConfig,
) -> anyhow::Result<NormalizedBatch> {
    let file = File::open(path).with_context(|| format!("failed to open {path}"))?;
    read_observations(file, today, config).with_context(|| format!("failed to read {path}"))
}
