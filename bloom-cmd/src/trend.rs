//! The `trend` command: per-species yearly onset anomalies as CSV, and
//! optionally a JSON summary with the yearly means, the fitted line and a
//! herbarium comparison.

use crate::input::{analysis_date, load_config, load_pool, open_observations};
use anyhow::Context;
use bloom_data::{
    trend::{baseline_trend, herbarium_comparison, BaselineTrend, TrendSummary},
    AnalysisConfig,
};
use bloom_obs::{
    herbarium::{read_flowering_specimens, Specimen},
    observation::Observation,
    species::SpeciesPool,
};
use bloom_utils::dates::baseline_window;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use log::{debug, info, warn};
use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufWriter, Read, Write},
};

/// Group observations by the pool's spelling of their species, dropping
/// anything outside the pool.
pub fn pool_species(observations: Vec<Observation>, pool: &SpeciesPool) -> BTreeMap<String, Vec<Observation>> {
    let mut by_species: BTreeMap<String, Vec<Observation>> = BTreeMap::new();
    for (name, sightings) in Observation::group_by_species(observations) {
        match pool.get(&name) {
            Some(candidate) => by_species
                .entry(candidate.scientific_name.clone())
                .or_default()
                .extend(sightings),
            None => debug!("{name} is not a candidate species, skipped"),
        }
    }
    by_species
}

pub fn compute_trend(
    observations: Vec<Observation>,
    pool: &SpeciesPool,
    today: NaiveDate,
    config: &AnalysisConfig,
) -> BaselineTrend {
    let by_species = pool_species(observations, pool);
    baseline_trend(&by_species, baseline_window(today.year(), config.baseline_years), config)
}

/// Read herbarium specimens and give each the pool's spelling of its
/// species, dropping anything outside the pool.
pub fn pool_specimens<R: Read>(reader: R, pool: &SpeciesPool) -> anyhow::Result<Vec<Specimen>> {
    let specimens = read_flowering_specimens(reader).context("herbarium CSV has no readable header")?;
    Ok(specimens
        .into_iter()
        .filter_map(|specimen| {
            pool.get(&specimen.species).map(|candidate| Specimen {
                species: candidate.scientific_name.clone(),
                collected_on: specimen.collected_on,
            })
        })
        .collect())
}

pub fn build_summary(
    trend: &BaselineTrend,
    specimens: Option<&[Specimen]>,
    today: NaiveDate,
    generated_at: DateTime<Utc>,
    config: &AnalysisConfig,
) -> TrendSummary {
    let comparison = specimens.map(|specimens| herbarium_comparison(specimens, trend, config));
    TrendSummary::new(
        trend,
        baseline_window(today.year(), config.baseline_years),
        generated_at,
        comparison,
    )
}

pub fn write_summary<W: Write>(summary: &TrendSummary, writer: W) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(writer, summary).context("failed to serialize trend summary")
}

/// Write one row per species-year:
/// `species,year,onset_doy,species_median_doy,anomaly_days,zscore`
pub fn write_trend_csv<W: Write>(trend: &BaselineTrend, writer: W) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for point in &trend.points {
        wtr.serialize(point)?;
    }
    wtr.flush()?;
    Ok(())
}

pub struct TrendOutputs<'a> {
    pub trend_csv: &'a str,
    pub summary_json: Option<&'a str>,
    pub herbarium_csv: Option<&'a str>,
}

pub fn run_trend(
    observations_csv: &str,
    outputs: TrendOutputs<'_>,
    date: Option<&str>,
    species_csv: Option<&str>,
    config_path: Option<&str>,
) -> anyhow::Result<()> {
    let trend_csv = outputs.trend_csv;
    let config = load_config(config_path)?;
    let today = analysis_date(date)?;
    let pool = load_pool(species_csv)?;

    let batch = open_observations(observations_csv, today, &config)?;
    let trend = compute_trend(batch.observations, &pool, today, &config);

    let file = File::create(trend_csv).with_context(|| format!("failed to create {trend_csv}"))?;
    write_trend_csv(&trend, file)?;

    info!(
        "Trend written to {}: {} species over {} years, slope {:+.2} days/year",
        trend_csv,
        trend.species_used,
        trend.years.len(),
        trend.slope_days_per_year
    );

    if let Some(summary_json) = outputs.summary_json {
        let specimens = match outputs.herbarium_csv {
            Some(path) => {
                let file = File::open(path).with_context(|| format!("failed to open {path}"))?;
                Some(pool_specimens(file, &pool)?)
            }
            None => None,
        };
        let summary = build_summary(&trend, specimens.as_deref(), today, Utc::now(), &config);
        let file = File::create(summary_json).with_context(|| format!("failed to create {summary_json}"))?;
        let mut writer = BufWriter::new(file);
        write_summary(&summary, &mut writer)?;
        writer.flush()?;
        info!("Trend summary written to {}", summary_json);
    } else if outputs.herbarium_csv.is_some() {
        warn!("--herbarium-csv is only used together with --summary-json");
    }
    Ok(())
}
