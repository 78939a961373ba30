//! Long-run trend of statewide onsets across the baseline window.
//!
//! Each species' yearly onset is put on a common footing (days from that
//! species' own median, and a z-score) so early and late bloomers can be
//! averaged per year. A least-squares line through the yearly means
//! gives the drift in days per year.

use crate::{
    config::AnalysisConfig,
    fallback::ClassifiedObservations,
    rounding::{four_places, thousandths},
    stats::{linear_regression, mean, median, percentile, sample_stdev},
};
use bloom_obs::{geography::GroupKey, herbarium::Specimen, observation::Observation};
use bloom_utils::dates::day_of_year;
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::Serialize;
use std::{collections::BTreeMap, ops::RangeInclusive};

/// One species in one year, normalised against the species.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub species: String,
    pub year: i32,
    #[serde(serialize_with = "thousandths")]
    pub onset_doy: f64,
    #[serde(serialize_with = "thousandths")]
    pub species_median_doy: f64,
    #[serde(serialize_with = "thousandths")]
    pub anomaly_days: f64,
    #[serde(serialize_with = "thousandths")]
    pub zscore: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearlyTrend {
    pub year: i32,
    pub species_count: usize,
    #[serde(serialize_with = "thousandths")]
    pub mean_anomaly_days: f64,
    #[serde(serialize_with = "thousandths")]
    pub mean_zscore: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct BaselineTrend {
    pub points: Vec<TrendPoint>,
    pub years: Vec<YearlyTrend>,
    /// Days per year; negative means onsets drifting earlier.
    pub slope_days_per_year: f64,
    pub intercept: f64,
    pub species_used: usize,
}

impl BaselineTrend {
    /// Median yearly onset of every species in the trend.
    pub fn species_medians(&self) -> BTreeMap<&str, f64> {
        self.points
            .iter()
            .map(|p| (p.species.as_str(), p.species_median_doy))
            .collect()
    }
}

/// Herbarium onset of one species set against its recent median onset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HerbariumRow {
    pub species: String,
    pub herbarium_specimens: usize,
    #[serde(serialize_with = "thousandths")]
    pub herbarium_onset_doy: f64,
    #[serde(serialize_with = "thousandths")]
    pub recent_median_onset_doy: f64,
    /// Positive when the reference period flowered later than today.
    #[serde(serialize_with = "thousandths")]
    pub comparable_anomaly_days: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HerbariumComparison {
    pub first_year: i32,
    pub last_year: i32,
    pub species_used: usize,
    #[serde(serialize_with = "four_places")]
    pub mean_comparable_anomaly_days: Option<f64>,
    pub rows: Vec<HerbariumRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearSpan {
    pub start: i32,
    pub end: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearTrend {
    #[serde(serialize_with = "four_places")]
    pub slope_days_per_year: f64,
    #[serde(serialize_with = "four_places")]
    pub intercept: f64,
}

/// Everything the trend run produces apart from the per-species rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendSummary {
    pub generated_at: DateTime<Utc>,
    pub baseline_years: YearSpan,
    pub species_used: usize,
    pub yearly_aggregate: Vec<YearlyTrend>,
    pub linear_trend: LinearTrend,
    pub herbarium_comparison: Option<HerbariumComparison>,
}

impl TrendSummary {
    pub fn new(
        trend: &BaselineTrend,
        window: RangeInclusive<i32>,
        generated_at: DateTime<Utc>,
        herbarium_comparison: Option<HerbariumComparison>,
    ) -> TrendSummary {
        TrendSummary {
            generated_at,
            baseline_years: YearSpan {
                start: *window.start(),
                end: *window.end(),
            },
            species_used: trend.species_used,
            yearly_aggregate: trend.years.clone(),
            linear_trend: LinearTrend {
                slope_days_per_year: trend.slope_days_per_year,
                intercept: trend.intercept,
            },
            herbarium_comparison,
        }
    }
}

fn normalise(species: &str, onsets: &[(i32, f64)]) -> Vec<TrendPoint> {
    let values: Vec<f64> = onsets.iter().map(|(_, doy)| *doy).collect();
    let Some(species_median) = median(&values) else {
        return Vec::new();
    };
    let stdev = sample_stdev(&values);
    onsets
        .iter()
        .map(|&(year, onset_doy)| {
            let anomaly_days = onset_doy - species_median;
            TrendPoint {
                species: species.to_string(),
                year,
                onset_doy,
                species_median_doy: species_median,
                anomaly_days,
                zscore: if stdev > 0.0 { anomaly_days / stdev } else { 0.0 },
            }
        })
        .collect()
}

/// Build the trend over `window` for every species in `by_species`.
pub fn baseline_trend(
    by_species: &BTreeMap<String, Vec<Observation>>,
    window: RangeInclusive<i32>,
    config: &AnalysisConfig,
) -> BaselineTrend {
    let mut points = Vec::new();
    let mut species_used = 0;

    for (species, observations) in by_species {
        let classified = ClassifiedObservations::classify(observations, config);
        let onsets: Vec<(i32, f64)> = classified
            .series(GroupKey::Statewide)
            .yearly_onsets(window.clone(), config.trend.min_year_obs, config.onset_percentile)
            .into_iter()
            .map(|onset| (onset.year, onset.onset_doy))
            .collect();
        if onsets.len() < config.trend.min_years {
            debug!("{species}: {} qualifying years, left out of the trend", onsets.len());
            continue;
        }
        species_used += 1;
        points.extend(normalise(species, &onsets));
    }

    let mut per_year: BTreeMap<i32, Vec<&TrendPoint>> = BTreeMap::new();
    for point in &points {
        per_year.entry(point.year).or_default().push(point);
    }
    let years: Vec<YearlyTrend> = per_year
        .into_iter()
        .map(|(year, pts)| {
            let anomalies: Vec<f64> = pts.iter().map(|p| p.anomaly_days).collect();
            let zscores: Vec<f64> = pts.iter().map(|p| p.zscore).collect();
            YearlyTrend {
                year,
                mean_anomaly_days: mean(&anomalies).unwrap_or(0.0),
                mean_zscore: mean(&zscores).unwrap_or(0.0),
                species_count: pts.len(),
            }
        })
        .collect();

    let xs: Vec<f64> = years.iter().map(|y| y.year as f64).collect();
    let ys: Vec<f64> = years.iter().map(|y| y.mean_anomaly_days).collect();
    let (slope_days_per_year, intercept) = linear_regression(&xs, &ys);

    BaselineTrend {
        points,
        years,
        slope_days_per_year,
        intercept,
        species_used,
    }
}

/// Compare each trend species' herbarium onset, taken over flowering
/// specimens from the reference period, with its recent median onset.
///
/// Specimens must already carry the trend's spelling of the species.
/// Species with too few specimens are left out.
pub fn herbarium_comparison(
    specimens: &[Specimen],
    trend: &BaselineTrend,
    config: &AnalysisConfig,
) -> HerbariumComparison {
    let reference = config.trend.herbarium_first_year..=config.trend.herbarium_last_year;
    let mut doys: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for specimen in specimens.iter().filter(|s| reference.contains(&s.year())) {
        doys.entry(specimen.species.as_str())
            .or_default()
            .push(day_of_year(&specimen.collected_on) as f64);
    }

    let mut rows = Vec::new();
    for (species, recent_median) in trend.species_medians() {
        let Some(values) = doys.get(species) else {
            continue;
        };
        if values.len() < config.trend.herbarium_min_specimens {
            debug!("{species}: {} herbarium specimens, left out of the comparison", values.len());
            continue;
        }
        let Some(onset) = percentile(values, config.onset_percentile) else {
            continue;
        };
        rows.push(HerbariumRow {
            species: species.to_string(),
            herbarium_specimens: values.len(),
            herbarium_onset_doy: onset,
            recent_median_onset_doy: recent_median,
            comparable_anomaly_days: onset - recent_median,
        });
    }

    let anomalies: Vec<f64> = rows.iter().map(|r| r.comparable_anomaly_days).collect();
    let mean_comparable_anomaly_days = mean(&anomalies);
    info!(
        "Herbarium comparison: {} species, mean {:?} days",
        rows.len(),
        mean_comparable_anomaly_days
    );
    HerbariumComparison {
        first_year: *reference.start(),
        last_year: *reference.end(),
        species_used: rows.len(),
        mean_comparable_anomaly_days,
        rows,
    }
}
