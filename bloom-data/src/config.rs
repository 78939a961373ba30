//! Analysis thresholds, passed by reference into every component.

use bloom_obs::geography::{DivideLine, Granularity};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of indicator species to report.
pub const INDICATOR_LIMIT_DEFAULT: usize = 20;

/// Longest baseline window accepted.
pub const MAX_BASELINE_YEARS: u32 = 200;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("onset percentile must be within [0, 1], got {0}")]
    Percentile(f64),

    #[error("baseline window must cover at least one year")]
    EmptyBaselineWindow,

    #[error("baseline window may cover at most 200 years, got {0}")]
    BaselineWindowTooLong(u32),

    #[error("minimum baseline years must be at least 1 and at most the window ({window}), got {min}")]
    BaselineYears { min: usize, window: u32 },

    #[error("minimum observations per year must be at least 1 at {0} granularity")]
    MinObservations(Granularity),

    #[error("{name} must be a non-negative number of days, got {value}")]
    Days { name: &'static str, value: f64 },

    #[error("indicator limit must be at least 1")]
    IndicatorLimit,
}

/// Minimum observations a year needs at each granularity before an onset
/// is estimated for it. Coarser groups pool more sightings, so they get by
/// with fewer per year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinObservations {
    pub zone: usize,
    pub side: usize,
    pub statewide: usize,
}

/// Settings for the long-run baseline trend export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    pub min_year_obs: usize,
    /// Species with fewer qualifying years are left out of the trend.
    pub min_years: usize,
    /// Collection years of herbarium specimens used as the reference period.
    pub herbarium_first_year: i32,
    pub herbarium_last_year: i32,
    /// Flowering specimens a species needs inside the reference period.
    pub herbarium_min_specimens: usize,
}

/// Immutable analysis configuration.
///
/// Every field has a default, so a JSON override file only needs the keys
/// it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Historical years before the current one that form the baseline.
    pub baseline_years: u32,
    pub onset_percentile: f64,
    pub min_year_obs: MinObservations,
    pub min_baseline_years: usize,
    /// |anomaly| at or beyond this many days is early/late.
    pub status_threshold_days: f64,
    /// Days past the baseline onset, with no current onset, before a group
    /// flips from pending to late.
    pub pending_grace_days: f64,
    pub indicator_limit: usize,
    /// Species with fewer usable groups are dropped from the indicator set.
    pub min_usable_groups: usize,
    pub recent_observation_limit: usize,
    pub divide: DivideLine,
    pub trend: TrendConfig,
}

impl Default for MinObservations {
    fn default() -> Self {
        MinObservations {
            zone: 3,
            side: 2,
            statewide: 2,
        }
    }
}

impl MinObservations {
    pub fn at(&self, granularity: Granularity) -> usize {
        match granularity {
            Granularity::Zone => self.zone,
            Granularity::Side => self.side,
            Granularity::Statewide => self.statewide,
        }
    }
}

impl Default for TrendConfig {
    fn default() -> Self {
        TrendConfig {
            min_year_obs: 3,
            min_years: 5,
            herbarium_first_year: 1950,
            herbarium_last_year: 2000,
            herbarium_min_specimens: 5,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            baseline_years: 9,
            onset_percentile: 0.2,
            min_year_obs: MinObservations::default(),
            min_baseline_years: 4,
            status_threshold_days: 7.0,
            pending_grace_days: 7.0,
            indicator_limit: INDICATOR_LIMIT_DEFAULT,
            min_usable_groups: 1,
            recent_observation_limit: 15,
            divide: DivideLine::default(),
            trend: TrendConfig::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.onset_percentile) {
            return Err(ConfigError::Percentile(self.onset_percentile));
        }
        if self.baseline_years == 0 {
            return Err(ConfigError::EmptyBaselineWindow);
        }
        if self.baseline_years > MAX_BASELINE_YEARS {
            return Err(ConfigError::BaselineWindowTooLong(self.baseline_years));
        }
        if self.min_baseline_years == 0 || self.min_baseline_years > self.baseline_years as usize {
            return Err(ConfigError::BaselineYears {
                min: self.min_baseline_years,
                window: self.baseline_years,
            });
        }
        for granularity in [Granularity::Zone, Granularity::Side, Granularity::Statewide] {
            if self.min_year_obs.at(granularity) == 0 {
                return Err(ConfigError::MinObservations(granularity));
            }
        }
        for (name, value) in [
            ("status_threshold_days", self.status_threshold_days),
            ("pending_grace_days", self.pending_grace_days),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Days { name, value });
            }
        }
        if self.indicator_limit == 0 {
            return Err(ConfigError::IndicatorLimit);
        }
        Ok(())
    }
}
