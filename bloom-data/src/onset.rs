//! Robust per-year onset estimation.
//!
//! A year's onset is the low percentile (20th by default) of the
//! day-of-year of its flowering sightings. The minimum reacts to a single
//! stray early record; the median is slow to show a real early shift.

use crate::stats::percentile;
use bloom_obs::{
    geography::{Geography, GroupKey},
    observation::Observation,
};
use bloom_utils::dates::day_of_year;
use serde::Serialize;
use std::{collections::BTreeMap, ops::RangeInclusive};

/// Onset for one species, one group, one calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearlyOnset {
    pub year: i32,
    pub onset_doy: f64,
    /// Sightings behind the estimate.
    pub observations: usize,
}

/// Day-of-year samples for one species in one group, bucketed by year.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GroupSeries {
    pub by_year: BTreeMap<i32, Vec<f64>>,
}

/// Onset of a year's samples, or `None` when the year has fewer than
/// `min_obs` of them. A year at exactly `min_obs` is estimated normally.
pub fn estimate_onset(year: i32, doys: &[f64], min_obs: usize, pct: f64) -> Option<YearlyOnset> {
    if doys.len() < min_obs.max(1) {
        return None;
    }
    percentile(doys, pct).map(|onset_doy| YearlyOnset {
        year,
        onset_doy,
        observations: doys.len(),
    })
}

impl GroupSeries {
    /// Collect the sightings of `group` from classified observations.
    pub fn collect<'a, 'b, I>(group: GroupKey, observations: I) -> GroupSeries
    where
        I: IntoIterator<Item = (&'a Observation, &'b Geography)>,
    {
        let mut series = GroupSeries::default();
        for (obs, geography) in observations {
            if group.contains(geography) {
                series
                    .by_year
                    .entry(obs.year())
                    .or_default()
                    .push(day_of_year(&obs.observed_on) as f64);
            }
        }
        series
    }

    pub fn observations_in(&self, year: i32) -> usize {
        self.by_year.get(&year).map_or(0, Vec::len)
    }

    /// Onsets for every year in `years` that clears the gate. Years that
    /// fall short are dropped, not zero-filled.
    pub fn yearly_onsets(&self, years: RangeInclusive<i32>, min_obs: usize, pct: f64) -> Vec<YearlyOnset> {
        self.by_year
            .range(years)
            .filter_map(|(year, doys)| estimate_onset(*year, doys, min_obs, pct))
            .collect()
    }

    /// The current-period estimate, absent when the current year is short
    /// of `min_obs` sightings.
    pub fn current_estimate(&self, current_year: i32, min_obs: usize, pct: f64) -> Option<YearlyOnset> {
        self.by_year
            .get(&current_year)
            .and_then(|doys| estimate_onset(current_year, doys, min_obs, pct))
    }
}
