//! Geography fallback: zone -> side -> statewide.
//!
//! Each granularity is tried as an independent step over the same
//! classified sightings; the first one with a usable baseline wins and
//! the result keeps the group it was actually computed at.

use crate::{
    anomaly::{classify_group, GroupStatus},
    baseline::build_baseline,
    config::AnalysisConfig,
    onset::GroupSeries,
};
use bloom_obs::{
    geography::{Geography, GroupKey},
    observation::Observation,
};
use bloom_utils::dates::{baseline_window, day_of_year};
use chrono::{Datelike, NaiveDate};
use log::debug;
use std::collections::BTreeSet;

/// One species' sightings with their geography attached.
#[derive(Debug, Clone)]
pub struct ClassifiedObservations<'a> {
    pub observations: Vec<(&'a Observation, Geography)>,
}

impl<'a> ClassifiedObservations<'a> {
    pub fn classify(observations: &'a [Observation], config: &AnalysisConfig) -> Self {
        ClassifiedObservations {
            observations: observations
                .iter()
                .map(|obs| (obs, Geography::classify(obs, &config.divide)))
                .collect(),
        }
    }

    /// Where resolution starts: every zone the sightings fall in. When no
    /// sighting has coordinates, the species starts (and ends) statewide.
    pub fn starting_groups(&self) -> BTreeSet<GroupKey> {
        let zones: BTreeSet<GroupKey> = self
            .observations
            .iter()
            .filter_map(|(_, geography)| geography.zone())
            .collect();
        if zones.is_empty() && !self.observations.is_empty() {
            BTreeSet::from([GroupKey::Statewide])
        } else {
            zones
        }
    }

    pub fn series(&self, group: GroupKey) -> GroupSeries {
        GroupSeries::collect(group, self.observations.iter().map(|(obs, g)| (*obs, g)))
    }
}

/// Evaluate a single group. `None` means no usable baseline at this
/// granularity, which sends the caller to the next one.
pub fn evaluate_group(
    classified: &ClassifiedObservations,
    group: GroupKey,
    today: NaiveDate,
    config: &AnalysisConfig,
) -> Option<GroupStatus> {
    let current_year = today.year();
    let min_obs = config.min_year_obs.at(group.granularity());
    let series = classified.series(group);

    let onsets = series.yearly_onsets(
        baseline_window(current_year, config.baseline_years),
        min_obs,
        config.onset_percentile,
    );
    let baseline = build_baseline(&onsets, current_year, config.min_baseline_years)?;
    let current = series.current_estimate(current_year, min_obs, config.onset_percentile);

    Some(classify_group(
        group,
        Some(&baseline),
        current.as_ref(),
        series.observations_in(current_year),
        day_of_year(&today),
        config,
    ))
}

/// Walk the fallback chain from `start`. When no granularity has a
/// baseline, the result is `insufficient_data` at the coarsest group tried.
pub fn resolve_group(
    classified: &ClassifiedObservations,
    start: GroupKey,
    today: NaiveDate,
    config: &AnalysisConfig,
) -> GroupStatus {
    let chain = start.fallback_chain();
    for group in &chain {
        if let Some(status) = evaluate_group(classified, *group, today, config) {
            if *group != start {
                debug!("{} resolved at {} ({})", start, group, status.status);
            }
            return status;
        }
    }
    let last = chain.last().copied().unwrap_or(GroupKey::Statewide);
    let current_obs = classified.series(last).observations_in(today.year());
    debug!("{} has no usable baseline at any granularity", start);
    GroupStatus::insufficient(last, current_obs)
}
