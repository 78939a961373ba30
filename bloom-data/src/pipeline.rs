//! End-to-end analysis: observations in, [`BloomReport`] out.

use crate::{
    aggregate::{zone_summary, RegionalStatus, SpeciesStatus},
    anomaly::GroupStatus,
    config::AnalysisConfig,
    fallback::{resolve_group, ClassifiedObservations},
    report::{BloomReport, Method, RecentObservation, ReportYears, ResolvedGroup, SpeciesReport},
    select::{select_indicators, Coverage},
};
use bloom_obs::{
    geography::GroupKey,
    observation::{sort_most_recent_first, Observation},
    species::SpeciesPool,
};
use bloom_utils::dates::baseline_window;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use log::{debug, info};
use std::{cmp::Ordering, collections::BTreeMap};

/// Full result for one candidate species, before selection.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeciesAnalysis {
    pub species: String,
    pub common_name: String,
    pub status: SpeciesStatus,
    pub groups: Vec<ResolvedGroup>,
    pub historical_obs: usize,
    pub recent: Vec<RecentObservation>,
}

impl SpeciesAnalysis {
    pub fn coverage(&self) -> Coverage {
        Coverage {
            species: self.species.clone(),
            usable_groups: self.status.groups_used,
            has_current_onset: self.status.has_current_data,
            historical_obs: self.historical_obs,
        }
    }

    fn into_report(self) -> SpeciesReport {
        SpeciesReport {
            granularity: SpeciesReport::granularity_summary(&self.groups),
            species: self.species,
            common_name: self.common_name,
            summary: self.status,
            historical_obs: self.historical_obs,
            groups: self.groups,
            recent_observations: self.recent,
        }
    }
}

/// Largest |anomaly| first; groups without one go last, in key order.
fn by_anomaly_magnitude(a: &ResolvedGroup, b: &ResolvedGroup) -> Ordering {
    let magnitude = |g: &ResolvedGroup| g.status.anomaly_days.map(f64::abs);
    match (magnitude(a), magnitude(b)) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.status.group.cmp(&b.status.group))
}

/// Resolve every zone a species was seen in and roll the results up.
///
/// Zones that fall back to the same coarser group share one entry, so a
/// side or statewide baseline is never counted twice.
pub fn analyze_species(
    species: &str,
    common_name: &str,
    observations: &[Observation],
    today: NaiveDate,
    config: &AnalysisConfig,
) -> SpeciesAnalysis {
    let current_year = today.year();
    let classified = ClassifiedObservations::classify(observations, config);

    let mut resolved: BTreeMap<GroupKey, ResolvedGroup> = BTreeMap::new();
    for start in classified.starting_groups() {
        let status = resolve_group(&classified, start, today, config);
        resolved
            .entry(status.group)
            .or_insert_with(|| ResolvedGroup {
                requested: Vec::new(),
                status,
            })
            .requested
            .push(start);
    }
    let mut groups: Vec<ResolvedGroup> = resolved.into_values().collect();
    groups.sort_by(by_anomaly_magnitude);

    let mut current: Vec<&Observation> = observations
        .iter()
        .filter(|obs| obs.year() == current_year)
        .collect();
    let historical_obs = observations
        .iter()
        .filter(|obs| obs.year() < current_year)
        .count();
    sort_most_recent_first(&mut current);

    let statuses: Vec<GroupStatus> = groups.iter().map(|g| g.status.clone()).collect();
    let status = SpeciesStatus::from_groups(&statuses, current.len(), config);
    debug!(
        "{species}: {} ({} groups usable, {} current obs)",
        status.status, status.groups_used, status.current_obs
    );

    SpeciesAnalysis {
        species: species.to_string(),
        common_name: common_name.to_string(),
        status,
        groups,
        historical_obs,
        recent: current
            .into_iter()
            .take(config.recent_observation_limit)
            .map(RecentObservation::from)
            .collect(),
    }
}

/// Run the whole pipeline over a snapshot of observations.
///
/// Only species in `pool` are analysed, under the pool's spelling of the
/// name; an empty pool accepts every species present.
pub fn analyze(
    observations: Vec<Observation>,
    pool: &SpeciesPool,
    today: NaiveDate,
    generated_at: DateTime<Utc>,
    config: &AnalysisConfig,
) -> BloomReport {
    let current_year = today.year();
    let window = baseline_window(current_year, config.baseline_years);
    let years = ReportYears {
        baseline_start: *window.start(),
        baseline_end: *window.end(),
        current_year,
    };

    let mut matched: BTreeMap<String, (String, Vec<Observation>)> = BTreeMap::new();
    let mut unmatched = 0;
    for (name, sightings) in Observation::group_by_species(observations) {
        let (scientific_name, common_name) = match pool.get(&name) {
            Some(candidate) => (candidate.scientific_name.clone(), candidate.common_name.clone()),
            None if pool.is_empty() => (name.clone(), name.clone()),
            None => {
                unmatched += sightings.len();
                continue;
            }
        };
        matched
            .entry(scientific_name)
            .or_insert_with(|| (common_name, Vec::new()))
            .1
            .extend(sightings);
    }
    if unmatched > 0 {
        debug!("{unmatched} observations of species outside the candidate pool ignored");
    }

    let missing_species: Vec<String> = pool
        .iter()
        .filter(|candidate| !matched.contains_key(&candidate.scientific_name))
        .map(|candidate| candidate.scientific_name.clone())
        .collect();

    let mut analyses: BTreeMap<String, SpeciesAnalysis> = matched
        .iter()
        .map(|(name, (common_name, sightings))| {
            (name.clone(), analyze_species(name, common_name, sightings, today, config))
        })
        .collect();
    let candidates_considered = analyses.len();

    let coverage: Vec<Coverage> = analyses.values().map(SpeciesAnalysis::coverage).collect();
    let selected: Vec<SpeciesAnalysis> = select_indicators(&coverage, config)
        .iter()
        .filter_map(|c| analyses.remove(&c.species))
        .collect();
    info!(
        "selected {} indicator species of {} considered",
        selected.len(),
        candidates_considered
    );

    let zones = zone_summary(selected.iter().flat_map(|s| s.groups.iter().map(|g| &g.status)), config);
    let statuses: Vec<&SpeciesStatus> = selected.iter().map(|s| &s.status).collect();
    let overall = RegionalStatus::from_species(&statuses, &years.label(), config);
    info!(
        "overall {} ({} of {} species with a live signal)",
        overall.status, overall.species_with_signal, overall.species_count
    );

    BloomReport {
        generated_at,
        analysis_date: today,
        years,
        method: Method::from(config),
        overall,
        zone_summary: zones,
        species: selected.into_iter().map(SpeciesAnalysis::into_report).collect(),
        candidates_considered,
        missing_species,
    }
}
