//! The result structure handed to persistence and rendering.
//!
//! Everything here is plain serializable data; `bloom-cmd` writes it out
//! as JSON.

use crate::{
    aggregate::{RegionalStatus, SpeciesStatus, ZoneSummary},
    anomaly::GroupStatus,
    config::AnalysisConfig,
};
use bloom_obs::{
    geography::{Granularity, GroupKey},
    observation::Observation,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportYears {
    pub baseline_start: i32,
    pub baseline_end: i32,
    pub current_year: i32,
}

impl ReportYears {
    pub fn label(&self) -> String {
        format!("{}-{}", self.baseline_start, self.baseline_end)
    }
}

/// Thresholds the report was computed with, for disclosure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Method {
    pub onset_percentile: f64,
    pub status_threshold_days: f64,
    pub pending_grace_days: f64,
    pub min_baseline_years: usize,
    pub groups: String,
}

impl From<&AnalysisConfig> for Method {
    fn from(config: &AnalysisConfig) -> Self {
        Method {
            onset_percentile: config.onset_percentile,
            status_threshold_days: config.status_threshold_days,
            pending_grace_days: config.pending_grace_days,
            min_baseline_years: config.min_baseline_years,
            groups: "Cascade side x elevation band (low <500 m, mid 500-1200 m, high >1200 m), \
                     falling back to side then statewide"
                .to_string(),
        }
    }
}

/// One fallback-resolved group and the zones that resolved to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedGroup {
    pub requested: Vec<GroupKey>,
    #[serde(flatten)]
    pub status: GroupStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentObservation {
    pub observed_on: NaiveDate,
    pub uri: Option<String>,
    pub place_guess: Option<String>,
}

impl From<&Observation> for RecentObservation {
    fn from(obs: &Observation) -> Self {
        RecentObservation {
            observed_on: obs.observed_on,
            uri: obs.uri.clone(),
            place_guess: obs.place_guess.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeciesReport {
    pub species: String,
    pub common_name: String,
    #[serde(flatten)]
    pub summary: SpeciesStatus,
    /// e.g. `"zone:2, side:1"`.
    pub granularity: String,
    pub historical_obs: usize,
    pub groups: Vec<ResolvedGroup>,
    pub recent_observations: Vec<RecentObservation>,
}

impl SpeciesReport {
    /// How many resolved groups ended up at each granularity.
    pub fn granularity_summary(groups: &[ResolvedGroup]) -> String {
        [Granularity::Zone, Granularity::Side, Granularity::Statewide]
            .into_iter()
            .filter_map(|granularity| {
                let n = groups
                    .iter()
                    .filter(|g| g.status.granularity == granularity)
                    .count();
                (n > 0).then(|| format!("{granularity}:{n}"))
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BloomReport {
    pub generated_at: DateTime<Utc>,
    pub analysis_date: NaiveDate,
    pub years: ReportYears,
    pub method: Method,
    pub overall: RegionalStatus,
    pub zone_summary: Vec<ZoneSummary>,
    pub species: Vec<SpeciesReport>,
    pub candidates_considered: usize,
    pub missing_species: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::BloomStatus;
    use bloom_obs::geography::{ElevationBand, Side};

    fn resolved(group: GroupKey) -> ResolvedGroup {
        ResolvedGroup {
            requested: vec![GroupKey::Zone(Side::East, ElevationBand::High)],
            status: GroupStatus {
                status: BloomStatus::Normal,
                baseline_doy: Some(100.0),
                current_doy: Some(102.0),
                anomaly_days: Some(2.0),
                support: 12.0,
                baseline_years: 6,
                current_obs: 2,
                ..GroupStatus::insufficient(group, 2)
            },
        }
    }

    #[test]
    fn test_granularity_summary() {
        let groups = vec![
            resolved(GroupKey::Zone(Side::West, ElevationBand::Low)),
            resolved(GroupKey::Side(Side::East)),
            resolved(GroupKey::Zone(Side::West, ElevationBand::Mid)),
        ];
        assert_eq!(SpeciesReport::granularity_summary(&groups), "zone:2, side:1");
        assert_eq!(SpeciesReport::granularity_summary(&[]), "");
    }

    #[test]
    fn test_resolved_group_serializes_flat_with_labels() {
        let value = serde_json::to_value(resolved(GroupKey::Side(Side::East))).unwrap();
        assert_eq!(value["group"], "east");
        assert_eq!(value["granularity"], "side");
        assert_eq!(value["requested"][0], "east-high");
        assert_eq!(value["status"], "normal");
        assert_eq!(value["anomaly_days"], 2.0);
        assert!(value["days_past_baseline"].is_null());
    }
}
