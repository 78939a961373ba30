//! Support-weighted roll-up: groups -> species -> region.
//!
//! Both levels go through [`combine`], so a species and the region are
//! classified by exactly the same rule: weighted mean of the children's
//! anomalies, then the early/normal/late thresholds. Categorical labels
//! are never voted on.

use crate::{anomaly::GroupStatus, config::AnalysisConfig, stats::weighted_mean, status::BloomStatus};
use serde::Serialize;
use std::collections::BTreeMap;

/// One child's contribution to a parent status.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Signal {
    pub status: BloomStatus,
    /// Anomaly to average; `None` for pending / insufficient children.
    pub anomaly_days: Option<f64>,
    pub support: f64,
}

/// Parent status and the weighted anomaly it was classified from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Combined {
    pub status: BloomStatus,
    pub anomaly_days: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeciesStatus {
    pub status: BloomStatus,
    #[serde(serialize_with = "crate::rounding::hundredths")]
    pub anomaly_days: Option<f64>,
    pub support: f64,
    /// Resolved groups with a usable baseline.
    pub groups_used: usize,
    pub current_obs: usize,
    /// At least one group has a measured current-year onset.
    pub has_current_data: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionalStatus {
    pub status: BloomStatus,
    #[serde(serialize_with = "crate::rounding::hundredths")]
    pub anomaly_days: Option<f64>,
    pub species_count: usize,
    /// Species currently early, normal or late (not pending).
    pub species_with_signal: usize,
    pub interpretation: String,
}

/// Support-weighted anomaly of one group label across indicator species.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneSummary {
    pub zone: String,
    pub status: BloomStatus,
    #[serde(serialize_with = "crate::rounding::hundredths")]
    pub anomaly_days: Option<f64>,
    pub species_count: usize,
}

/// Combine children into a parent.
///
/// * any child with an anomaly and positive support: weighted mean,
///   reclassified through the thresholds
/// * otherwise any pending child: pending
/// * otherwise: insufficient data
pub fn combine(children: &[Signal], threshold_days: f64) -> Combined {
    let pairs: Vec<(f64, f64)> = children
        .iter()
        .filter(|c| c.status.is_signal())
        .filter_map(|c| c.anomaly_days.map(|a| (a, c.support)))
        .collect();

    if let Some(mean) = weighted_mean(&pairs) {
        return Combined {
            status: BloomStatus::from_anomaly(mean, threshold_days),
            anomaly_days: Some(mean),
        };
    }
    let status = if children.iter().any(|c| c.status == BloomStatus::Pending) {
        BloomStatus::Pending
    } else {
        BloomStatus::InsufficientData
    };
    Combined {
        status,
        anomaly_days: None,
    }
}

impl Signal {
    pub fn from_group(group: &GroupStatus, threshold_days: f64) -> Signal {
        Signal {
            status: group.status,
            anomaly_days: group.weighted_anomaly(threshold_days),
            support: group.support,
        }
    }
}

impl From<&SpeciesStatus> for Signal {
    fn from(species: &SpeciesStatus) -> Self {
        Signal {
            status: species.status,
            anomaly_days: species.anomaly_days,
            support: species.support,
        }
    }
}

impl SpeciesStatus {
    /// Roll a species' fallback-resolved groups into one status.
    ///
    /// Species support is `groups_used * current_obs`, each floored at one,
    /// so broad coverage and fresh sightings both count at the regional level.
    pub fn from_groups(groups: &[GroupStatus], current_obs: usize, config: &AnalysisConfig) -> SpeciesStatus {
        let signals: Vec<Signal> = groups
            .iter()
            .map(|g| Signal::from_group(g, config.status_threshold_days))
            .collect();
        let combined = combine(&signals, config.status_threshold_days);
        let groups_used = groups.iter().filter(|g| g.has_baseline()).count();
        SpeciesStatus {
            status: combined.status,
            anomaly_days: combined.anomaly_days,
            support: (groups_used.max(1) * current_obs.max(1)) as f64,
            groups_used,
            current_obs,
            has_current_data: groups.iter().any(GroupStatus::has_current_onset),
        }
    }
}

impl RegionalStatus {
    pub fn from_species(species: &[&SpeciesStatus], baseline_label: &str, config: &AnalysisConfig) -> RegionalStatus {
        let signals: Vec<Signal> = species.iter().map(|s| Signal::from(*s)).collect();
        let combined = combine(&signals, config.status_threshold_days);
        RegionalStatus {
            status: combined.status,
            anomaly_days: combined.anomaly_days,
            species_count: species.len(),
            species_with_signal: species.iter().filter(|s| s.status.is_signal()).count(),
            interpretation: interpret(combined.status, baseline_label),
        }
    }
}

fn interpret(status: BloomStatus, baseline_label: &str) -> String {
    match status {
        BloomStatus::Early => format!("Flowering is trending earlier than the {baseline_label} baseline."),
        BloomStatus::Late => format!("Flowering is trending later than the {baseline_label} baseline."),
        BloomStatus::Normal => format!("Flowering is close to the {baseline_label} baseline."),
        BloomStatus::Pending => {
            "Too few current-year flowering observations yet to call the season.".to_string()
        }
        BloomStatus::InsufficientData => {
            format!("Not enough {baseline_label} history to build a baseline.")
        }
    }
}

/// Per-group-label summary across species, e.g. how `west-low` is doing
/// over every indicator that resolved a group there.
pub fn zone_summary<'a, I>(groups: I, config: &AnalysisConfig) -> Vec<ZoneSummary>
where
    I: IntoIterator<Item = &'a GroupStatus>,
{
    let mut by_label: BTreeMap<String, Vec<Signal>> = BTreeMap::new();
    for group in groups {
        if group.has_baseline() {
            by_label
                .entry(group.group.label())
                .or_default()
                .push(Signal::from_group(group, config.status_threshold_days));
        }
    }
    by_label
        .into_iter()
        .map(|(zone, signals)| {
            let combined = combine(&signals, config.status_threshold_days);
            ZoneSummary {
                zone,
                status: combined.status,
                anomaly_days: combined.anomaly_days,
                species_count: signals.len(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use bloom_obs::geography::{ElevationBand, GroupKey, Side};

    fn signal(status: BloomStatus, anomaly_days: Option<f64>, support: f64) -> Signal {
        Signal {
            status,
            anomaly_days,
            support,
        }
    }

    fn group(key: GroupKey, status: BloomStatus, anomaly: Option<f64>, support: f64) -> GroupStatus {
        GroupStatus {
            group: key,
            granularity: key.granularity(),
            status,
            baseline_doy: Some(95.0),
            current_doy: anomaly.map(|a| 95.0 + a),
            anomaly_days: anomaly,
            days_past_baseline: None,
            support,
            baseline_years: 8,
            current_obs: 3,
        }
    }

    #[test]
    fn test_weighted_mean_ignores_pending_group() {
        let children = [
            signal(BloomStatus::Early, Some(-10.0), 8.0),
            signal(BloomStatus::Normal, Some(2.0), 2.0),
            signal(BloomStatus::Pending, None, 5.0),
        ];
        let combined = combine(&children, 7.0);
        assert_relative_eq!(combined.anomaly_days.unwrap(), -7.6, epsilon = 1e-9);
        assert_eq!(combined.status, BloomStatus::Early);
    }

    #[test]
    fn test_pending_and_insufficient_fallthrough() {
        let pending = [
            signal(BloomStatus::Pending, None, 3.0),
            signal(BloomStatus::InsufficientData, None, 0.0),
        ];
        assert_eq!(combine(&pending, 7.0).status, BloomStatus::Pending);

        let nothing = [signal(BloomStatus::InsufficientData, None, 0.0)];
        let combined = combine(&nothing, 7.0);
        assert_eq!(combined.status, BloomStatus::InsufficientData);
        assert_eq!(combined.anomaly_days, None);
        assert_eq!(combine(&[], 7.0).status, BloomStatus::InsufficientData);
    }

    #[test]
    fn test_doubling_support_pulls_toward_that_child() {
        let base = [
            signal(BloomStatus::Early, Some(-12.0), 3.0),
            signal(BloomStatus::Late, Some(9.0), 4.0),
            signal(BloomStatus::Normal, Some(1.0), 2.0),
        ];
        let before = combine(&base, 7.0).anomaly_days.unwrap();
        for i in 0..base.len() {
            let mut doubled = base;
            doubled[i].support *= 2.0;
            let after = combine(&doubled, 7.0).anomaly_days.unwrap();
            let target = base[i].anomaly_days.unwrap();
            assert!(
                (after - target).abs() < (before - target).abs(),
                "child {i}: {before} -> {after} should approach {target}"
            );
        }
    }

    #[test]
    fn test_aggregation_is_order_independent() {
        let a = [
            signal(BloomStatus::Early, Some(-9.0), 5.0),
            signal(BloomStatus::Normal, Some(3.0), 1.0),
            signal(BloomStatus::Late, Some(12.0), 2.0),
        ];
        let mut b = a;
        b.reverse();
        assert_relative_eq!(
            combine(&a, 7.0).anomaly_days.unwrap(),
            combine(&b, 7.0).anomaly_days.unwrap(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_species_status_from_groups() {
        let config = AnalysisConfig::default();
        let groups = vec![
            group(GroupKey::Zone(Side::West, ElevationBand::Low), BloomStatus::Early, Some(-10.0), 8.0),
            group(GroupKey::Zone(Side::West, ElevationBand::Mid), BloomStatus::Normal, Some(2.0), 2.0),
            GroupStatus {
                status: BloomStatus::Pending,
                current_doy: None,
                anomaly_days: None,
                days_past_baseline: Some(-4.0),
                ..group(GroupKey::Side(Side::East), BloomStatus::Pending, None, 8.0)
            },
        ];
        let species = SpeciesStatus::from_groups(&groups, 6, &config);
        assert_eq!(species.status, BloomStatus::Early);
        assert_relative_eq!(species.anomaly_days.unwrap(), -7.6, epsilon = 1e-9);
        assert_eq!(species.groups_used, 3);
        assert_eq!(species.support, 18.0);
        assert!(species.has_current_data);
    }

    #[test]
    fn test_inferred_late_counts_as_a_signal() {
        let config = AnalysisConfig::default();
        let late = GroupStatus {
            status: BloomStatus::Late,
            current_doy: None,
            anomaly_days: None,
            days_past_baseline: Some(20.0),
            ..group(GroupKey::Statewide, BloomStatus::Late, None, 6.0)
        };
        let species = SpeciesStatus::from_groups(&[late], 0, &config);
        assert_eq!(species.status, BloomStatus::Late);
        assert_eq!(species.anomaly_days, Some(20.0));
        assert!(!species.has_current_data);
    }

    #[test]
    fn test_species_anomaly_serializes_to_hundredths() {
        let config = AnalysisConfig::default();
        let groups = vec![
            group(GroupKey::Zone(Side::West, ElevationBand::Low), BloomStatus::Early, Some(-10.0), 8.0),
            group(GroupKey::Zone(Side::West, ElevationBand::Mid), BloomStatus::Normal, Some(2.0 + 1e-13), 2.0),
        ];
        let species = SpeciesStatus::from_groups(&groups, 4, &config);
        let value = serde_json::to_value(&species).unwrap();
        assert_eq!(value["anomaly_days"], -7.6);
        assert_eq!(value["status"], "early");
    }

    #[test]
    fn test_late_group_never_rolls_up_as_normal() {
        let config = AnalysisConfig {
            pending_grace_days: 3.0,
            ..Default::default()
        };
        let baseline = crate::baseline::Baseline {
            onset_doy: 95.0,
            years: 9,
        };
        let group = crate::anomaly::classify_group(GroupKey::Statewide, Some(&baseline), None, 0, 100, &config);
        assert_eq!(group.status, BloomStatus::Late);

        let species = SpeciesStatus::from_groups(&[group.clone()], 0, &config);
        assert_eq!(species.status, group.status);
        assert_eq!(species.anomaly_days, Some(7.0));
    }

    #[test]
    fn test_regional_status_counts_live_signals() {
        let config = AnalysisConfig::default();
        let make = |status, anomaly_days, support| SpeciesStatus {
            status,
            anomaly_days,
            support,
            groups_used: 1,
            current_obs: 1,
            has_current_data: anomaly_days.is_some(),
        };
        let early = make(BloomStatus::Early, Some(-9.0), 4.0);
        let normal = make(BloomStatus::Normal, Some(-1.0), 1.0);
        let pending = make(BloomStatus::Pending, None, 1.0);
        let region = RegionalStatus::from_species(&[&early, &normal, &pending], "2016-2024", &config);
        assert_eq!(region.species_count, 3);
        assert_eq!(region.species_with_signal, 2);
        assert_relative_eq!(region.anomaly_days.unwrap(), -7.4, epsilon = 1e-9);
        assert_eq!(region.status, BloomStatus::Early);
        assert!(region.interpretation.contains("earlier than the 2016-2024 baseline"));
    }

    #[test]
    fn test_zone_summary_groups_by_label() {
        let config = AnalysisConfig::default();
        let west_low = GroupKey::Zone(Side::West, ElevationBand::Low);
        let groups = vec![
            group(west_low, BloomStatus::Early, Some(-8.0), 3.0),
            group(west_low, BloomStatus::Normal, Some(0.0), 1.0),
            group(GroupKey::Side(Side::East), BloomStatus::Late, Some(10.0), 2.0),
            GroupStatus::insufficient(GroupKey::Statewide, 0),
        ];
        let summary = zone_summary(&groups, &config);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].zone, "east");
        assert_eq!(summary[0].status, BloomStatus::Late);
        assert_eq!(summary[1].zone, "west-low");
        assert_eq!(summary[1].species_count, 2);
        assert_relative_eq!(summary[1].anomaly_days.unwrap(), -6.0, epsilon = 1e-9);
        assert_eq!(summary[1].status, BloomStatus::Normal);
    }
}
