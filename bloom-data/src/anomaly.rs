use crate::{
    baseline::Baseline, config::AnalysisConfig, onset::YearlyOnset, status::BloomStatus,
};
use bloom_obs::geography::{Granularity, GroupKey};
use serde::Serialize;

/// Comparison of the current season against the baseline for one
/// (species, group).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStatus {
    /// The group the numbers were computed at.
    pub group: GroupKey,
    pub granularity: Granularity,
    pub status: BloomStatus,
    #[serde(serialize_with = "crate::rounding::tenths")]
    pub baseline_doy: Option<f64>,
    #[serde(serialize_with = "crate::rounding::tenths")]
    pub current_doy: Option<f64>,
    /// `current_doy - baseline_doy`; only when both exist.
    #[serde(serialize_with = "crate::rounding::tenths")]
    pub anomaly_days: Option<f64>,
    /// Today's day-of-year minus the baseline onset, when there is a
    /// baseline but no current onset.
    #[serde(serialize_with = "crate::rounding::tenths")]
    pub days_past_baseline: Option<f64>,
    pub support: f64,
    pub baseline_years: usize,
    pub current_obs: usize,
}

impl GroupStatus {
    pub fn insufficient(group: GroupKey, current_obs: usize) -> GroupStatus {
        GroupStatus {
            group,
            granularity: group.granularity(),
            status: BloomStatus::InsufficientData,
            baseline_doy: None,
            current_doy: None,
            anomaly_days: None,
            days_past_baseline: None,
            support: 0.0,
            baseline_years: 0,
            current_obs,
        }
    }

    /// The number this group contributes to a weighted mean.
    ///
    /// A measured anomaly when there is one. A late-by-inference group
    /// contributes its days past baseline, but never less than
    /// `threshold_days`: the grace margin can be shorter than the late
    /// threshold, and a late group must not average in as normal.
    /// Pending and insufficient groups contribute nothing.
    pub fn weighted_anomaly(&self, threshold_days: f64) -> Option<f64> {
        match self.status {
            BloomStatus::Early | BloomStatus::Normal => self.anomaly_days,
            BloomStatus::Late => self
                .anomaly_days
                .or_else(|| self.days_past_baseline.map(|days| days.max(threshold_days))),
            BloomStatus::Pending | BloomStatus::InsufficientData => None,
        }
    }

    pub fn has_current_onset(&self) -> bool {
        self.current_doy.is_some()
    }

    pub fn has_baseline(&self) -> bool {
        self.baseline_doy.is_some()
    }
}

/// Classify one group.
///
/// * no baseline: `insufficient_data`
/// * baseline and current onset: early / normal / late by anomaly
/// * baseline only: `pending` until today passes baseline + grace, then
///   `late`, since silence that far past the usual onset is itself a signal
pub fn classify_group(
    group: GroupKey,
    baseline: Option<&Baseline>,
    current: Option<&YearlyOnset>,
    current_obs: usize,
    today_doy: u32,
    config: &AnalysisConfig,
) -> GroupStatus {
    let Some(baseline) = baseline else {
        return GroupStatus::insufficient(group, current_obs);
    };
    let baseline_weight = baseline.years.max(1) as f64;

    match current {
        Some(current) => {
            let anomaly = current.onset_doy - baseline.onset_doy;
            GroupStatus {
                group,
                granularity: group.granularity(),
                status: BloomStatus::from_anomaly(anomaly, config.status_threshold_days),
                baseline_doy: Some(baseline.onset_doy),
                current_doy: Some(current.onset_doy),
                anomaly_days: Some(anomaly),
                days_past_baseline: None,
                support: baseline_weight * current_obs.max(1) as f64,
                baseline_years: baseline.years,
                current_obs,
            }
        }
        None => {
            let days_past = today_doy as f64 - baseline.onset_doy;
            let status = if days_past > config.pending_grace_days {
                BloomStatus::Late
            } else {
                BloomStatus::Pending
            };
            GroupStatus {
                group,
                granularity: group.granularity(),
                status,
                baseline_doy: Some(baseline.onset_doy),
                current_doy: None,
                anomaly_days: None,
                days_past_baseline: Some(days_past),
                support: baseline_weight,
                baseline_years: baseline.years,
                current_obs,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bloom_obs::geography::{ElevationBand, Side};

    const ZONE: GroupKey = GroupKey::Zone(Side::West, ElevationBand::Low);

    fn baseline_95() -> Baseline {
        Baseline {
            onset_doy: 95.0,
            years: 9,
        }
    }

    fn current(onset_doy: f64, observations: usize) -> YearlyOnset {
        YearlyOnset {
            year: 2025,
            onset_doy,
            observations,
        }
    }

    #[test]
    fn test_current_onset_ten_days_early() {
        let config = AnalysisConfig::default();
        let status = classify_group(ZONE, Some(&baseline_95()), Some(&current(85.0, 4)), 4, 100, &config);
        assert_eq!(status.anomaly_days, Some(-10.0));
        assert_eq!(status.status, BloomStatus::Early);
        assert_eq!(status.support, 36.0);
        assert_eq!(status.weighted_anomaly(7.0), Some(-10.0));
        assert_eq!(status.granularity, Granularity::Zone);
    }

    #[test]
    fn test_no_current_onset_before_cutoff_is_pending() {
        let config = AnalysisConfig::default();
        let status = classify_group(ZONE, Some(&baseline_95()), None, 0, 80, &config);
        assert_eq!(status.status, BloomStatus::Pending);
        assert_eq!(status.anomaly_days, None);
        assert_eq!(status.days_past_baseline, Some(-15.0));
        assert_eq!(status.weighted_anomaly(7.0), None);
    }

    #[test]
    fn test_no_current_onset_well_past_cutoff_is_late() {
        let config = AnalysisConfig::default();
        let status = classify_group(ZONE, Some(&baseline_95()), None, 0, 140, &config);
        assert_eq!(status.status, BloomStatus::Late);
        assert_eq!(status.anomaly_days, None);
        assert_eq!(status.weighted_anomaly(7.0), Some(45.0));
        assert_eq!(status.support, 9.0);
    }

    #[test]
    fn test_grace_margin_default_and_override() {
        let config = AnalysisConfig::default();
        // cutoff = 95 + 7 = 102; at the cutoff it is not yet past it
        let at_cutoff = classify_group(ZONE, Some(&baseline_95()), None, 0, 102, &config);
        assert_eq!(at_cutoff.status, BloomStatus::Pending);
        let past_cutoff = classify_group(ZONE, Some(&baseline_95()), None, 0, 103, &config);
        assert_eq!(past_cutoff.status, BloomStatus::Late);

        let patient = AnalysisConfig {
            pending_grace_days: 21.0,
            ..Default::default()
        };
        let status = classify_group(ZONE, Some(&baseline_95()), None, 0, 110, &patient);
        assert_eq!(status.status, BloomStatus::Pending);
    }

    #[test]
    fn test_short_grace_late_contributes_at_least_the_threshold() {
        let config = AnalysisConfig {
            pending_grace_days: 3.0,
            ..Default::default()
        };
        // five days past a day-95 baseline: late under a 3-day grace
        let status = classify_group(GroupKey::Statewide, Some(&baseline_95()), None, 0, 100, &config);
        assert_eq!(status.status, BloomStatus::Late);
        assert_eq!(status.days_past_baseline, Some(5.0));
        assert_eq!(status.weighted_anomaly(config.status_threshold_days), Some(7.0));
    }

    #[test]
    fn test_no_baseline_is_insufficient() {
        let config = AnalysisConfig::default();
        let status = classify_group(ZONE, None, Some(&current(85.0, 4)), 4, 100, &config);
        assert_eq!(status.status, BloomStatus::InsufficientData);
        assert_eq!(status.anomaly_days, None);
        assert_eq!(status.current_obs, 4);
        assert_eq!(status.support, 0.0);
    }

    #[test]
    fn test_boundary_anomalies() {
        let config = AnalysisConfig::default();
        let classify = |onset: f64| {
            classify_group(ZONE, Some(&baseline_95()), Some(&current(onset, 3)), 3, 120, &config).status
        };
        assert_eq!(classify(88.0), BloomStatus::Early);
        assert_eq!(classify(102.0), BloomStatus::Late);
        assert_eq!(classify(95.0), BloomStatus::Normal);
    }
}
