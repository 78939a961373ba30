use crate::{onset::YearlyOnset, stats::median};
use serde::Serialize;

/// Historical onset for one species in one group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Baseline {
    /// Median of the qualifying yearly onsets.
    pub onset_doy: f64,
    /// Qualifying years behind the median; doubles as support.
    pub years: usize,
}

/// Build a baseline from yearly onsets.
///
/// Onsets from `current_year` or later are ignored, so the season being
/// judged never shapes its own yardstick. Fewer than `min_years`
/// qualifying years yields no baseline.
pub fn build_baseline(onsets: &[YearlyOnset], current_year: i32, min_years: usize) -> Option<Baseline> {
    let values: Vec<f64> = onsets
        .iter()
        .filter(|onset| onset.year < current_year)
        .map(|onset| onset.onset_doy)
        .collect();
    if values.len() < min_years.max(1) {
        return None;
    }
    median(&values).map(|onset_doy| Baseline {
        onset_doy,
        years: values.len(),
    })
}
