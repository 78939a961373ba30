//! The `validate` command: a dry run of the normalizer.

use crate::input::{analysis_date, load_config, open_observations};
use bloom_obs::observation::NormalizedBatch;
use std::collections::BTreeSet;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationSummary {
    pub accepted: usize,
    pub rejected: usize,
    pub species: usize,
    pub without_coordinates: usize,
}

impl From<&NormalizedBatch> for ValidationSummary {
    fn from(batch: &NormalizedBatch) -> Self {
        let species: BTreeSet<&str> = batch.observations.iter().map(|o| o.species.as_str()).collect();
        ValidationSummary {
            accepted: batch.observations.len(),
            rejected: batch.rejected.len(),
            species: species.len(),
            without_coordinates: batch
                .observations
                .iter()
                .filter(|o| o.coordinates.is_none())
                .count(),
        }
    }
}

pub fn run_validate(observations_csv: &str, date: Option<&str>, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let today = analysis_date(date)?;
    let batch = open_observations(observations_csv, today, &config)?;

    for rejection in &batch.rejected {
        println!("line {}: {}", rejection.line, rejection.error);
    }
    let summary = ValidationSummary::from(&batch);
    println!(
        "{}: {} accepted ({} species, {} without coordinates), {} rejected",
        observations_csv, summary.accepted, summary.species, summary.without_coordinates, summary.rejected
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::read_observations;
    use bloom_data::AnalysisConfig;
    use chrono::NaiveDate;

    #[test]
    fn test_summary_counts() {
        let csv = "species,observed_on,latitude,longitude,elevation_m,uri,place_guess
Trillium ovatum,2024-03-28,47.61,-122.33,55,,Seattle
Trillium ovatum,2024-04-02,,,,,
Ribes sanguineum,2024-03-15,47.0,-122.0,,,
,2024-03-15,47.0,-122.0,,,
Ribes sanguineum,2024-03-20,47.0,,,,
";
        let today = NaiveDate::from_ymd_opt(2025, 4, 20).unwrap();
        let batch = read_observations(csv.as_bytes(), today, &AnalysisConfig::default()).unwrap();
        assert_eq!(
            ValidationSummary::from(&batch),
            ValidationSummary {
                accepted: 3,
                rejected: 2,
                species: 2,
                without_coordinates: 1,
            }
        );
    }
}
