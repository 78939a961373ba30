//! Indicator species selection.

use crate::config::AnalysisConfig;
use serde::Serialize;
use std::cmp::Ordering;

/// What the selector knows about one analysed candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Coverage {
    pub species: String,
    /// Resolved groups with a usable baseline.
    pub usable_groups: usize,
    /// At least one group has a measured current-year onset.
    pub has_current_onset: bool,
    /// Sightings before the current year.
    pub historical_obs: usize,
}

/// Broader coverage first, then live signal, then history volume.
/// Scientific name breaks what is left, so the order is total.
pub fn rank(a: &Coverage, b: &Coverage) -> Ordering {
    b.usable_groups
        .cmp(&a.usable_groups)
        .then_with(|| b.has_current_onset.cmp(&a.has_current_onset))
        .then_with(|| b.historical_obs.cmp(&a.historical_obs))
        .then_with(|| a.species.cmp(&b.species))
}

/// Choose the indicator set.
///
/// Candidates under the coverage floor are dropped outright; the set is
/// allowed to come out smaller than the limit rather than be padded.
pub fn select_indicators(candidates: &[Coverage], config: &AnalysisConfig) -> Vec<Coverage> {
    let floor = config.min_usable_groups.max(1);
    let mut eligible: Vec<Coverage> = candidates
        .iter()
        .filter(|c| c.usable_groups >= floor)
        .cloned()
        .collect();
    eligible.sort_by(rank);
    eligible.truncate(config.indicator_limit);
    eligible
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coverage(species: &str, usable_groups: usize, has_current_onset: bool, historical_obs: usize) -> Coverage {
        Coverage {
            species: species.to_string(),
            usable_groups,
            has_current_onset,
            historical_obs,
        }
    }

    fn names(selected: &[Coverage]) -> Vec<&str> {
        selected.iter().map(|c| c.species.as_str()).collect()
    }

    #[test]
    fn test_ranking_keys_in_order() {
        let config = AnalysisConfig::default();
        let candidates = vec![
            coverage("Dodecatheon pulchellum", 2, false, 900),
            coverage("Ribes sanguineum", 3, false, 10),
            coverage("Erythronium grandiflorum", 2, true, 50),
            coverage("Balsamorhiza sagittata", 2, true, 400),
            coverage("Oemleria cerasiformis", 2, true, 400),
        ];
        let selected = select_indicators(&candidates, &config);
        assert_eq!(
            names(&selected),
            vec![
                "Ribes sanguineum",
                "Balsamorhiza sagittata",
                "Oemleria cerasiformis",
                "Erythronium grandiflorum",
                "Dodecatheon pulchellum",
            ]
        );
    }

    #[test]
    fn test_floor_excludes_and_limit_truncates() {
        let config = AnalysisConfig {
            indicator_limit: 2,
            min_usable_groups: 2,
            ..Default::default()
        };
        let candidates = vec![
            coverage("A", 1, true, 5000),
            coverage("B", 2, false, 10),
            coverage("C", 4, false, 10),
            coverage("D", 3, true, 10),
        ];
        let selected = select_indicators(&candidates, &config);
        assert_eq!(names(&selected), vec!["C", "D"]);

        let none = select_indicators(&[coverage("A", 0, true, 5000)], &AnalysisConfig::default());
        assert!(none.is_empty());
    }

    #[test]
    fn test_selection_is_deterministic_under_input_order() {
        let config = AnalysisConfig {
            indicator_limit: 3,
            ..Default::default()
        };
        let candidates = vec![
            coverage("Lomatium triternatum", 2, true, 100),
            coverage("Claytonia lanceolata", 2, true, 100),
            coverage("Trillium ovatum", 2, true, 100),
            coverage("Phlox longifolia", 2, true, 100),
        ];
        let mut reversed = candidates.clone();
        reversed.reverse();
        let first = select_indicators(&candidates, &config);
        assert_eq!(first, select_indicators(&reversed, &config));
        assert_eq!(
            names(&first),
            vec!["Claytonia lanceolata", "Lomatium triternatum", "Phlox longifolia"]
        );
    }
}
