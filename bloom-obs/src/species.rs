use csv::ReaderBuilder;
use serde::{Deserialize, Serialize};

/// Embedded CSV of the default candidate pool: Washington spring indicators
/// spanning the state's climates.
pub static CANDIDATE_SPECIES_CSV: &str = include_str!("../../fixtures/candidate_species.csv");

/// A species eligible for the indicator set.
#[derive(Debug, PartialEq, Eq, Clone, Serialize, Deserialize)]
pub struct CandidateSpecies {
    pub scientific_name: String,
    pub common_name: String,
}

/// The candidate species pool, in fixture order.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct SpeciesPool(pub Vec<CandidateSpecies>);

impl SpeciesPool {
    /// The embedded default pool.
    pub fn default_pool() -> SpeciesPool {
        // the fixture is compiled in and covered by tests
        SpeciesPool::parse_csv(CANDIDATE_SPECIES_CSV).unwrap_or_default()
    }

    /// Parse a pool CSV.
    ///
    /// Expected CSV columns (with headers): scientific_name, common_name.
    /// A blank common name falls back to the scientific name.
    pub fn parse_csv(csv_object: &str) -> Result<SpeciesPool, csv::Error> {
        let mut species_list: Vec<CandidateSpecies> = Vec::new();
        let mut rdr = ReaderBuilder::new()
            .delimiter(b',')
            .has_headers(true)
            .flexible(true)
            .from_reader(csv_object.as_bytes());
        for row in rdr.records() {
            let record = row?;
            let scientific_name = record.get(0).unwrap_or("").trim().to_string();
            if scientific_name.is_empty() {
                continue;
            }
            let common_name = match record.get(1).map(str::trim) {
                Some(name) if !name.is_empty() => name.to_string(),
                _ => scientific_name.clone(),
            };
            if species_list
                .iter()
                .any(|s| s.scientific_name.eq_ignore_ascii_case(&scientific_name))
            {
                continue;
            }
            species_list.push(CandidateSpecies {
                scientific_name,
                common_name,
            });
        }
        Ok(SpeciesPool(species_list))
    }

    /// Case-insensitive lookup by scientific name.
    pub fn get(&self, scientific_name: &str) -> Option<&CandidateSpecies> {
        let name = scientific_name.trim();
        self.0
            .iter()
            .find(|s| s.scientific_name.eq_ignore_ascii_case(name))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CandidateSpecies> {
        self.0.iter()
    }
}
