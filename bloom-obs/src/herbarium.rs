//! Herbarium specimen records, used as a mid-century reference for the
//! baseline trend.
//!
//! CSV header: `species,collected_on,phenology`

use bloom_utils::dates::DATE_FORMAT;
use chrono::{Datelike, NaiveDate};
use csv::ReaderBuilder;
use log::{debug, warn};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Clone, Deserialize)]
struct RawSpecimen {
    species: String,
    collected_on: String,
    #[serde(default)]
    phenology: Option<String>,
}

/// A dated specimen collected in flower.
#[derive(Debug, Clone, PartialEq)]
pub struct Specimen {
    pub species: String,
    pub collected_on: NaiveDate,
}

impl Specimen {
    pub fn year(&self) -> i32 {
        self.collected_on.year()
    }
}

/// Read specimen records, keeping only those whose phenology mentions
/// flowering.
///
/// Rows without a usable species or date are skipped; only a failure to
/// read the header is an error.
pub fn read_flowering_specimens<R: Read>(reader: R) -> Result<Vec<Specimen>, csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    rdr.headers()?;

    let mut specimens = Vec::new();
    for (index, result) in rdr.deserialize::<RawSpecimen>().enumerate() {
        let line = index + 2;
        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                warn!("skipped specimen on line {}: {}", line, e);
                continue;
            }
        };
        let flowering = raw
            .phenology
            .as_deref()
            .is_some_and(|p| p.to_ascii_lowercase().contains("flower"));
        if !flowering || raw.species.is_empty() {
            continue;
        }
        match NaiveDate::parse_from_str(&raw.collected_on, DATE_FORMAT) {
            Ok(collected_on) => specimens.push(Specimen {
                species: raw.species,
                collected_on,
            }),
            Err(_) => debug!("specimen on line {} has no usable date: {:?}", line, raw.collected_on),
        }
    }
    Ok(specimens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_flowering_dated_specimens_are_kept() {
        let csv = "species,collected_on,phenology
Trillium ovatum,1962-04-11,Flowering
Trillium ovatum,1963-04-20,fruit
Trillium ovatum,1964-04,flowers and buds
Trillium ovatum,1965-04-02,
,1966-04-02,flowering
Ribes sanguineum,1971-03-30,In flower
";
        let specimens = read_flowering_specimens(csv.as_bytes()).unwrap();
        assert_eq!(
            specimens,
            vec![
                Specimen {
                    species: "Trillium ovatum".to_string(),
                    collected_on: NaiveDate::from_ymd_opt(1962, 4, 11).unwrap(),
                },
                Specimen {
                    species: "Ribes sanguineum".to_string(),
                    collected_on: NaiveDate::from_ymd_opt(1971, 3, 30).unwrap(),
                },
            ]
        );
        assert_eq!(specimens[1].year(), 1971);
    }

    #[test]
    fn test_missing_phenology_column_keeps_nothing() {
        let csv = "species,collected_on\nTrillium ovatum,1962-04-11\n";
        assert!(read_flowering_specimens(csv.as_bytes()).unwrap().is_empty());
    }
}
