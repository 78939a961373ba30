use bloom_utils::dates::DATE_FORMAT;
use chrono::{Datelike, NaiveDate};
use csv::ReaderBuilder;
use log::warn;
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, collections::BTreeMap, io::Read};
use thiserror::Error;

/// A record rejected by the normalizer. Every variant names the offending value.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    #[error("record could not be read: {0}")]
    Malformed(String),

    #[error("species is empty")]
    MissingSpecies,

    #[error("observation date is not YYYY-MM-DD: {0:?}")]
    BadDate(String),

    #[error("observation date {0} is after the analysis date {1}")]
    FutureDate(NaiveDate, NaiveDate),

    #[error("observation year {year} is before the window start {first_year}")]
    OutsideWindow { year: i32, first_year: i32 },

    #[error("only one of latitude/longitude is present")]
    PartialCoordinates,

    #[error("latitude out of range: {0}")]
    LatitudeOutOfRange(f64),

    #[error("longitude out of range: {0}")]
    LongitudeOutOfRange(f64),

    #[error("elevation must not be negative: {0}")]
    NegativeElevation(f64),

    #[error("{field} is not a number: {value:?}")]
    BadNumber { field: &'static str, value: String },
}

/// One row as it arrives from the data source. Empty CSV fields are `None`.
///
/// CSV header: `species,observed_on,latitude,longitude,elevation_m,uri,place_guess`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    pub species: String,
    pub observed_on: String,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub elevation_m: Option<String>,
    pub uri: Option<String>,
    pub place_guess: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A single flowering sighting, validated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Observation {
    pub species: String,
    pub observed_on: NaiveDate,
    pub coordinates: Option<Coordinates>,
    pub elevation_m: Option<f64>,
    pub uri: Option<String>,
    pub place_guess: Option<String>,
}

/// Bounds every accepted observation must fall inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizeWindow {
    /// Earliest calendar year accepted.
    pub first_year: i32,
    /// Analysis date; anything later is rejected.
    pub today: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    /// 1-based line in the source, counting the header.
    pub line: usize,
    pub error: NormalizeError,
}

#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    pub observations: Vec<Observation>,
    pub rejected: Vec<Rejection>,
}

fn parse_number(field: &'static str, value: &Option<String>) -> Result<Option<f64>, NormalizeError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| NormalizeError::BadNumber {
                field,
                value: s.to_string(),
            }),
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

impl RawObservation {
    /// Validate and convert. Bad input is rejected, never coerced.
    pub fn normalize(&self, window: &NormalizeWindow) -> Result<Observation, NormalizeError> {
        let species = self.species.trim();
        if species.is_empty() {
            return Err(NormalizeError::MissingSpecies);
        }

        let observed_on = NaiveDate::parse_from_str(self.observed_on.trim(), DATE_FORMAT)
            .map_err(|_| NormalizeError::BadDate(self.observed_on.clone()))?;
        if observed_on > window.today {
            return Err(NormalizeError::FutureDate(observed_on, window.today));
        }
        if observed_on.year() < window.first_year {
            return Err(NormalizeError::OutsideWindow {
                year: observed_on.year(),
                first_year: window.first_year,
            });
        }

        let latitude = parse_number("latitude", &self.latitude)?;
        let longitude = parse_number("longitude", &self.longitude)?;
        let coordinates = match (latitude, longitude) {
            (None, None) => None,
            (Some(latitude), Some(longitude)) => {
                if !(-90.0..=90.0).contains(&latitude) {
                    return Err(NormalizeError::LatitudeOutOfRange(latitude));
                }
                if !(-180.0..=180.0).contains(&longitude) {
                    return Err(NormalizeError::LongitudeOutOfRange(longitude));
                }
                Some(Coordinates {
                    latitude,
                    longitude,
                })
            }
            _ => return Err(NormalizeError::PartialCoordinates),
        };

        let elevation_m = parse_number("elevation_m", &self.elevation_m)?;
        if let Some(e) = elevation_m {
            if e < 0.0 {
                return Err(NormalizeError::NegativeElevation(e));
            }
        }

        Ok(Observation {
            species: species.to_string(),
            observed_on,
            coordinates,
            elevation_m,
            uri: non_empty(&self.uri),
            place_guess: non_empty(&self.place_guess),
        })
    }
}

impl NormalizedBatch {
    /// Read and normalize a CSV stream with a header row.
    ///
    /// Rows that cannot be deserialized are rejected like any other bad
    /// record; only a failure to read the header is an error.
    pub fn from_csv_reader<R: Read>(
        reader: R,
        window: &NormalizeWindow,
    ) -> Result<NormalizedBatch, csv::Error> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        rdr.headers()?;

        let mut batch = NormalizedBatch::default();
        for (index, result) in rdr.deserialize::<RawObservation>().enumerate() {
            let line = index + 2;
            let normalized = result
                .map_err(|e| NormalizeError::Malformed(e.to_string()))
                .and_then(|raw| raw.normalize(window));
            batch.push(line, normalized);
        }
        Ok(batch)
    }

    fn push(&mut self, line: usize, normalized: Result<Observation, NormalizeError>) {
        match normalized {
            Ok(observation) => self.observations.push(observation),
            Err(error) => {
                warn!("rejected observation on line {}: {}", line, error);
                self.rejected.push(Rejection { line, error });
            }
        }
    }
}

impl Observation {
    /// Group observations by species, keyed in name order.
    pub fn group_by_species(observations: Vec<Observation>) -> BTreeMap<String, Vec<Observation>> {
        let mut result: BTreeMap<String, Vec<Observation>> = BTreeMap::new();
        for obs in observations {
            result.entry(obs.species.clone()).or_default().push(obs);
        }
        result
    }

    pub fn year(&self) -> i32 {
        self.observed_on.year()
    }
}

/// Most recent first.
pub fn sort_most_recent_first(observations: &mut [&Observation]) {
    observations.sort_by(|a, b| match b.observed_on.cmp(&a.observed_on) {
        Ordering::Equal => a.uri.cmp(&b.uri),
        other => other,
    });
}
