//! Fixed precision for serialized day counts.
//!
//! Values stay at full precision in memory and through aggregation; they
//! are only rounded on the way out, via `#[serde(serialize_with = ...)]`.

use serde::{Serialize, Serializer};

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

pub trait Rounded {
    fn rounded(&self, places: i32) -> Self;
}

impl Rounded for f64 {
    fn rounded(&self, places: i32) -> Self {
        round_to(*self, places)
    }
}

impl Rounded for Option<f64> {
    fn rounded(&self, places: i32) -> Self {
        self.map(|v| round_to(v, places))
    }
}

/// Group-level onsets and anomalies: 0.1 day.
pub fn tenths<T: Rounded + Serialize, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    value.rounded(1).serialize(serializer)
}

/// Weighted species, zone and regional anomalies: 0.01 day.
pub fn hundredths<T: Rounded + Serialize, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    value.rounded(2).serialize(serializer)
}

/// Trend rows.
pub fn thousandths<T: Rounded + Serialize, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    value.rounded(3).serialize(serializer)
}

/// Trend line coefficients.
pub fn four_places<T: Rounded + Serialize, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    value.rounded(4).serialize(serializer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Sample {
        #[serde(serialize_with = "hundredths")]
        weighted: Option<f64>,
        #[serde(serialize_with = "tenths")]
        onset: f64,
        #[serde(serialize_with = "tenths")]
        missing: Option<f64>,
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(-7.6000000000000005, 2), -7.6);
        assert_eq!(round_to(95.44, 1), 95.4);
        assert_eq!(round_to(-0.125, 2), -0.13);
    }

    #[test]
    fn test_serialized_precision() {
        let sample = Sample {
            weighted: Some((-10.0 * 8.0 + 2.0 * 2.0) / 10.0 - 1e-15),
            onset: 85.36,
            missing: None,
        };
        let json = serde_json::to_string(&sample).unwrap();
        assert_eq!(json, r#"{"weighted":-7.6,"onset":85.4,"missing":null}"#);
    }
}
