use crate::observation::{Coordinates, Observation};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Elevation (meters) below which an observation is in the low band.
pub const LOW_BAND_CEILING_M: f64 = 500.0;

/// Highest elevation (meters, inclusive) still counted as the mid band.
pub const MID_BAND_CEILING_M: f64 = 1200.0;

/// Side of the Cascade divide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    East,
    West,
}

/// Elevation band. `Unknown` is a band of its own, not a discard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElevationBand {
    Low,
    Mid,
    High,
    Unknown,
}

/// Resolution of a geography group, finest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Zone,
    Side,
    Statewide,
}

/// A reporting bucket. Serialized as its label, e.g. `"west-low"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "String")]
pub enum GroupKey {
    Zone(Side, ElevationBand),
    Side(Side),
    Statewide,
}

/// Straight-line stand-in for the Cascade crest.
///
/// The crest longitude at a given latitude is
/// `base_longitude + (latitude - reference_latitude) * slope`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DivideLine {
    pub base_longitude: f64,
    pub reference_latitude: f64,
    pub slope: f64,
}

/// Derived geography attributes for one observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geography {
    /// `None` when the observation carries no coordinates.
    pub side: Option<Side>,
    pub band: ElevationBand,
}

impl Default for DivideLine {
    fn default() -> Self {
        DivideLine {
            base_longitude: -121.80,
            reference_latitude: 45.5,
            slope: 0.14,
        }
    }
}

impl DivideLine {
    /// Crest longitude at `latitude`.
    pub fn longitude_at(&self, latitude: f64) -> f64 {
        self.base_longitude + (latitude - self.reference_latitude) * self.slope
    }

    /// Longitudes greater (less negative) than the crest are east of it.
    ///
    /// This is the geographic orientation: Seattle lands west and Spokane
    /// east. Reading "greater longitude" as west would swap every zone
    /// label relative to the map, so the comparison is deliberately the
    /// other way round.
    pub fn side_of(&self, coordinates: &Coordinates) -> Side {
        if coordinates.longitude > self.longitude_at(coordinates.latitude) {
            Side::East
        } else {
            Side::West
        }
    }
}

impl ElevationBand {
    pub fn from_elevation(elevation_m: Option<f64>) -> ElevationBand {
        match elevation_m {
            None => ElevationBand::Unknown,
            Some(e) if e < LOW_BAND_CEILING_M => ElevationBand::Low,
            Some(e) if e <= MID_BAND_CEILING_M => ElevationBand::Mid,
            Some(_) => ElevationBand::High,
        }
    }
}

impl Geography {
    /// Classify one observation. Pure function of its coordinates and elevation.
    pub fn classify(observation: &Observation, divide: &DivideLine) -> Geography {
        Geography {
            side: observation.coordinates.as_ref().map(|c| divide.side_of(c)),
            band: ElevationBand::from_elevation(observation.elevation_m),
        }
    }

    /// The zone this observation belongs to, if it can be placed on a side.
    pub fn zone(&self) -> Option<GroupKey> {
        self.side.map(|side| GroupKey::Zone(side, self.band))
    }
}

impl GroupKey {
    pub fn granularity(&self) -> Granularity {
        match self {
            GroupKey::Zone(..) => Granularity::Zone,
            GroupKey::Side(_) => Granularity::Side,
            GroupKey::Statewide => Granularity::Statewide,
        }
    }

    /// The fallback chain starting at this group: zone -> side -> statewide.
    pub fn fallback_chain(&self) -> Vec<GroupKey> {
        match *self {
            GroupKey::Zone(side, band) => vec![
                GroupKey::Zone(side, band),
                GroupKey::Side(side),
                GroupKey::Statewide,
            ],
            GroupKey::Side(side) => vec![GroupKey::Side(side), GroupKey::Statewide],
            GroupKey::Statewide => vec![GroupKey::Statewide],
        }
    }

    /// True if an observation classified as `geography` counts toward this group.
    pub fn contains(&self, geography: &Geography) -> bool {
        match *self {
            GroupKey::Zone(side, band) => geography.side == Some(side) && geography.band == band,
            GroupKey::Side(side) => geography.side == Some(side),
            GroupKey::Statewide => true,
        }
    }

    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::East => write!(f, "east"),
            Side::West => write!(f, "west"),
        }
    }
}

impl fmt::Display for ElevationBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElevationBand::Low => write!(f, "low"),
            ElevationBand::Mid => write!(f, "mid"),
            ElevationBand::High => write!(f, "high"),
            ElevationBand::Unknown => write!(f, "unknown"),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Zone => write!(f, "zone"),
            Granularity::Side => write!(f, "side"),
            Granularity::Statewide => write!(f, "statewide"),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Zone(side, band) => write!(f, "{side}-{band}"),
            GroupKey::Side(side) => write!(f, "{side}"),
            GroupKey::Statewide => write!(f, "statewide"),
        }
    }
}

impl From<GroupKey> for String {
    fn from(value: GroupKey) -> Self {
        value.to_string()
    }
}
