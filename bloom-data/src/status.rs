use serde::{Deserialize, Serialize};
use std::fmt;

/// Categorical bloom timing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BloomStatus {
    Early,
    Normal,
    Late,
    /// No usable current-year onset yet, but still inside the expected window.
    Pending,
    /// No usable baseline.
    InsufficientData,
}

impl BloomStatus {
    /// `anomaly <= -threshold` is early, `anomaly >= threshold` is late.
    /// Both boundaries are inclusive.
    pub fn from_anomaly(anomaly_days: f64, threshold_days: f64) -> BloomStatus {
        if anomaly_days <= -threshold_days {
            BloomStatus::Early
        } else if anomaly_days >= threshold_days {
            BloomStatus::Late
        } else {
            BloomStatus::Normal
        }
    }

    /// Early, normal or late: a status that says something about this season.
    pub fn is_signal(&self) -> bool {
        matches!(
            self,
            BloomStatus::Early | BloomStatus::Normal | BloomStatus::Late
        )
    }
}

impl fmt::Display for BloomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BloomStatus::Early => write!(f, "early"),
            BloomStatus::Normal => write!(f, "normal"),
            BloomStatus::Late => write!(f, "late"),
            BloomStatus::Pending => write!(f, "pending"),
            BloomStatus::InsufficientData => write!(f, "insufficient_data"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BloomStatus;

    #[test]
    fn test_threshold_boundaries_are_not_normal() {
        assert_eq!(BloomStatus::from_anomaly(-7.0, 7.0), BloomStatus::Early);
        assert_eq!(BloomStatus::from_anomaly(7.0, 7.0), BloomStatus::Late);
        assert_eq!(BloomStatus::from_anomaly(0.0, 7.0), BloomStatus::Normal);
        assert_eq!(BloomStatus::from_anomaly(-6.9, 7.0), BloomStatus::Normal);
        assert_eq!(BloomStatus::from_anomaly(6.9, 7.0), BloomStatus::Normal);
        assert_eq!(BloomStatus::from_anomaly(-10.0, 7.0), BloomStatus::Early);
        assert_eq!(BloomStatus::from_anomaly(21.0, 7.0), BloomStatus::Late);
    }

    #[test]
    fn test_signal_statuses() {
        assert!(BloomStatus::Late.is_signal());
        assert!(!BloomStatus::Pending.is_signal());
        assert!(!BloomStatus::InsufficientData.is_signal());
        assert_eq!(BloomStatus::InsufficientData.to_string(), "insufficient_data");
    }
}
