//! Position sample types.
//!
//! - [`Fix`] - A raw reading as returned by a host location capability
//! - [`PositionSample`] - What the engine hands to the consumer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A raw reading from a host location capability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fix {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
    /// Horizontal accuracy radius in meters.
    pub accuracy_meters: f64,
}

/// One position sample delivered to the consumer.
///
/// # Timestamp
///
/// `timestamp` is the capture instant. Freshness ("updated 3m ago") is
/// computed by whoever displays it; the engine never stores a formatted age.
///
/// Serializes with RFC 3339 timestamps so consumers can forward samples
/// as JSON unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    /// Latitude in degrees (-90 to 90).
    pub latitude: f64,

    /// Longitude in degrees (-180 to 180).
    pub longitude: f64,

    /// Horizontal accuracy in meters.
    ///
    /// `None` for simulated samples, which declare an exact position.
    pub accuracy_meters: Option<f64>,

    /// When this sample was captured.
    pub timestamp: DateTime<Utc>,

    /// True when produced by the simulated source.
    pub simulated: bool,

    /// Waypoint name. Only present on simulated samples.
    pub location_name: Option<String>,
}

impl PositionSample {
    /// Create a sample from a device fix captured now.
    pub fn from_fix(fix: Fix) -> Self {
        Self {
            latitude: fix.latitude,
            longitude: fix.longitude,
            accuracy_meters: Some(fix.accuracy_meters),
            timestamp: Utc::now(),
            simulated: false,
            location_name: None,
        }
    }

    /// Create a simulated sample at a named waypoint.
    pub fn simulated(latitude: f64, longitude: f64, location_name: impl Into<String>) -> Self {
        Self {
            latitude,
            longitude,
            accuracy_meters: None,
            timestamp: Utc::now(),
            simulated: true,
            location_name: Some(location_name.into()),
        }
    }

    /// Check coordinate ranges and accuracy sign.
    pub fn is_valid(&self) -> bool {
        is_valid_coordinate(self.latitude, self.longitude)
            && self
                .accuracy_meters
                .is_none_or(|a| a.is_finite() && a >= 0.0)
    }
}

/// Returns true if latitude is within -90..=90 and longitude within -180..=180.
pub fn is_valid_coordinate(latitude: f64, longitude: f64) -> bool {
    (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fix() {
        let sample = PositionSample::from_fix(Fix {
            latitude: 1.2840,
            longitude: 103.8514,
            accuracy_meters: 25.0,
        });

        assert_eq!(sample.latitude, 1.2840);
        assert_eq!(sample.longitude, 103.8514);
        assert_eq!(sample.accuracy_meters, Some(25.0));
        assert!(!sample.simulated);
        assert!(sample.location_name.is_none());
        assert!(sample.is_valid());
    }

    #[test]
    fn test_simulated_declares_exact_position() {
        let sample = PositionSample::simulated(1.2834, 103.8607, "Marina Bay");

        assert!(sample.simulated);
        assert!(sample.accuracy_meters.is_none());
        assert_eq!(sample.location_name.as_deref(), Some("Marina Bay"));
        assert!(sample.is_valid());
    }

    #[test]
    fn test_invalid_coordinates() {
        assert!(!is_valid_coordinate(90.5, 0.0));
        assert!(!is_valid_coordinate(0.0, -180.1));
        assert!(!is_valid_coordinate(f64::NAN, 0.0));
        assert!(is_valid_coordinate(-90.0, 180.0));
    }

    #[test]
    fn test_negative_accuracy_is_invalid() {
        let sample = PositionSample::from_fix(Fix {
            latitude: 0.0,
            longitude: 0.0,
            accuracy_meters: -1.0,
        });
        assert!(!sample.is_valid());
    }

    #[test]
    fn test_sample_serializes_for_transport() {
        let sample = PositionSample::simulated(1.284, 103.8514, "Raffles Place");
        let json = serde_json::to_value(&sample).unwrap();

        assert_eq!(json["latitude"], 1.284);
        assert_eq!(json["simulated"], true);
        assert_eq!(json["location_name"], "Raffles Place");
        assert!(json["accuracy_meters"].is_null());
        assert!(json["timestamp"].as_str().unwrap().contains('T'));

        let back: PositionSample = serde_json::from_value(json).unwrap();
        assert_eq!(back, sample);
    }
}
