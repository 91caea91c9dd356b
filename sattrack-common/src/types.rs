use serde::{Deserialize, Serialize};

/// Sub-satellite point plus height above the reference surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeodeticPosition {
    /// Latitude in degrees, [-90, 90]
    pub latitude: f64,
    /// Longitude in degrees, [-180, 180)
    pub longitude: f64,
    /// Altitude in kilometers
    pub altitude: f64,
}

impl GeodeticPosition {
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }

    /// Human readable read-out used by info panels.
    pub fn display(&self) -> String {
        format!(
            "lat {:.4}°, lon {:.4}°, alt {:.2} km",
            self.latitude, self.longitude, self.altitude
        )
    }
}

impl std::fmt::Display for GeodeticPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Wrap a longitude in degrees into [-180, 180).
pub fn wrap_longitude(degrees: f64) -> f64 {
    let mut wrapped = (degrees + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 180.0 {
        wrapped -= 360.0;
    }
    wrapped
}
