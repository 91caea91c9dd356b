//! SGP4 propagation of element sets into the TEME inertial frame

mod sgp4;

use chrono::{DateTime, Utc};
use thiserror::Error;

pub use sgp4::{Sgp4, DEEP_SPACE_PERIOD_MINUTES};

/// Position and velocity in the TEME frame at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropagatedState {
    /// km
    pub position: [f64; 3],
    /// km/s
    pub velocity: [f64; 3],
    pub at: DateTime<Utc>,
    pub minutes_since_epoch: f64,
}

impl PropagatedState {
    /// Distance from the Earth's centre in km
    pub fn radius(&self) -> f64 {
        norm(&self.position)
    }

    pub fn speed(&self) -> f64 {
        norm(&self.velocity)
    }
}

fn norm(v: &[f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecayReason {
    NonPhysicalEccentricity,
    NonPhysicalSemiMajorAxis,
    NonPositiveMeanMotion,
    NegativeSemiLatusRectum,
    SubSurfaceRadius,
    NegativeAltitude,
}

impl std::fmt::Display for DecayReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            DecayReason::NonPhysicalEccentricity => "eccentricity left [0, 1)",
            DecayReason::NonPhysicalSemiMajorAxis => "semi-major axis below the atmosphere",
            DecayReason::NonPositiveMeanMotion => "mean motion is not positive",
            DecayReason::NegativeSemiLatusRectum => "semi-latus rectum is negative",
            DecayReason::SubSurfaceRadius => "radius is below the Earth's surface",
            DecayReason::NegativeAltitude => "geodetic altitude is negative",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PropagationError {
    #[error("orbital period {period_minutes:.1} min needs deep-space perturbations, which are not supported")]
    UnsupportedOrbitRegime { period_minutes: f64 },

    #[error("orbit decayed at {minutes_since_epoch:.3} min from epoch: {reason}")]
    DecayedOrbit {
        minutes_since_epoch: f64,
        reason: DecayReason,
    },
}

impl PropagationError {
    pub fn is_decay(&self) -> bool {
        matches!(self, PropagationError::DecayedOrbit { .. })
    }
}
