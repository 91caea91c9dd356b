//! Frame conversions: TEME → Earth-fixed → geodetic → scene
//!
//! Earth-fixed coordinates are obtained by the GMST rotation alone (no
//! nutation, polar motion or equation of the equinoxes). Geodetic latitude is
//! computed against the WGS-84 ellipsoid by default; a spherical Earth is
//! available for reduced-fidelity use.

mod sidereal;

use serde::{Deserialize, Serialize};

use sattrack_common::{wrap_longitude, GeodeticPosition};

use crate::module::propagation::{DecayReason, PropagatedState, PropagationError};

pub use sattrack_common::{lat_lon_to_scene, marker_radius, ScenePoint};
pub use sidereal::{gmst, gmst_at, julian_date};

const WGS84_A: f64 = 6378.137;
const WGS84_B: f64 = 6356.752_314_2;
/// Mean Earth radius for the spherical model
pub const SPHERE_RADIUS_KM: f64 = 6371.0;

const LATITUDE_TOLERANCE: f64 = 1e-12;
const LATITUDE_MAX_ITERATIONS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EarthModel {
    #[default]
    Wgs84,
    Spherical,
}

/// Rotate a TEME vector into the Earth-fixed frame.
pub fn eci_to_ecef(position: [f64; 3], gmst: f64) -> [f64; 3] {
    let (sin_g, cos_g) = gmst.sin_cos();
    [
        cos_g * position[0] + sin_g * position[1],
        -sin_g * position[0] + cos_g * position[1],
        position[2],
    ]
}

/// Earth-fixed Cartesian (km) to latitude, wrapped longitude and altitude.
///
/// Altitude is not checked here; see [`to_geodetic`].
pub fn ecef_to_geodetic(ecef: [f64; 3], model: EarthModel) -> GeodeticPosition {
    let [x, y, z] = ecef;
    let p = x.hypot(y);
    let longitude = wrap_longitude(y.atan2(x).to_degrees());

    let (latitude, altitude) = match model {
        EarthModel::Spherical => {
            let r = (p * p + z * z).sqrt();
            (z.atan2(p), r - SPHERE_RADIUS_KM)
        }
        EarthModel::Wgs84 => {
            let e2 = 1.0 - (WGS84_B * WGS84_B) / (WGS84_A * WGS84_A);
            let mut lat = z.atan2(p * (1.0 - e2));
            for _ in 0..LATITUDE_MAX_ITERATIONS {
                let sin_lat = lat.sin();
                let n = WGS84_A / (1.0 - e2 * sin_lat * sin_lat).sqrt();
                let next = (z + e2 * n * sin_lat).atan2(p);
                let done = (next - lat).abs() < LATITUDE_TOLERANCE;
                lat = next;
                if done {
                    break;
                }
            }
            let (sin_lat, cos_lat) = lat.sin_cos();
            // valid at the poles too, unlike p / cos(lat) - N
            let h = p * cos_lat + z * sin_lat - WGS84_A * (1.0 - e2 * sin_lat * sin_lat).sqrt();
            (lat, h)
        }
    };

    GeodeticPosition::new(latitude.to_degrees(), longitude, altitude)
}

/// Geodetic position of a propagated state at its own instant.
pub fn to_geodetic(state: &PropagatedState, model: EarthModel) -> Result<GeodeticPosition, PropagationError> {
    let ecef = eci_to_ecef(state.position, gmst_at(state.at));
    let position = ecef_to_geodetic(ecef, model);
    if position.altitude < 0.0 {
        return Err(PropagationError::DecayedOrbit {
            minutes_since_epoch: state.minutes_since_epoch,
            reason: DecayReason::NegativeAltitude,
        });
    }
    Ok(position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tle::fixtures::{ISS_LINE1, ISS_LINE2};
    use crate::model::tle::parse_lines;
    use crate::module::propagation::Sgp4;
    use chrono::{TimeZone, Utc};

    fn iss_at_epoch() -> PropagatedState {
        let elements = parse_lines(None, ISS_LINE1, ISS_LINE2).unwrap();
        Sgp4::new(&elements).unwrap().propagate(0.0).unwrap()
    }

    fn state_at(position: [f64; 3]) -> PropagatedState {
        PropagatedState {
            position,
            velocity: [0.0; 3],
            at: Utc.with_ymd_and_hms(2000, 1, 1, 12, 0, 0).unwrap(),
            minutes_since_epoch: 12.5,
        }
    }

    #[test]
    fn test_iss_ground_point() {
        let position = to_geodetic(&iss_at_epoch(), EarthModel::Wgs84).unwrap();
        assert!((position.latitude - 31.718971).abs() < 1e-4, "{}", position);
        assert!((position.longitude + 126.818227).abs() < 1e-4, "{}", position);
        assert!((position.altitude - 420.149).abs() < 1e-2, "{}", position);
    }

    #[test]
    fn test_iss_spherical() {
        let position = to_geodetic(&iss_at_epoch(), EarthModel::Spherical).unwrap();
        assert!((position.latitude - 31.557746).abs() < 1e-4);
        assert!((position.altitude - 421.409).abs() < 1e-2);
    }

    #[test]
    fn test_idempotent() {
        let state = iss_at_epoch();
        let a = to_geodetic(&state, EarthModel::Wgs84).unwrap();
        let b = to_geodetic(&state, EarthModel::Wgs84).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_equator_and_pole() {
        let equator = ecef_to_geodetic([WGS84_A + 500.0, 0.0, 0.0], EarthModel::Wgs84);
        assert!(equator.latitude.abs() < 1e-12);
        assert_eq!(equator.longitude, 0.0);
        assert!((equator.altitude - 500.0).abs() < 1e-9);

        let pole = ecef_to_geodetic([0.0, 0.0, WGS84_B + 500.0], EarthModel::Wgs84);
        assert!((pole.latitude - 90.0).abs() < 1e-9);
        assert!((pole.altitude - 500.0).abs() < 1e-6);

        let south = ecef_to_geodetic([0.0, 0.0, -(SPHERE_RADIUS_KM + 10.0)], EarthModel::Spherical);
        assert_eq!(south.latitude, -90.0);
        assert!((south.altitude - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_longitude_wraps_at_antimeridian() {
        for y in [0.0, -0.0] {
            let position = ecef_to_geodetic([-7000.0, y, 0.0], EarthModel::Wgs84);
            assert_eq!(position.longitude, -180.0);
        }
        let east = ecef_to_geodetic([0.0, 7000.0, 0.0], EarthModel::Wgs84);
        assert!((east.longitude - 90.0).abs() < 1e-12);
        let west = ecef_to_geodetic([0.0, -7000.0, 0.0], EarthModel::Wgs84);
        assert!((west.longitude + 90.0).abs() < 1e-12);
    }

    #[test]
    fn test_rotation_preserves_radius() {
        let r = [-5111.2, -2715.7, 3554.9];
        for angle in [0.0, 1.0, 3.0, 6.0] {
            let e = eci_to_ecef(r, angle);
            let before = (r[0] * r[0] + r[1] * r[1] + r[2] * r[2]).sqrt();
            let after = (e[0] * e[0] + e[1] * e[1] + e[2] * e[2]).sqrt();
            assert!((before - after).abs() < 1e-9);
            assert_eq!(e[2], r[2]);
        }
    }

    #[test]
    fn test_negative_altitude_is_decay() {
        let err = to_geodetic(&state_at([6000.0, 0.0, 0.0]), EarthModel::Wgs84).unwrap_err();
        assert_eq!(
            err,
            PropagationError::DecayedOrbit {
                minutes_since_epoch: 12.5,
                reason: DecayReason::NegativeAltitude,
            }
        );
    }

    #[test]
    fn test_scene_projection_of_ground_point() {
        let position = to_geodetic(&iss_at_epoch(), EarthModel::Wgs84).unwrap();
        let point = position.to_scene(0.5);
        let expected = 1.0 + position.altitude / 6371.0 * 0.5;
        assert!((point.norm() - expected).abs() < 1e-12);
    }
}
