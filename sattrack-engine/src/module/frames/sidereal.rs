use std::f64::consts::TAU;

use chrono::{DateTime, Utc};

/// Julian date of the Unix epoch
const JD_UNIX_EPOCH: f64 = 2_440_587.5;
/// Julian date of J2000.0
const JD_J2000: f64 = 2_451_545.0;
const SECONDS_PER_DAY: f64 = 86_400.0;

pub fn julian_date(at: DateTime<Utc>) -> f64 {
    let seconds = at.timestamp() as f64 + at.timestamp_subsec_nanos() as f64 * 1e-9;
    seconds / SECONDS_PER_DAY + JD_UNIX_EPOCH
}

/// Greenwich mean sidereal time in radians, [0, 2π).
///
/// IAU-82 polynomial in Julian centuries of UT1 since J2000; UTC stands in
/// for UT1.
pub fn gmst(julian_date: f64) -> f64 {
    let tut1 = (julian_date - JD_J2000) / 36_525.0;
    let seconds = -6.2e-6 * tut1 * tut1 * tut1
        + 0.093_104 * tut1 * tut1
        + (876_600.0 * 3600.0 + 8_640_184.812_866) * tut1
        + 67_310.548_41;
    // 240 time-seconds per degree
    (seconds.to_radians() / 240.0).rem_euclid(TAU)
}

pub fn gmst_at(at: DateTime<Utc>) -> f64 {
    gmst(julian_date(at))
}
