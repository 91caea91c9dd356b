//! Element sets shared by tests

/// ISS, 2020 day 300
pub const ISS_LINE1: &str = "1 25544U 98067A   20300.83097691  .00001534  00000-0  35580-4 0  9996";
pub const ISS_LINE2: &str = "2 25544  51.6453  57.0843 0001671  64.9808  73.0513 15.49338189252428";

/// Spacetrack Report #3 near-earth test case
pub const VANGUARD_LINE1: &str = "1 88888U          80275.98708465  .00073094  13844-3  66816-4 0    87";
pub const VANGUARD_LINE2: &str = "2 88888  72.8435 115.9689 0086731  52.6988 110.5714 16.05824518  1058";

/// ISS elements with B* raised to 0.5; decays within a day of epoch
pub const HIGH_DRAG_LINE1: &str = "1 25544U 98067A   20300.83097691  .00001534  00000-0  50000-0 0  9996";

/// A geostationary element set (period ~1436 minutes)
pub const GEO_LINE1: &str = "1 28884U 05041A   20300.50000000 -.00000270  00000-0  00000-0 0  9990";
pub const GEO_LINE2: &str = "2 28884   0.0500 270.0000 0002000 100.0000 200.0000  1.00270000 55001";

/// A sun-synchronous weather satellite, epoch close to the ISS set above
pub const NOAA_LINE1: &str = "1 33591U 09005A   20300.50000000  .00000045  00000-0  49000-4 0  9991";
pub const NOAA_LINE2: &str = "2 33591  99.1900 300.0000 0013000 200.0000 160.0000 14.12400000601231";

pub fn iss_text() -> String {
    format!("ISS (ZARYA)\n{}\n{}\n", ISS_LINE1, ISS_LINE2)
}

pub fn high_drag_text() -> String {
    format!("{}\n{}\n", HIGH_DRAG_LINE1, ISS_LINE2)
}

pub fn noaa_text() -> String {
    format!("NOAA 19\r\n{}\r\n{}\r\n", NOAA_LINE1, NOAA_LINE2)
}
