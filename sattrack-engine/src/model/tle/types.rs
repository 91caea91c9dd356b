use chrono::{DateTime, Utc};

use super::parser::line_checksum;

/// Security classification carried in line 1, column 8
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Unclassified,
    Classified,
    Secret,
}

impl Classification {
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'U' => Some(Classification::Unclassified),
            'C' => Some(Classification::Classified),
            'S' => Some(Classification::Secret),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Classification::Unclassified => 'U',
            Classification::Classified => 'C',
            Classification::Secret => 'S',
        }
    }
}

/// A parsed two-line element set.
///
/// Angles are in degrees, mean motion in revolutions per day. Only the parser
/// builds these; there are no setters.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementSet {
    pub(super) name: Option<String>,
    pub(super) catalog_number: u32,
    pub(super) classification: Classification,
    pub(super) international_designator: String,
    pub(super) epoch_year: i32,
    pub(super) epoch_day: f64,
    pub(super) epoch: DateTime<Utc>,
    pub(super) mean_motion_dot: f64,
    pub(super) mean_motion_ddot: f64,
    pub(super) bstar: f64,
    pub(super) ephemeris_type: u8,
    pub(super) element_set_number: u16,
    pub(super) inclination: f64,
    pub(super) right_ascension: f64,
    pub(super) eccentricity: f64,
    pub(super) argument_of_perigee: f64,
    pub(super) mean_anomaly: f64,
    pub(super) mean_motion: f64,
    pub(super) revolution_number: u32,
}

impl ElementSet {
    /// Name line, when the source had three lines
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn catalog_number(&self) -> u32 {
        self.catalog_number
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    pub fn international_designator(&self) -> &str {
        &self.international_designator
    }

    /// Four-digit epoch year
    pub fn epoch_year(&self) -> i32 {
        self.epoch_year
    }

    /// Fractional day of year, 1.0 = Jan 1 00:00 UTC
    pub fn epoch_day(&self) -> f64 {
        self.epoch_day
    }

    pub fn epoch(&self) -> DateTime<Utc> {
        self.epoch
    }

    /// First derivative of mean motion divided by two (rev/day²)
    pub fn mean_motion_dot(&self) -> f64 {
        self.mean_motion_dot
    }

    /// Second derivative of mean motion divided by six (rev/day³)
    pub fn mean_motion_ddot(&self) -> f64 {
        self.mean_motion_ddot
    }

    /// Drag term in inverse Earth radii
    pub fn bstar(&self) -> f64 {
        self.bstar
    }

    pub fn ephemeris_type(&self) -> u8 {
        self.ephemeris_type
    }

    pub fn element_set_number(&self) -> u16 {
        self.element_set_number
    }

    pub fn inclination(&self) -> f64 {
        self.inclination
    }

    pub fn right_ascension(&self) -> f64 {
        self.right_ascension
    }

    pub fn eccentricity(&self) -> f64 {
        self.eccentricity
    }

    pub fn argument_of_perigee(&self) -> f64 {
        self.argument_of_perigee
    }

    pub fn mean_anomaly(&self) -> f64 {
        self.mean_anomaly
    }

    /// Revolutions per day
    pub fn mean_motion(&self) -> f64 {
        self.mean_motion
    }

    pub fn revolution_number(&self) -> u32 {
        self.revolution_number
    }

    /// Encode back into the fixed-column two-line form, checksums included.
    pub fn to_lines(&self) -> (String, String) {
        let mut line1 = format!(
            "1 {}{} {:<8} {:02}{:012.8} {} {} {} {} {:>4}",
            format_catalog_number(self.catalog_number),
            self.classification.as_char(),
            self.international_designator,
            self.epoch_year % 100,
            self.epoch_day,
            format_mean_motion_dot(self.mean_motion_dot),
            format_exponent_field(self.mean_motion_ddot),
            format_exponent_field(self.bstar),
            self.ephemeris_type,
            self.element_set_number % 10_000,
        );
        line1.push(checksum_char(&line1));

        let mut line2 = format!(
            "2 {} {:8.4} {:8.4} {:07} {:8.4} {:8.4} {:11.8}{:>5}",
            format_catalog_number(self.catalog_number),
            self.inclination,
            self.right_ascension,
            (self.eccentricity * 1e7).round() as u64,
            self.argument_of_perigee,
            self.mean_anomaly,
            self.mean_motion,
            self.revolution_number % 100_000,
        );
        line2.push(checksum_char(&line2));

        (line1, line2)
    }
}

fn checksum_char(line: &str) -> char {
    char::from(b'0' + line_checksum(line))
}

/// Five characters, Alpha-5 above 99999.
fn format_catalog_number(number: u32) -> String {
    if number < 100_000 {
        return format!("{:05}", number);
    }
    const ALPHA: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ";
    let prefix = (number / 10_000) as usize - 10;
    match ALPHA.get(prefix) {
        Some(&letter) => format!("{}{:04}", letter as char, number % 10_000),
        None => format!("{:05}", number % 100_000),
    }
}

/// `" .00001534"` style: sign, no leading zero, eight decimals.
fn format_mean_motion_dot(value: f64) -> String {
    let sign = if value < 0.0 { '-' } else { ' ' };
    let digits = format!("{:.8}", value.abs());
    format!("{}{}", sign, digits.trim_start_matches('0'))
}

/// `" 35580-4"` style: sign, five-digit mantissa with implied leading point, exponent.
fn format_exponent_field(value: f64) -> String {
    if value == 0.0 {
        return " 00000-0".to_string();
    }
    let sign = if value < 0.0 { '-' } else { ' ' };
    let magnitude = value.abs();
    let mut exponent = magnitude.log10().floor() as i32 + 1;
    let mut mantissa = (magnitude / 10f64.powi(exponent) * 1e5).round() as u32;
    if mantissa >= 100_000 {
        mantissa /= 10;
        exponent += 1;
    }
    let exp_sign = if exponent > 0 { '+' } else { '-' };
    format!("{}{:05}{}{}", sign, mantissa, exp_sign, exponent.abs())
}
