//! Two-line element set parser
//!
//! Fields are position-fixed, not delimited; slices below are 0-based byte
//! ranges into a 69-column ASCII line.

use chrono::{NaiveDate, TimeDelta};
use thiserror::Error;

use super::types::{Classification, ElementSet};

pub const TLE_LINE_LENGTH: usize = 69;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TleError {
    #[error("expected 2 or 3 non-blank lines, found {0}")]
    LineCount(usize),

    #[error("line {line} must be {TLE_LINE_LENGTH} characters, found {length}")]
    LineLength { line: u8, length: usize },

    #[error("line {line} contains non-ASCII characters")]
    NonAscii { line: u8 },

    #[error("line {line} must start with '{line}', found '{found}'")]
    LineNumber { line: u8, found: char },

    #[error("checksum mismatch on line {line}: computed {expected}, found '{found}'")]
    Checksum { line: u8, expected: u8, found: char },

    #[error("line {line}: cannot parse {field} from {text:?}")]
    Field {
        line: u8,
        field: &'static str,
        text: String,
    },

    #[error("catalog number differs between lines ({line1} vs {line2})")]
    InconsistentRecord { line1: u32, line2: u32 },

    #[error("{field} out of range: {value}")]
    Range { field: &'static str, value: f64 },
}

/// Sum of digits plus one per minus sign over the first 68 columns, mod 10.
pub fn line_checksum(line: &str) -> u8 {
    let sum: u32 = line
        .bytes()
        .take(TLE_LINE_LENGTH - 1)
        .map(|b| match b {
            b'0'..=b'9' => (b - b'0') as u32,
            b'-' => 1,
            _ => 0,
        })
        .sum();
    (sum % 10) as u8
}

/// Parse raw service text (2 lines, or a name line followed by 2 lines).
pub fn parse_tle(text: &str) -> Result<ElementSet, TleError> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let (name, line1, line2) = match lines.as_slice() {
        [line1, line2] => (None, *line1, *line2),
        [name, line1, line2] => (Some(name.trim_start_matches("0 ").to_string()), *line1, *line2),
        other => return Err(TleError::LineCount(other.len())),
    };

    parse_lines(name, line1, line2)
}

/// Parse an explicit line pair.
pub fn parse_lines(name: Option<String>, line1: &str, line2: &str) -> Result<ElementSet, TleError> {
    check_line(1, line1)?;
    check_line(2, line2)?;

    // Line 1
    let catalog_number = parse_catalog_number(1, &line1[2..7])?;
    let classification_char = line1.as_bytes()[7] as char;
    let classification = match classification_char {
        ' ' => Classification::Unclassified,
        c => Classification::from_char(c).ok_or_else(|| field_error(1, "classification", &line1[7..8]))?,
    };
    let international_designator = line1[9..17].trim().to_string();
    let epoch_yy = parse_epoch_year(&line1[18..20])?;
    let epoch_day = parse_float(1, "epoch day", &line1[20..32])?;
    let mean_motion_dot = parse_float(1, "mean motion derivative", &line1[33..43])?;
    let mean_motion_ddot = parse_exponent_field(1, "mean motion second derivative", &line1[44..52])?;
    let bstar = parse_exponent_field(1, "bstar", &line1[53..61])?;
    let ephemeris_type = match line1[62..63].trim() {
        "" => 0,
        text => parse_number(1, "ephemeris type", text)?,
    };
    let element_set_number = match line1[64..68].trim() {
        "" => 0,
        text => parse_number(1, "element set number", text)?,
    };

    // Line 2
    let line2_catalog = parse_catalog_number(2, &line2[2..7])?;
    let inclination = parse_float(2, "inclination", &line2[8..16])?;
    let right_ascension = parse_float(2, "right ascension", &line2[17..25])?;
    let eccentricity = parse_float(2, "eccentricity", &format!("0.{}", line2[26..33].trim()))?;
    let argument_of_perigee = parse_float(2, "argument of perigee", &line2[34..42])?;
    let mean_anomaly = parse_float(2, "mean anomaly", &line2[43..51])?;
    let mean_motion = parse_float(2, "mean motion", &line2[52..63])?;
    let revolution_number = match line2[63..68].trim() {
        "" => 0,
        text => parse_number(2, "revolution number", text)?,
    };

    if catalog_number != line2_catalog {
        return Err(TleError::InconsistentRecord {
            line1: catalog_number,
            line2: line2_catalog,
        });
    }

    check_range("eccentricity", eccentricity, |e| (0.0..1.0).contains(&e))?;
    check_range("inclination", inclination, |i| (0.0..=180.0).contains(&i))?;
    check_range("right ascension", right_ascension, |a| (0.0..=360.0).contains(&a))?;
    check_range("argument of perigee", argument_of_perigee, |a| (0.0..=360.0).contains(&a))?;
    check_range("mean anomaly", mean_anomaly, |a| (0.0..=360.0).contains(&a))?;
    check_range("mean motion", mean_motion, |n| n > 0.0)?;

    let epoch_year = if epoch_yy < 57 { 2000 + epoch_yy } else { 1900 + epoch_yy };
    let epoch = epoch_from_day_of_year(epoch_year, epoch_day)?;

    Ok(ElementSet {
        name,
        catalog_number,
        classification,
        international_designator,
        epoch_year,
        epoch_day,
        epoch,
        mean_motion_dot,
        mean_motion_ddot,
        bstar,
        ephemeris_type,
        element_set_number,
        inclination,
        right_ascension,
        eccentricity,
        argument_of_perigee,
        mean_anomaly,
        mean_motion,
        revolution_number,
    })
}

fn check_line(number: u8, line: &str) -> Result<(), TleError> {
    if !line.is_ascii() {
        return Err(TleError::NonAscii { line: number });
    }
    if line.len() != TLE_LINE_LENGTH {
        return Err(TleError::LineLength {
            line: number,
            length: line.len(),
        });
    }

    let first = line.as_bytes()[0] as char;
    if first != char::from(b'0' + number) {
        return Err(TleError::LineNumber {
            line: number,
            found: first,
        });
    }

    let found = line.as_bytes()[TLE_LINE_LENGTH - 1] as char;
    let expected = line_checksum(line);
    if found.to_digit(10) != Some(expected as u32) {
        return Err(TleError::Checksum {
            line: number,
            expected,
            found,
        });
    }

    Ok(())
}

fn field_error(line: u8, field: &'static str, text: &str) -> TleError {
    TleError::Field {
        line,
        field,
        text: text.to_string(),
    }
}

fn parse_number<T: std::str::FromStr>(line: u8, field: &'static str, text: &str) -> Result<T, TleError> {
    text.trim().parse().map_err(|_| field_error(line, field, text))
}

/// Like `parse_number`, but `inf` and `NaN` spellings are field errors.
fn parse_float(line: u8, field: &'static str, text: &str) -> Result<f64, TleError> {
    let value: f64 = parse_number(line, field, text)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(field_error(line, field, text))
    }
}

/// Two ASCII digits, no sign.
fn parse_epoch_year(text: &str) -> Result<i32, TleError> {
    if text.len() != 2 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(field_error(1, "epoch year", text));
    }
    parse_number::<u8>(1, "epoch year", text).map(i32::from)
}

/// Five-digit catalog number, or Alpha-5 (letter + four digits) above 99999.
fn parse_catalog_number(line: u8, text: &str) -> Result<u32, TleError> {
    let trimmed = text.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {
            const ALPHA: &str = "ABCDEFGHJKLMNPQRSTUVWXYZ";
            let prefix = ALPHA
                .find(c.to_ascii_uppercase())
                .ok_or_else(|| field_error(line, "catalog number", text))?;
            let rest: u32 = parse_number(line, "catalog number", chars.as_str())?;
            Ok((prefix as u32 + 10) * 10_000 + rest)
        }
        _ => parse_number(line, "catalog number", trimmed),
    }
}

/// Fields like `" 35580-4"`: mantissa with implied leading decimal point, then
/// a signed power-of-ten exponent.
fn parse_exponent_field(line: u8, field: &'static str, text: &str) -> Result<f64, TleError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }

    let split = trimmed
        .char_indices()
        .skip(1)
        .filter(|(_, c)| *c == '+' || *c == '-')
        .map(|(i, _)| i)
        .last();

    let (mantissa_text, exponent) = match split {
        Some(i) => (&trimmed[..i], parse_number::<i32>(line, field, &trimmed[i..])?),
        None => (trimmed, 0),
    };

    let (sign, digits) = match mantissa_text.as_bytes()[0] {
        b'-' => (-1.0, &mantissa_text[1..]),
        b'+' => (1.0, &mantissa_text[1..]),
        _ => (1.0, mantissa_text),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(field_error(line, field, text));
    }

    let mantissa: f64 = parse_number(line, field, &format!("0.{}", digits))?;
    let value = sign * mantissa * 10f64.powi(exponent);
    if !value.is_finite() {
        return Err(field_error(line, field, text));
    }
    Ok(value)
}

fn check_range(field: &'static str, value: f64, valid: impl Fn(f64) -> bool) -> Result<(), TleError> {
    if value.is_finite() && valid(value) {
        Ok(())
    } else {
        Err(TleError::Range { field, value })
    }
}

/// Day 1.0 is January 1st, 00:00 UTC.
fn epoch_from_day_of_year(year: i32, day: f64) -> Result<chrono::DateTime<chrono::Utc>, TleError> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1).ok_or(TleError::Range {
        field: "epoch year",
        value: year as f64,
    })?;
    let days_in_year = if start.leap_year() { 366.0 } else { 365.0 };
    if !(1.0..days_in_year + 1.0).contains(&day) {
        return Err(TleError::Range {
            field: "epoch day",
            value: day,
        });
    }

    let offset = TimeDelta::nanoseconds(((day - 1.0) * 86_400e9).round() as i64);
    let midnight = start.and_hms_opt(0, 0, 0).ok_or(TleError::Range {
        field: "epoch day",
        value: day,
    })?;
    Ok((midnight + offset).and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike, Utc};

    use crate::model::tle::fixtures::{ISS_LINE1, ISS_LINE2, VANGUARD_LINE1, VANGUARD_LINE2};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    /// Splice `text` into `line` at `start` and recompute the checksum column.
    fn edited(line: &str, start: usize, text: &str) -> String {
        let mut edited = line.to_string();
        edited.replace_range(start..start + text.len(), text);
        let checksum = line_checksum(&edited);
        edited.replace_range(68..69, &checksum.to_string());
        edited
    }

    #[test]
    fn test_parse_iss() {
        let tle = parse_lines(None, ISS_LINE1, ISS_LINE2).unwrap();
        assert_eq!(tle.catalog_number(), 25544);
        assert_eq!(tle.classification(), Classification::Unclassified);
        assert_eq!(tle.international_designator(), "98067A");
        assert_eq!(tle.epoch_year(), 2020);
        assert!(close(tle.epoch_day(), 300.83097691));
        assert!(close(tle.mean_motion_dot(), 0.00001534));
        assert!(close(tle.mean_motion_ddot(), 0.0));
        assert!(close(tle.bstar(), 0.35580e-4));
        assert_eq!(tle.ephemeris_type(), 0);
        assert_eq!(tle.element_set_number(), 999);
        assert!(close(tle.inclination(), 51.6453));
        assert!(close(tle.right_ascension(), 57.0843));
        assert!(close(tle.eccentricity(), 0.0001671));
        assert!(close(tle.argument_of_perigee(), 64.9808));
        assert!(close(tle.mean_anomaly(), 73.0513));
        assert!(close(tle.mean_motion(), 15.49338189));
        assert_eq!(tle.revolution_number(), 25242);
    }

    #[test]
    fn test_epoch_reconstruction() {
        let tle = parse_lines(None, ISS_LINE1, ISS_LINE2).unwrap();
        let epoch = tle.epoch();
        // day 300 of 2020 (leap year) is October 26th
        let midnight = Utc.with_ymd_and_hms(2020, 10, 26, 0, 0, 0).unwrap();
        assert!(epoch > midnight);
        assert_eq!(epoch.hour(), 19);
        assert_eq!(epoch.minute(), 56);
        let expected_ns = (0.83097691 * 86_400e9) as i64;
        let actual_ns = (epoch - midnight).num_nanoseconds().unwrap();
        assert!((expected_ns - actual_ns).abs() < 1_000);

        let vanguard = parse_lines(None, VANGUARD_LINE1, VANGUARD_LINE2).unwrap();
        assert_eq!(vanguard.epoch_year(), 1980);
        assert_eq!(vanguard.international_designator(), "");
    }

    #[test]
    fn test_parse_three_line_text() {
        let text = format!("ISS (ZARYA)\r\n{}\r\n{}\r\n\r\n", ISS_LINE1, ISS_LINE2);
        let tle = parse_tle(&text).unwrap();
        assert_eq!(tle.name(), Some("ISS (ZARYA)"));
        assert_eq!(tle.catalog_number(), 25544);

        let text = format!("\n  {}\n\n{}  \n", ISS_LINE1, ISS_LINE2);
        let tle = parse_tle(&text).unwrap();
        assert_eq!(tle.name(), None);
    }

    #[test]
    fn test_line_count() {
        assert_eq!(parse_tle(""), Err(TleError::LineCount(0)));
        assert_eq!(parse_tle(ISS_LINE1), Err(TleError::LineCount(1)));
        let four = format!("a\nb\n{}\n{}", ISS_LINE1, ISS_LINE2);
        assert_eq!(parse_tle(&four), Err(TleError::LineCount(4)));
    }

    #[test]
    fn test_round_trip_checksums() {
        for (l1, l2) in [(ISS_LINE1, ISS_LINE2), (VANGUARD_LINE1, VANGUARD_LINE2)] {
            let tle = parse_lines(None, l1, l2).unwrap();
            let (e1, e2) = tle.to_lines();
            assert_eq!(e1, l1);
            assert_eq!(e2, l2);
            assert_eq!(line_checksum(&e1), l1.as_bytes()[68] - b'0');
            assert_eq!(line_checksum(&e2), l2.as_bytes()[68] - b'0');
        }
    }

    #[test]
    fn test_any_single_digit_corruption_fails_checksum() {
        for (number, line) in [(1u8, ISS_LINE1), (2u8, ISS_LINE2)] {
            for (i, b) in line.bytes().enumerate().take(TLE_LINE_LENGTH - 1) {
                if !b.is_ascii_digit() || i == 0 {
                    continue;
                }
                let replacement = if b == b'9' { b'0' } else { b + 1 };
                let mut corrupted = line.as_bytes().to_vec();
                corrupted[i] = replacement;
                let corrupted = String::from_utf8(corrupted).unwrap();

                let result = check_line(number, &corrupted);
                assert!(
                    matches!(result, Err(TleError::Checksum { line, .. }) if line == number),
                    "column {} of line {} not caught: {:?}",
                    i + 1,
                    number,
                    result
                );
            }
        }
    }

    #[test]
    fn test_altered_last_digit_on_line2() {
        let mut line2 = ISS_LINE2.to_string();
        line2.replace_range(68..69, "9");
        let err = parse_lines(None, ISS_LINE1, &line2).unwrap_err();
        assert_eq!(
            err,
            TleError::Checksum {
                line: 2,
                expected: 8,
                found: '9'
            }
        );
    }

    #[test]
    fn test_line_length_and_number() {
        let short = &ISS_LINE1[..68];
        assert_eq!(
            parse_lines(None, short, ISS_LINE2),
            Err(TleError::LineLength { line: 1, length: 68 })
        );
        assert_eq!(
            parse_lines(None, ISS_LINE2, ISS_LINE2),
            Err(TleError::LineNumber { line: 1, found: '2' })
        );
    }

    #[test]
    fn test_inconsistent_catalog_numbers() {
        // 25545 in line 2, checksum adjusted from 8 to 9
        let line2 = "2 25545  51.6453  57.0843 0001671  64.9808  73.0513 15.49338189252429";
        assert_eq!(
            parse_lines(None, ISS_LINE1, line2),
            Err(TleError::InconsistentRecord {
                line1: 25544,
                line2: 25545
            })
        );
    }

    #[test]
    fn test_inclination_out_of_range() {
        // inclination 181.6453, checksum adjusted from 8 to 2
        let line2 = "2 25544 181.6453  57.0843 0001671  64.9808  73.0513 15.49338189252422";
        assert!(matches!(
            parse_lines(None, ISS_LINE1, line2),
            Err(TleError::Range { field: "inclination", .. })
        ));
    }

    #[test]
    fn test_non_finite_fields_rejected() {
        let line2 = edited(ISS_LINE2, 52, "        inf");
        assert_eq!(
            parse_lines(None, ISS_LINE1, &line2),
            Err(TleError::Field {
                line: 2,
                field: "mean motion",
                text: "        inf".to_string()
            })
        );

        let line2 = edited(ISS_LINE2, 8, "     NaN");
        assert!(matches!(
            parse_lines(None, ISS_LINE1, &line2),
            Err(TleError::Field { field: "inclination", .. })
        ));

        let line1 = edited(ISS_LINE1, 33, "       NaN");
        assert!(matches!(
            parse_lines(None, &line1, ISS_LINE2),
            Err(TleError::Field {
                line: 1,
                field: "mean motion derivative",
                ..
            })
        ));

        let line1 = edited(ISS_LINE1, 20, "    infinity");
        assert!(matches!(
            parse_lines(None, &line1, ISS_LINE2),
            Err(TleError::Field { field: "epoch day", .. })
        ));

        assert!(parse_exponent_field(1, "bstar", " 1+99999").is_err());
        assert!(check_range("mean motion", f64::INFINITY, |n| n > 0.0).is_err());
        assert!(check_range("mean motion", f64::NAN, |_| true).is_err());
    }

    #[test]
    fn test_epoch_year_needs_two_digits() {
        for year in ["-1", "+1", " 1", "2 "] {
            let line1 = edited(ISS_LINE1, 18, year);
            assert_eq!(
                parse_lines(None, &line1, ISS_LINE2),
                Err(TleError::Field {
                    line: 1,
                    field: "epoch year",
                    text: year.to_string()
                }),
                "epoch year {:?}",
                year
            );
        }

        let line1 = edited(ISS_LINE1, 18, "56");
        assert_eq!(parse_lines(None, &line1, ISS_LINE2).unwrap().epoch_year(), 2056);
        let line1 = edited(ISS_LINE1, 18, "57");
        assert_eq!(parse_lines(None, &line1, ISS_LINE2).unwrap().epoch_year(), 1957);
    }

    #[test]
    fn test_exponent_fields() {
        assert!(close(parse_exponent_field(1, "f", " 35580-4").unwrap(), 3.558e-5));
        assert!(close(parse_exponent_field(1, "f", "-11606-4").unwrap(), -1.1606e-5));
        assert!(close(parse_exponent_field(1, "f", " 00000+0").unwrap(), 0.0));
        assert!(close(parse_exponent_field(1, "f", " 50000-0").unwrap(), 0.5));
        assert!(close(parse_exponent_field(1, "f", "+12345-1").unwrap(), 0.012345));
        assert!(parse_exponent_field(1, "f", " 3x580-4").is_err());
    }

    #[test]
    fn test_alpha5_catalog_number() {
        assert_eq!(parse_catalog_number(1, "A0000").unwrap(), 100_000);
        assert_eq!(parse_catalog_number(1, "J1234").unwrap(), 181_234);
        assert!(parse_catalog_number(1, "I0000").is_err());
    }
}
