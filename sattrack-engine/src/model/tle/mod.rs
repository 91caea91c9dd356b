//! Two-line element sets: model and parser

mod parser;
mod types;

#[cfg(test)]
pub(crate) mod fixtures;

pub use parser::{line_checksum, parse_lines, parse_tle, TleError, TLE_LINE_LENGTH};
pub use types::{Classification, ElementSet};
