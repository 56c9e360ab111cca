//! Reader for the NIST "Fundamental Physical Constants, complete listing"
//! (`allascii.txt`) format.
//!
//! Each data row holds a quantity name, a value, an uncertainty and a unit,
//! separated by runs of two or more spaces:
//!
//! ```text
//! electron mass                                    9.109 382 15 e-31        0.000 000 45 e-31        kg
//! speed of light in vacuum                         299 792 458              (exact)                  m s^-1
//! ```

use regex::Regex;
use std::sync::LazyLock;

use crate::error::ParseError;
use crate::measurement::Measurement;
use crate::physical::PhysicalConstant;

static COLUMN_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").expect("column break regex"));

/// Parses one row of the listing.
///
/// Blank lines, lines starting with whitespace (headers, preamble) and
/// separator lines starting with `-` yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<PhysicalConstant>, ParseError> {
    let line = line.trim_end();
    if line.is_empty() || line.starts_with(|c: char| c.is_whitespace() || c == '-') {
        return Ok(None);
    }

    let mut columns = COLUMN_BREAK.split(line).map(str::trim);
    let (Some(name), Some(value)) = (columns.next(), columns.next()) else {
        return Err(ParseError::MissingColumns { row: line.to_owned() });
    };
    let uncertainty = columns.next().unwrap_or("");
    let unit = columns.next().unwrap_or("");

    let value = Measurement::parse(&value.replace("...", ""))?.value;
    let uncertainty = match uncertainty {
        "" => None,
        "(exact)" => Some(0.0),
        other => Some(Measurement::parse(other)?.value),
    };

    Ok(Some(PhysicalConstant::new(name, Measurement::new(value, uncertainty, unit))))
}

/// Parses a full listing.
///
/// If the text has a dashed separator line, everything up to and including
/// it is treated as preamble. Errors carry the 1-based line number.
pub fn parse_table(text: &str) -> Result<Vec<PhysicalConstant>, ParseError> {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines
        .iter()
        .position(|line| line.starts_with("---"))
        .map_or(0, |separator| separator + 1);

    let mut constants = Vec::new();
    for (offset, line) in lines[start..].iter().enumerate() {
        let parsed = parse_line(line).map_err(|source| ParseError::Row {
            line: start + offset + 1,
            source: Box::new(source),
        })?;
        constants.extend(parsed);
    }

    log::debug!("parsed {} NIST constants", constants.len());
    Ok(constants)
}
