use regex::Regex;
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

use constants_core::{ToToken, Token};

use crate::error::ParseError;

static NOTATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(-?\d+)(\.\d+)?(\(\d+\))?(e-?\d+)?(.*)$").expect("measurement notation regex")
});

/// A measured value with its standard uncertainty and unit.
///
/// An uncertainty of `None` means unknown; `Some(0.0)` means exact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    pub value: f64,
    pub uncertainty: Option<f64>,
    pub unit: Option<String>,
}

impl Measurement {
    /// An empty `unit` is stored as `None`.
    pub fn new(value: f64, uncertainty: Option<f64>, unit: &str) -> Self {
        Measurement {
            value,
            uncertainty,
            unit: (!unit.is_empty()).then(|| unit.to_owned()),
        }
    }

    pub fn exact(value: f64, unit: &str) -> Self {
        Self::new(value, Some(0.0), unit)
    }

    pub fn estimate(value: f64, unit: &str) -> Self {
        Self::new(value, None, unit)
    }

    /// Parses the concise notation `<value>(<uncertainty>)e<exponent><unit>`.
    ///
    /// Whitespace anywhere is ignored. The parenthesised uncertainty applies
    /// to the last digits of the value, so `1.0(2)` is `1.0 ± 0.2` and
    /// `1.0(1)e3` is `1000 ± 100`. Without parentheses the uncertainty is
    /// unknown.
    ///
    /// ```
    /// use constants_library::Measurement;
    ///
    /// let m = Measurement::parse("1.007 825 032 1(4)").unwrap();
    /// assert_eq!(m.value, 1.0078250321);
    /// assert_eq!(m.uncertainty, Some(0.0000000004));
    /// assert_eq!(m.unit, None);
    /// ```
    pub fn parse(input: &str) -> Result<Self, ParseError> {
        let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
        let invalid = || ParseError::Measurement {
            input: input.to_owned(),
        };

        let caps = NOTATION.captures(&compact).ok_or_else(invalid)?;
        let integer = &caps[1];
        let decimals = caps.get(2).map_or("", |m| m.as_str());
        let exponent = caps.get(4).map_or("", |m| m.as_str());

        let value: f64 = format!("{integer}{decimals}{exponent}")
            .parse()
            .map_err(|_| invalid())?;

        let uncertainty = match caps.get(3) {
            None => None,
            Some(digits) => {
                let digits = digits.as_str().trim_matches(|c| c == '(' || c == ')');
                let mut scale = -(decimals.len().saturating_sub(1) as i64);
                if !exponent.is_empty() {
                    scale += exponent[1..].parse::<i64>().map_err(|_| invalid())?;
                }
                Some(format!("{digits}e{scale}").parse::<f64>().map_err(|_| invalid())?)
            }
        };

        Ok(Self::new(value, uncertainty, &caps[5]))
    }

    pub fn is_exact(&self) -> bool {
        self.uncertainty == Some(0.0)
    }

    /// Value and uncertainty as a pair.
    pub fn to_pair(&self) -> (f64, Option<f64>) {
        (self.value, self.uncertainty)
    }
}

impl PartialOrd for Measurement {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.value.partial_cmp(&other.value)
    }
}

impl ToToken for Measurement {
    fn to_token(&self) -> Token {
        Token::Float(self.value)
    }
}

impl fmt::Display for Measurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)?;
        if let Some(uncertainty) = self.uncertainty {
            write!(f, " ± {uncertainty}")?;
        }
        if let Some(unit) = &self.unit {
            write!(f, " {unit}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_value_and_uncertainty() {
        assert_eq!(Measurement::parse("1.0(2)").unwrap().to_pair(), (1.0, Some(0.2)));
        assert_eq!(Measurement::parse("1.0(1)e3").unwrap().to_pair(), (1000.0, Some(100.0)));
        assert_eq!(Measurement::parse("12(3)").unwrap().to_pair(), (12.0, Some(3.0)));
    }

    #[test]
    fn missing_uncertainty_is_unknown() {
        let m = Measurement::parse("6.626 068 96").unwrap();
        assert_eq!(m.to_pair(), (6.62606896, None));
        assert!(!m.is_exact());
    }

    #[test]
    fn whitespace_is_ignored() {
        let m = Measurement::parse("1.602 176 487(40) e-19").unwrap();
        assert_eq!(m.value, 1.602176487e-19);
        assert_eq!(m.uncertainty, Some(40e-28));
    }

    #[test]
    fn trailing_text_is_the_unit() {
        let m = Measurement::parse("105.658369(9) MeV/c^2").unwrap();
        assert_eq!(m.value, 105.658369);
        assert_eq!(m.uncertainty, Some(9e-6));
        assert_eq!(m.unit.as_deref(), Some("MeV/c^2"));

        let m = Measurement::parse("5 eV").unwrap();
        assert_eq!(m.value, 5.0);
        assert_eq!(m.unit.as_deref(), Some("eV"));
    }

    #[test]
    fn exact_values() {
        let m = Measurement::parse("299 792 458(0)").unwrap();
        assert_eq!(m.value, 299792458.0);
        assert!(m.is_exact());
    }

    #[test]
    fn negative_values() {
        let m = Measurement::parse("-2.002 319 304 362 2(15)").unwrap();
        assert_eq!(m.value, -2.0023193043622);
        assert_eq!(m.uncertainty, Some(15e-13));
    }

    #[test]
    fn rejects_non_numeric_input() {
        let err = Measurement::parse("about five").unwrap_err();
        assert_eq!(
            err,
            ParseError::Measurement {
                input: "about five".into()
            }
        );
    }

    #[test]
    fn orders_by_value() {
        let small = Measurement::new(1.0, Some(5.0), "m");
        let large = Measurement::estimate(2.0, "kg");
        assert!(small < large);
    }

    #[test]
    fn display_includes_uncertainty_and_unit() {
        assert_eq!(Measurement::new(1.5, Some(0.1), "m").to_string(), "1.5 ± 0.1 m");
        assert_eq!(Measurement::estimate(2.0, "").to_string(), "2");
    }
}
