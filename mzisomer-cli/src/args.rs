use std::{error::Error, fmt::Display, num::ParseFloatError, str::FromStr};

use mzpeaks::Tolerance;
use serde::{Deserialize, Serialize};

/// A mass tolerance written as `<value>ppm` or `<value>da`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ArgTolerance(pub Tolerance);

impl ArgTolerance {
    pub fn ppm(value: f64) -> Self {
        Self(Tolerance::PPM(value))
    }

    pub fn da(value: f64) -> Self {
        Self(Tolerance::Da(value))
    }
}

impl From<ArgTolerance> for Tolerance {
    fn from(value: ArgTolerance) -> Self {
        value.0
    }
}

impl Display for ArgTolerance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Tolerance::PPM(value) => write!(f, "{value}ppm"),
            Tolerance::Da(value) => write!(f, "{value}da"),
        }
    }
}

#[derive(Debug)]
pub enum ToleranceParseError {
    MalformedValue(String, ParseFloatError),
    UnknownUnit(String),
    Negative(String),
}

impl Display for ToleranceParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToleranceParseError::MalformedValue(s, e) => {
                write!(f, "Failed to parse tolerance value from `{s}`: {e}")
            }
            ToleranceParseError::UnknownUnit(s) => {
                write!(
                    f,
                    "Failed to parse tolerance unit from `{s}`, expected `ppm` or `da`"
                )
            }
            ToleranceParseError::Negative(s) => {
                write!(f, "Failed to parse tolerance `{s}`, it must not be negative")
            }
        }
    }
}

impl Error for ToleranceParseError {}

impl FromStr for ArgTolerance {
    type Err = ToleranceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let (value, unit) = if let Some(value) = normalized.strip_suffix("ppm") {
            (value, Tolerance::PPM as fn(f64) -> Tolerance)
        } else if let Some(value) = normalized.strip_suffix("da") {
            (value, Tolerance::Da as fn(f64) -> Tolerance)
        } else {
            return Err(ToleranceParseError::UnknownUnit(s.to_string()));
        };
        let value: f64 = value
            .trim()
            .parse()
            .map_err(|e| ToleranceParseError::MalformedValue(s.to_string(), e))?;
        if value < 0.0 {
            return Err(ToleranceParseError::Negative(s.to_string()));
        }
        Ok(Self(unit(value)))
    }
}

impl TryFrom<String> for ArgTolerance {
    type Error = ToleranceParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ArgTolerance> for String {
    fn from(value: ArgTolerance) -> Self {
        value.to_string()
    }
}

/// Parse a value for a threshold on the unit interval
pub fn unit_interval_float(s: &str) -> Result<f64, String> {
    let value = s.parse::<f64>().map_err(|e| e.to_string())?;
    if !(0.0..=1.0).contains(&value) {
        Err(format!("`{s}` is not between 0 and 1"))
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_tolerance() {
        assert_eq!("8ppm".parse::<ArgTolerance>().unwrap(), ArgTolerance::ppm(8.0));
        assert_eq!("0.02Da".parse::<ArgTolerance>().unwrap(), ArgTolerance::da(0.02));
        assert_eq!(" 20 ppm ".parse::<ArgTolerance>().unwrap(), ArgTolerance::ppm(20.0));
        assert!("8ppx".parse::<ArgTolerance>().is_err());
        assert!("appm".parse::<ArgTolerance>().is_err());
        assert!("-5ppm".parse::<ArgTolerance>().is_err());
    }

    #[test]
    fn test_display_round_trip() {
        let tol = ArgTolerance::ppm(8.0);
        assert_eq!(tol.to_string(), "8ppm");
        assert_eq!(tol.to_string().parse::<ArgTolerance>().unwrap(), tol);
    }

    #[test]
    fn test_unit_interval() {
        assert_eq!(unit_interval_float("0.5"), Ok(0.5));
        assert!(unit_interval_float("1.5").is_err());
        assert!(unit_interval_float("x").is_err());
    }
}
