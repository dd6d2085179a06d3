//! Display unit handling (metric or imperial)

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

const KM_PER_MILE: f64 = 1.609344;
const LITERS_PER_GALLON: f64 = 3.785411784;

/// Measurement system used when presenting telemetry values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    /// Values as the API reports them
    #[default]
    Metric,
    /// Fahrenheit, miles, gallons
    Imperial,
}

/// Unknown unit system name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid unit type '{0}'. Expected one of: imperial, metric")]
pub struct ParseUnitSystemError(String);

impl FromStr for UnitSystem {
    type Err = ParseUnitSystemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "metric" => Ok(Self::Metric),
            "imperial" => Ok(Self::Imperial),
            _ => Err(ParseUnitSystemError(s.to_string())),
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metric => f.write_str("metric"),
            Self::Imperial => f.write_str("imperial"),
        }
    }
}

impl UnitSystem {
    /// Convert a value reported in the API's metric `unit`.
    ///
    /// Returns the converted value and its unit name. Units without an
    /// imperial counterpart pass through unchanged.
    pub fn convert<'a>(&self, value: f64, unit: &'a str) -> (f64, &'a str) {
        if *self == Self::Metric {
            return (value, unit);
        }
        match unit {
            "celsius" => (celsius_to_fahrenheit(value), "fahrenheit"),
            "kilometers" => (km_to_miles(value), "miles"),
            "kilometers_per_hour" => (km_to_miles(value), "miles_per_hour"),
            "liters" => (value / LITERS_PER_GALLON, "gallons"),
            _ => (value, unit),
        }
    }
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn km_to_miles(km: f64) -> f64 {
    km / KM_PER_MILE
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("metric", UnitSystem::Metric)]
    #[case("Imperial", UnitSystem::Imperial)]
    #[case("METRIC", UnitSystem::Metric)]
    fn test_parse(#[case] raw: &str, #[case] expected: UnitSystem) {
        assert_eq!(raw.parse::<UnitSystem>().unwrap(), expected);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "nautical".parse::<UnitSystem>().unwrap_err();
        assert!(err.to_string().contains("imperial, metric"));
    }

    #[test]
    fn test_metric_passthrough() {
        assert_eq!(UnitSystem::Metric.convert(66.0, "celsius"), (66.0, "celsius"));
    }

    #[test]
    fn test_imperial_conversions() {
        let (f, unit) = UnitSystem::Imperial.convert(100.0, "celsius");
        assert_eq!((f, unit), (212.0, "fahrenheit"));

        let (miles, unit) = UnitSystem::Imperial.convert(1.609344, "kilometers");
        assert!((miles - 1.0).abs() < 1e-9);
        assert_eq!(unit, "miles");

        let (_, unit) = UnitSystem::Imperial.convert(35.0, "kilometers_per_hour");
        assert_eq!(unit, "miles_per_hour");

        assert_eq!(UnitSystem::Imperial.convert(616.0, "hours"), (616.0, "hours"));
    }
}
