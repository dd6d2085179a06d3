//! Response types for the connected-vehicle API

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{NightguardError, Result};
use crate::units::UnitSystem;

/// Status codes a response may carry and still be used
pub const STATUS_OK: u16 = 200;
pub const STATUS_ACCEPTED: u16 = 202;

// =============================================================================
// Envelope
// =============================================================================

/// Response envelope shared by every endpoint.
///
/// `status` is the code embedded in the body; when the body omits it the
/// client fills in the HTTP status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    #[serde(default)]
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiErrorBody>,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Error object inside the envelope
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl ApiResponse {
    /// The request was queued; `operation_id` identifies the pending result
    pub fn is_accepted(&self) -> bool {
        self.status == STATUS_ACCEPTED
    }

    /// Best available human-readable message from the error object
    pub fn error_message(&self) -> String {
        self.error
            .as_ref()
            .and_then(|e| e.description.clone().or_else(|| e.message.clone()))
            .unwrap_or_else(|| "-".to_string())
    }

    /// Deserialize the payload into a typed view
    pub fn data_as<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.data.clone())
            .map_err(|e| NightguardError::Parse(e.to_string()))
    }

    /// Flatten the payload into named signals
    pub fn signals(&self) -> Vec<Signal> {
        flatten_signals(&self.data)
    }
}

// =============================================================================
// Vehicle list / details
// =============================================================================

/// Entry of the account's vehicle list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleListEntry {
    pub vin: String,
}

/// Vehicle details such as model and model year
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleDetails {
    #[serde(default)]
    pub vin: Option<String>,
    #[serde(default)]
    pub model_year: Option<u16>,
    #[serde(default)]
    pub gearbox: Option<String>,
    #[serde(default)]
    pub fuel_type: Option<String>,
    #[serde(default)]
    pub external_colour: Option<String>,
    #[serde(default)]
    pub descriptions: VehicleDescriptions,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleDescriptions {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub upholstery: Option<String>,
    #[serde(default)]
    pub steering: Option<String>,
}

impl VehicleDetails {
    /// `Model (year)` summary line
    pub fn summary(&self) -> String {
        let model = self.descriptions.model.as_deref().unwrap_or("unknown model");
        match self.model_year {
            Some(year) => format!("{} ({})", model, year),
            None => model.to_string(),
        }
    }
}

// =============================================================================
// Signals
// =============================================================================

/// Leaf object reported for every signal:
/// `{"value": "NORMAL", "unit": "celsius", "timestamp": "2020-11-19T21:23:24.424Z"}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusValue {
    pub value: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<Timestamp>,
}

/// Signal timestamps come either as ISO-8601 strings or as epoch seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Epoch(i64),
    EpochFractional(f64),
    Iso(String),
}

impl Timestamp {
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Epoch(secs) => Utc.timestamp_opt(*secs, 0).single(),
            Self::EpochFractional(secs) => {
                let whole = secs.floor();
                let nanos = (((secs - whole) * 1e9).round() as u32).min(999_999_999);
                Utc.timestamp_opt(whole as i64, nanos).single()
            }
            Self::Iso(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }

    /// RFC 3339 rendering, or the raw text when it does not parse
    pub fn display(&self) -> String {
        match (self.to_datetime(), self) {
            (Some(dt), _) => dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            (None, Self::Iso(s)) => s.clone(),
            (None, Self::Epoch(secs)) => secs.to_string(),
            (None, Self::EpochFractional(secs)) => secs.to_string(),
        }
    }
}

impl StatusValue {
    fn bare(value: serde_json::Value) -> Self {
        Self {
            value,
            unit: None,
            timestamp: None,
        }
    }

    /// Numeric reading; the API sends most numbers as strings
    pub fn numeric(&self) -> Option<f64> {
        match &self.value {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Copy of the value expressed in `units`
    pub fn converted(&self, units: UnitSystem) -> Self {
        let (Some(number), Some(unit)) = (self.numeric(), self.unit.as_deref()) else {
            return self.clone();
        };
        let (converted, unit) = units.convert(number, unit);
        if unit == self.unit.as_deref().unwrap_or_default() {
            return self.clone();
        }
        let rounded = (converted * 100.0).round() / 100.0;
        Self {
            value: serde_json::Number::from_f64(rounded)
                .map(serde_json::Value::Number)
                .unwrap_or_else(|| self.value.clone()),
            unit: Some(unit.to_string()),
            timestamp: self.timestamp.clone(),
        }
    }
}

/// A named signal extracted from a payload
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    /// Dotted path, e.g. `descriptions.model` or `frontLeft`
    pub name: String,
    pub status: StatusValue,
}

/// Flatten a payload into signals.
///
/// Objects holding a `value` key are leaves; other objects and arrays are
/// walked with dotted (`a.b`) or indexed (`a[0]`) names. Bare scalars become
/// leaves without unit or timestamp.
pub fn flatten_signals(data: &serde_json::Value) -> Vec<Signal> {
    let mut out = Vec::new();
    walk(String::new(), data, &mut out);
    out
}

fn walk(prefix: String, node: &serde_json::Value, out: &mut Vec<Signal>) {
    match node {
        serde_json::Value::Object(map) if map.contains_key("value") => {
            let status = serde_json::from_value(node.clone())
                .unwrap_or_else(|_| StatusValue::bare(node.clone()));
            out.push(Signal {
                name: prefix,
                status,
            });
        }
        serde_json::Value::Object(map) => {
            for (key, child) in map {
                let name = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                walk(name, child, out);
            }
        }
        serde_json::Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                walk(format!("{}[{}]", prefix, i), child, out);
            }
        }
        serde_json::Value::Null => {}
        scalar => out.push(Signal {
            name: prefix,
            status: StatusValue::bare(scalar.clone()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_envelope_parsing() {
        let body = json!({
            "status": 202,
            "operationId": "op-1",
            "error": {"message": "Accepted", "description": "Request queued"},
            "data": {}
        });
        let response: ApiResponse = serde_json::from_value(body).unwrap();
        assert!(response.is_accepted());
        assert_eq!(response.operation_id.as_deref(), Some("op-1"));
        assert_eq!(response.error_message(), "Request queued");
    }

    #[test]
    fn test_envelope_defaults() {
        let response: ApiResponse = serde_json::from_value(json!({"data": []})).unwrap();
        assert_eq!(response.status, 0);
        assert_eq!(response.error_message(), "-");
    }

    #[test]
    fn test_details_summary() {
        let data = json!({
            "vin": "YV4952NA4F120DEMO",
            "modelYear": 2020,
            "descriptions": {"model": "XC40", "upholstery": "CHARCOAL"},
            "batteryCapacityKWH": 78.0
        });
        let details: VehicleDetails = serde_json::from_value(data).unwrap();
        assert_eq!(details.summary(), "XC40 (2020)");
        assert!(details.extra.contains_key("batteryCapacityKWH"));
    }

    #[test]
    fn test_flatten_signals() {
        let data = json!({
            "carLocked": {"value": "LOCKED", "timestamp": "2020-11-19T21:23:24.424Z"},
            "descriptions": {"model": "XC40"},
            "frontLeft": {"value": "CLOSED", "timestamp": 1599996619}
        });
        let signals = flatten_signals(&data);
        let names: Vec<&str> = signals.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["carLocked", "descriptions.model", "frontLeft"]);
        assert_eq!(
            signals[2].status.timestamp,
            Some(Timestamp::Epoch(1599996619))
        );
        assert_eq!(signals[1].status.value, json!("XC40"));
    }

    #[test]
    fn test_fractional_epoch_keeps_unit() {
        let data = json!({
            "fuelAmount": {"value": "40", "unit": "liters", "timestamp": 1599996619.5}
        });
        let signals = flatten_signals(&data);
        let status = &signals[0].status;
        assert_eq!(status.value, json!("40"));
        assert_eq!(status.unit.as_deref(), Some("liters"));
        assert_eq!(status.timestamp, Some(Timestamp::EpochFractional(1599996619.5)));
        assert_eq!(
            status.timestamp.as_ref().map(Timestamp::display).as_deref(),
            Some("2020-09-13T11:30:19Z")
        );
        assert_eq!(status.converted(UnitSystem::Imperial).unit.as_deref(), Some("gallons"));
    }

    #[test]
    fn test_flatten_vehicle_list() {
        let signals = flatten_signals(&json!([{"vin": "A"}, {"vin": "B"}]));
        let names: Vec<&str> = signals.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["[0].vin", "[1].vin"]);
    }

    #[test]
    fn test_timestamp_display() {
        let iso = Timestamp::Iso("2020-11-19T21:23:24.424Z".into());
        assert_eq!(iso.display(), "2020-11-19T21:23:24Z");
        assert_eq!(Timestamp::Epoch(0).display(), "1970-01-01T00:00:00Z");
        assert_eq!(
            Timestamp::Iso("YYYY-MM-DDTHH:MM:SS.SSSZ".into()).display(),
            "YYYY-MM-DDTHH:MM:SS.SSSZ"
        );
    }

    #[test]
    fn test_converted_to_imperial() {
        let temp = StatusValue {
            value: json!("66"),
            unit: Some("celsius".into()),
            timestamp: None,
        };
        let converted = temp.converted(UnitSystem::Imperial);
        assert_eq!(converted.value, json!(150.8));
        assert_eq!(converted.unit.as_deref(), Some("fahrenheit"));

        let untouched = temp.converted(UnitSystem::Metric);
        assert_eq!(untouched, temp);
    }

    #[test]
    fn test_converted_skips_non_numeric() {
        let status = StatusValue {
            value: json!("NORMAL"),
            unit: Some("celsius".into()),
            timestamp: None,
        };
        assert_eq!(status.converted(UnitSystem::Imperial), status);
    }
}
