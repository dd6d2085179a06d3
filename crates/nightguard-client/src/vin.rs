//! Vehicle identification number

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::NightguardError;

const VIN_LENGTH: usize = 17;

/// A syntactically valid VIN, normalized to upper case.
///
/// Validation is purely lexical; whether the account owns the vehicle is
/// checked against the vehicle list when a [`VehicleClient`](crate::VehicleClient)
/// connects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Vin(String);

impl Vin {
    pub fn parse(raw: &str) -> Result<Self, NightguardError> {
        let trimmed = raw.trim();
        if trimmed.len() != VIN_LENGTH || !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(NightguardError::InvalidVin(raw.to_string()));
        }
        Ok(Self(trimmed.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison against a VIN reported by the API
    pub fn matches(&self, other: &str) -> bool {
        self.0.eq_ignore_ascii_case(other.trim())
    }
}

impl FromStr for Vin {
    type Err = NightguardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Vin {
    type Error = NightguardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Vin> for String {
    fn from(vin: Vin) -> Self {
        vin.0
    }
}

impl fmt::Display for Vin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Vin {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
