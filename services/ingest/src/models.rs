use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Value outside a closed set of labels
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {field} value: {value:?}")]
pub struct UnknownVariant {
    pub field: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpareKey {
    Yes,
    No,
}

impl SpareKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpareKey::Yes => "Yes",
            SpareKey::No => "No",
        }
    }
}

impl FromStr for SpareKey {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" => Ok(SpareKey::Yes),
            "no" => Ok(SpareKey::No),
            _ => Err(UnknownVariant {
                field: "spare_key",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for SpareKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transmission {
    Automatic,
    Manual,
}

impl Transmission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Transmission::Automatic => "Automatic",
            Transmission::Manual => "Manual",
        }
    }
}

impl FromStr for Transmission {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "automatic" => Ok(Transmission::Automatic),
            "manual" => Ok(Transmission::Manual),
            _ => Err(UnknownVariant {
                field: "transmission",
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for Transmission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted car record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub id: Uuid,
    pub model_name: String,
    pub price: f64,
    pub manufacturing_year: i32,
    pub engine_capacity: String,
    pub spare_key: SpareKey,
    pub transmission: Transmission,
    pub km_driven: f64,
    pub ownership: String,
    pub fuel_type: String,
    pub imperfections: String,
    pub repainted_parts: String,
    pub created_at: DateTime<Utc>,
}

/// A car record that has not been stored yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCar {
    pub model_name: String,
    pub price: f64,
    pub manufacturing_year: i32,
    pub engine_capacity: String,
    pub spare_key: SpareKey,
    pub transmission: Transmission,
    pub km_driven: f64,
    pub ownership: String,
    pub fuel_type: String,
    pub imperfections: String,
    pub repainted_parts: String,
}

impl NewCar {
    /// Attach an identity and creation time
    pub fn into_car(self, id: Uuid, created_at: DateTime<Utc>) -> Car {
        Car {
            id,
            model_name: self.model_name,
            price: self.price,
            manufacturing_year: self.manufacturing_year,
            engine_capacity: self.engine_capacity,
            spare_key: self.spare_key,
            transmission: self.transmission,
            km_driven: self.km_driven,
            ownership: self.ownership,
            fuel_type: self.fuel_type,
            imperfections: self.imperfections,
            repainted_parts: self.repainted_parts,
            created_at,
        }
    }
}

/// A manually entered car, as submitted by a client
///
/// Enumerations arrive as free text so that a bad label is reported as a
/// validation failure rather than a decoding one.
#[derive(Debug, Clone, Deserialize)]
pub struct CarInput {
    pub model_name: String,
    pub price: f64,
    pub manufacturing_year: i32,
    pub engine_capacity: Option<String>,
    pub spare_key: String,
    pub transmission: String,
    pub km_driven: f64,
    pub ownership: String,
    pub fuel_type: String,
    pub imperfections: Option<String>,
    pub repainted_parts: Option<String>,
}

/// One CSV row keyed by the import header names
///
/// `None` means the column was absent or the cell was blank.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCar {
    pub model_name: Option<String>,
    pub price: Option<String>,
    pub manufacturing_year: Option<String>,
    pub engine_capacity: Option<String>,
    pub spare_key: Option<String>,
    pub transmission: Option<String>,
    pub km_driven: Option<String>,
    pub ownership: Option<String>,
    pub fuel_type: Option<String>,
    pub imperfections: Option<String>,
    pub repainted_parts: Option<String>,
}

/// A normalized field value and whether the fallback was substituted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizeResult<T> {
    pub value: T,
    pub used_default: bool,
}

impl<T> NormalizeResult<T> {
    pub fn parsed(value: T) -> Self {
        Self {
            value,
            used_default: false,
        }
    }

    pub fn defaulted(value: T) -> Self {
        Self {
            value,
            used_default: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_labels_are_case_insensitive() {
        assert_eq!("yes".parse::<SpareKey>().unwrap(), SpareKey::Yes);
        assert_eq!(" NO ".parse::<SpareKey>().unwrap(), SpareKey::No);
        assert_eq!("AUTOMATIC".parse::<Transmission>().unwrap(), Transmission::Automatic);
        assert!("CVT".parse::<Transmission>().is_err());
    }

    #[test]
    fn test_car_serializes_with_import_field_names() {
        let car = NewCar {
            model_name: "Toyota Camry".to_string(),
            price: 2_500_000.0,
            manufacturing_year: 2020,
            engine_capacity: "2487 cc".to_string(),
            spare_key: SpareKey::Yes,
            transmission: Transmission::Automatic,
            km_driven: 32_000.0,
            ownership: "First Owner".to_string(),
            fuel_type: "Petrol".to_string(),
            imperfections: "None".to_string(),
            repainted_parts: "None".to_string(),
        }
        .into_car(Uuid::nil(), Utc::now());

        let json = serde_json::to_value(&car).unwrap();
        assert_eq!(json["id"], Uuid::nil().to_string());
        assert_eq!(json["spare_key"], "Yes");
        assert_eq!(json["transmission"], "Automatic");
        assert_eq!(json["manufacturing_year"], 2020);
    }
}
