//! Lenient per-field normalization of imported rows
//!
//! A row is never rejected here. Every field that is absent, blank or not
//! coercible takes a fixed fallback, and the substitution is reported through
//! [`NormalizeResult::used_default`].

use crate::models::{NewCar, NormalizeResult, RawCar, SpareKey, Transmission};
use crate::validation::FIRST_CAR_YEAR;

pub const DEFAULT_MODEL_NAME: &str = "Unknown Model";
pub const DEFAULT_ENGINE_CAPACITY: &str = "Unknown";
pub const DEFAULT_SPARE_KEY: SpareKey = SpareKey::No;
pub const DEFAULT_TRANSMISSION: Transmission = Transmission::Manual;
pub const DEFAULT_OWNERSHIP: &str = "First Owner";
pub const DEFAULT_FUEL_TYPE: &str = "Petrol";
pub const DEFAULT_IMPERFECTIONS: &str = "None";
pub const DEFAULT_REPAINTED_PARTS: &str = "None";

/// A row after normalization, with the names of the fields that fell back
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedCar {
    pub car: NewCar,
    pub defaulted: Vec<&'static str>,
}

fn present(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

pub fn text(raw: Option<&str>, default: &str) -> NormalizeResult<String> {
    match present(raw) {
        Some(value) => NormalizeResult::parsed(value.to_string()),
        None => NormalizeResult::defaulted(default.to_string()),
    }
}

/// Non-negative finite amount, `0` otherwise
pub fn amount(raw: Option<&str>) -> NormalizeResult<f64> {
    match present(raw).and_then(|s| s.parse::<f64>().ok()) {
        Some(value) if value.is_finite() && value >= 0.0 => NormalizeResult::parsed(value),
        _ => NormalizeResult::defaulted(0.0),
    }
}

/// Whole year between [`FIRST_CAR_YEAR`] and next year, `current_year` otherwise
pub fn year(raw: Option<&str>, current_year: i32) -> NormalizeResult<i32> {
    let accepted = f64::from(FIRST_CAR_YEAR)..=f64::from(current_year + 1);
    match present(raw).and_then(|s| s.parse::<f64>().ok()) {
        Some(value) if value.fract() == 0.0 && accepted.contains(&value) => {
            NormalizeResult::parsed(value as i32)
        }
        _ => NormalizeResult::defaulted(current_year),
    }
}

pub fn spare_key(raw: Option<&str>) -> NormalizeResult<SpareKey> {
    match present(raw).and_then(|s| s.parse().ok()) {
        Some(value) => NormalizeResult::parsed(value),
        None => NormalizeResult::defaulted(DEFAULT_SPARE_KEY),
    }
}

pub fn transmission(raw: Option<&str>) -> NormalizeResult<Transmission> {
    match present(raw).and_then(|s| s.parse().ok()) {
        Some(value) => NormalizeResult::parsed(value),
        None => NormalizeResult::defaulted(DEFAULT_TRANSMISSION),
    }
}

/// Collects field values and the names of those that defaulted
struct Tracker {
    defaulted: Vec<&'static str>,
}

impl Tracker {
    fn take<T>(&mut self, field: &'static str, result: NormalizeResult<T>) -> T {
        if result.used_default {
            self.defaulted.push(field);
        }
        result.value
    }
}

/// Normalize one row; `current_year` is the fallback manufacturing year
pub fn normalize_row(raw: &RawCar, current_year: i32) -> NormalizedCar {
    let mut t = Tracker {
        defaulted: Vec::new(),
    };

    let car = NewCar {
        model_name: t.take(
            "model_name",
            text(raw.model_name.as_deref(), DEFAULT_MODEL_NAME),
        ),
        price: t.take("price", amount(raw.price.as_deref())),
        manufacturing_year: t.take(
            "manufacturing_year",
            year(raw.manufacturing_year.as_deref(), current_year),
        ),
        engine_capacity: t.take(
            "engine_capacity",
            text(raw.engine_capacity.as_deref(), DEFAULT_ENGINE_CAPACITY),
        ),
        spare_key: t.take("spare_key", spare_key(raw.spare_key.as_deref())),
        transmission: t.take("transmission", transmission(raw.transmission.as_deref())),
        km_driven: t.take("km_driven", amount(raw.km_driven.as_deref())),
        ownership: t.take(
            "ownership",
            text(raw.ownership.as_deref(), DEFAULT_OWNERSHIP),
        ),
        fuel_type: t.take(
            "fuel_type",
            text(raw.fuel_type.as_deref(), DEFAULT_FUEL_TYPE),
        ),
        imperfections: t.take(
            "imperfections",
            text(raw.imperfections.as_deref(), DEFAULT_IMPERFECTIONS),
        ),
        repainted_parts: t.take(
            "repainted_parts",
            text(raw.repainted_parts.as_deref(), DEFAULT_REPAINTED_PARTS),
        ),
    };

    NormalizedCar {
        car,
        defaulted: t.defaulted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_coercion() {
        assert_eq!(amount(Some(" 2500000 ")), NormalizeResult::parsed(2_500_000.0));
        assert_eq!(amount(Some("12.5")), NormalizeResult::parsed(12.5));
        assert_eq!(amount(Some("0")), NormalizeResult::parsed(0.0));
        assert_eq!(amount(None), NormalizeResult::defaulted(0.0));
        assert_eq!(amount(Some("")), NormalizeResult::defaulted(0.0));
        assert_eq!(amount(Some("2,500,000")), NormalizeResult::defaulted(0.0));
        assert_eq!(amount(Some("-5")), NormalizeResult::defaulted(0.0));
        assert_eq!(amount(Some("inf")), NormalizeResult::defaulted(0.0));
        assert_eq!(amount(Some("NaN")), NormalizeResult::defaulted(0.0));
    }

    #[test]
    fn test_year_coercion() {
        assert_eq!(year(Some("2020"), 2026), NormalizeResult::parsed(2020));
        assert_eq!(year(Some("2019.0"), 2026), NormalizeResult::parsed(2019));
        assert_eq!(year(Some("2019.5"), 2026), NormalizeResult::defaulted(2026));
        assert_eq!(year(Some("0"), 2026), NormalizeResult::defaulted(2026));
        assert_eq!(year(Some("-1999"), 2026), NormalizeResult::defaulted(2026));
        assert_eq!(year(Some("1886"), 2026), NormalizeResult::parsed(1886));
        assert_eq!(year(Some("2027"), 2026), NormalizeResult::parsed(2027));
        assert_eq!(year(Some("1885"), 2026), NormalizeResult::defaulted(2026));
        assert_eq!(year(Some("2099"), 2026), NormalizeResult::defaulted(2026));
        assert_eq!(year(Some("20190"), 2026), NormalizeResult::defaulted(2026));
        assert_eq!(year(Some("twenty"), 2026), NormalizeResult::defaulted(2026));
        assert_eq!(year(None, 2026), NormalizeResult::defaulted(2026));
    }

    #[test]
    fn test_enumerations_fall_back_on_unknown_labels() {
        assert_eq!(spare_key(Some("yes")), NormalizeResult::parsed(SpareKey::Yes));
        assert_eq!(spare_key(Some("maybe")), NormalizeResult::defaulted(SpareKey::No));
        assert_eq!(
            transmission(Some("automatic")),
            NormalizeResult::parsed(Transmission::Automatic)
        );
        assert_eq!(
            transmission(Some("CVT")),
            NormalizeResult::defaulted(Transmission::Manual)
        );
    }

    #[test]
    fn test_blank_row_takes_every_default() {
        let normalized = normalize_row(&RawCar::default(), 2026);

        assert_eq!(normalized.defaulted.len(), 11);
        let car = normalized.car;
        assert_eq!(car.model_name, "Unknown Model");
        assert_eq!(car.price, 0.0);
        assert_eq!(car.manufacturing_year, 2026);
        assert_eq!(car.engine_capacity, "Unknown");
        assert_eq!(car.spare_key, SpareKey::No);
        assert_eq!(car.transmission, Transmission::Manual);
        assert_eq!(car.km_driven, 0.0);
        assert_eq!(car.ownership, "First Owner");
        assert_eq!(car.fuel_type, "Petrol");
        assert_eq!(car.imperfections, "None");
        assert_eq!(car.repainted_parts, "None");
    }

    #[test]
    fn test_complete_row_keeps_its_values() {
        let raw = RawCar {
            model_name: Some("Toyota Camry".to_string()),
            price: Some("2500000".to_string()),
            manufacturing_year: Some("2020".to_string()),
            engine_capacity: Some("2487 cc".to_string()),
            spare_key: Some("Yes".to_string()),
            transmission: Some("Automatic".to_string()),
            km_driven: Some("32000".to_string()),
            ownership: Some("Second Owner".to_string()),
            fuel_type: Some("Hybrid".to_string()),
            imperfections: Some("Dent".to_string()),
            repainted_parts: Some("Bonnet".to_string()),
        };
        let normalized = normalize_row(&raw, 2026);

        assert!(normalized.defaulted.is_empty());
        assert_eq!(normalized.car.manufacturing_year, 2020);
        assert_eq!(normalized.car.fuel_type, "Hybrid");
    }

    #[test]
    fn test_defaulted_fields_are_named() {
        let raw = RawCar {
            model_name: Some("Swift".to_string()),
            price: Some("abc".to_string()),
            ..RawCar::default()
        };
        let normalized = normalize_row(&raw, 2026);

        assert!(normalized.defaulted.contains(&"price"));
        assert!(!normalized.defaulted.contains(&"model_name"));
    }
}
