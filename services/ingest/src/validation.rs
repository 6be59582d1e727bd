//! Shape checks applied to every record before it is stored

use crate::error::StoreError;
use crate::models::{CarInput, NewCar, SpareKey, Transmission};
use crate::normalize::{DEFAULT_ENGINE_CAPACITY, DEFAULT_IMPERFECTIONS, DEFAULT_REPAINTED_PARTS};

/// Earliest manufacturing year accepted
pub const FIRST_CAR_YEAR: i32 = 1886;

fn non_negative(field: &str, value: f64) -> Result<(), StoreError> {
    if !value.is_finite() || value < 0.0 {
        return Err(StoreError::Validation(format!(
            "{field} must be a non-negative number"
        )));
    }
    Ok(())
}

fn non_empty(field: &str, value: &str) -> Result<(), StoreError> {
    if value.trim().is_empty() {
        return Err(StoreError::Validation(format!("{field} is required")));
    }
    Ok(())
}

/// Check a record against the car schema
pub fn validate_car(car: &NewCar, current_year: i32) -> Result<(), StoreError> {
    non_empty("model_name", &car.model_name)?;
    non_negative("price", car.price)?;
    non_negative("km_driven", car.km_driven)?;

    if !(FIRST_CAR_YEAR..=current_year + 1).contains(&car.manufacturing_year) {
        return Err(StoreError::Validation(format!(
            "manufacturing_year must be between {} and {}",
            FIRST_CAR_YEAR,
            current_year + 1
        )));
    }

    non_empty("ownership", &car.ownership)?;
    non_empty("fuel_type", &car.fuel_type)?;
    Ok(())
}

fn optional_text(value: Option<String>, default: &str) -> String {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl CarInput {
    /// Turn a manual entry into a record, rejecting anything off-shape
    pub fn validate(self, current_year: i32) -> Result<NewCar, StoreError> {
        let spare_key = self
            .spare_key
            .parse::<SpareKey>()
            .map_err(|e| StoreError::Validation(e.to_string()))?;
        let transmission = self
            .transmission
            .parse::<Transmission>()
            .map_err(|e| StoreError::Validation(e.to_string()))?;

        let car = NewCar {
            model_name: self.model_name.trim().to_string(),
            price: self.price,
            manufacturing_year: self.manufacturing_year,
            engine_capacity: optional_text(self.engine_capacity, DEFAULT_ENGINE_CAPACITY),
            spare_key,
            transmission,
            km_driven: self.km_driven,
            ownership: self.ownership.trim().to_string(),
            fuel_type: self.fuel_type.trim().to_string(),
            imperfections: optional_text(self.imperfections, DEFAULT_IMPERFECTIONS),
            repainted_parts: optional_text(self.repainted_parts, DEFAULT_REPAINTED_PARTS),
        };

        validate_car(&car, current_year)?;
        Ok(car)
    }
}
