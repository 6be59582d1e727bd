//! In-memory car store for tests in this and dependent crates

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::current_year;
use crate::error::StoreError;
use crate::models::{Car, NewCar};
use crate::repositories::CarStore;
use crate::validation::validate_car;

/// Car store with the same validation and batch semantics as [`super::CarRepository`]
#[derive(Default)]
pub struct MemoryCarStore {
    cars: Mutex<Vec<Car>>,
}

impl MemoryCarStore {
    pub async fn len(&self) -> usize {
        self.cars.lock().await.len()
    }
}

#[async_trait]
impl CarStore for MemoryCarStore {
    async fn insert_one(&self, car: &NewCar) -> Result<Car, StoreError> {
        validate_car(car, current_year())?;
        let stored = car.clone().into_car(Uuid::new_v4(), Utc::now());
        self.cars.lock().await.push(stored.clone());
        Ok(stored)
    }

    async fn insert_many(&self, cars: &[NewCar]) -> Result<u64, StoreError> {
        let year = current_year();
        for car in cars {
            validate_car(car, year)?;
        }
        let mut stored = self.cars.lock().await;
        let now = Utc::now();
        stored.extend(cars.iter().cloned().map(|c| c.into_car(Uuid::new_v4(), now)));
        Ok(cars.len() as u64)
    }

    async fn list_all(&self) -> Result<Vec<Car>, StoreError> {
        Ok(self.cars.lock().await.clone())
    }
}
