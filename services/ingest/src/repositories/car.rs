//! Car record store

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgRow};
use tracing::{debug, info};
use uuid::Uuid;

use crate::current_year;
use crate::error::StoreError;
use crate::models::{Car, NewCar, SpareKey, Transmission};
use crate::validation::validate_car;

/// Rows per INSERT statement; 12 binds each keeps well under the 65535 bind limit
const INSERT_CHUNK_ROWS: usize = 1000;

const CAR_COLUMNS: &str = "id, model_name, price, manufacturing_year, engine_capacity, spare_key, \
     transmission, km_driven, ownership, fuel_type, imperfections, repainted_parts, created_at";

/// Persistence seam for car records
///
/// Every record is validated with [`validate_car`] before it is written.
#[async_trait]
pub trait CarStore: Send + Sync {
    /// Store one record and return it with its identity
    async fn insert_one(&self, car: &NewCar) -> Result<Car, StoreError>;

    /// Store a batch, all or nothing, returning the number written
    async fn insert_many(&self, cars: &[NewCar]) -> Result<u64, StoreError>;

    /// Every stored record, in storage order
    async fn list_all(&self) -> Result<Vec<Car>, StoreError>;
}

/// PostgreSQL-backed car repository
#[derive(Clone)]
pub struct CarRepository {
    pool: PgPool,
}

impl CarRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn decode_label<T: std::str::FromStr>(row: &PgRow, column: &str) -> Result<T, StoreError>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let label: String = row.try_get(column)?;
    label.parse().map_err(|e: T::Err| {
        StoreError::Database(sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: Box::new(e),
        })
    })
}

fn car_from_row(row: &PgRow) -> Result<Car, StoreError> {
    Ok(Car {
        id: row.try_get("id")?,
        model_name: row.try_get("model_name")?,
        price: row.try_get("price")?,
        manufacturing_year: row.try_get("manufacturing_year")?,
        engine_capacity: row.try_get("engine_capacity")?,
        spare_key: decode_label::<SpareKey>(row, "spare_key")?,
        transmission: decode_label::<Transmission>(row, "transmission")?,
        km_driven: row.try_get("km_driven")?,
        ownership: row.try_get("ownership")?,
        fuel_type: row.try_get("fuel_type")?,
        imperfections: row.try_get("imperfections")?,
        repainted_parts: row.try_get("repainted_parts")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl CarStore for CarRepository {
    async fn insert_one(&self, car: &NewCar) -> Result<Car, StoreError> {
        validate_car(car, current_year())?;

        let query = format!(
            "INSERT INTO cars ({CAR_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {CAR_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(&car.model_name)
            .bind(car.price)
            .bind(car.manufacturing_year)
            .bind(&car.engine_capacity)
            .bind(car.spare_key.as_str())
            .bind(car.transmission.as_str())
            .bind(car.km_driven)
            .bind(&car.ownership)
            .bind(&car.fuel_type)
            .bind(&car.imperfections)
            .bind(&car.repainted_parts)
            .bind(Utc::now())
            .fetch_one(&self.pool)
            .await?;

        let stored = car_from_row(&row)?;
        info!("Stored car record: {}", stored.id);
        Ok(stored)
    }

    async fn insert_many(&self, cars: &[NewCar]) -> Result<u64, StoreError> {
        let year = current_year();
        for car in cars {
            validate_car(car, year)?;
        }
        if cars.is_empty() {
            return Ok(0);
        }

        let created_at = Utc::now();
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for chunk in cars.chunks(INSERT_CHUNK_ROWS) {
            let mut builder: QueryBuilder<Postgres> =
                QueryBuilder::new(format!("INSERT INTO cars ({CAR_COLUMNS}) "));
            builder.push_values(chunk, |mut b, car| {
                b.push_bind(Uuid::new_v4())
                    .push_bind(&car.model_name)
                    .push_bind(car.price)
                    .push_bind(car.manufacturing_year)
                    .push_bind(&car.engine_capacity)
                    .push_bind(car.spare_key.as_str())
                    .push_bind(car.transmission.as_str())
                    .push_bind(car.km_driven)
                    .push_bind(&car.ownership)
                    .push_bind(&car.fuel_type)
                    .push_bind(&car.imperfections)
                    .push_bind(&car.repainted_parts)
                    .push_bind(created_at);
            });

            let result = builder.build().execute(&mut *tx).await?;
            inserted += result.rows_affected();
            debug!("Inserted chunk of {} car records", chunk.len());
        }

        tx.commit().await?;
        info!("Stored batch of {} car records", inserted);
        Ok(inserted)
    }

    async fn list_all(&self) -> Result<Vec<Car>, StoreError> {
        let rows = sqlx::query(&format!("SELECT {CAR_COLUMNS} FROM cars"))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(car_from_row).collect()
    }
}
