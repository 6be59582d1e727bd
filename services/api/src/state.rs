//! Application state shared across handlers

use std::sync::Arc;

use auth::{CredentialService, JwtService, UserRepository, UserStore};
use common::config::{AppConfig, JwtConfig, UploadConfig};
use ingest::{CarRepository, CarStore, Ingestor, Stager};
use sqlx::PgPool;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub cars: Arc<dyn CarStore>,
    pub credentials: CredentialService,
    pub stager: Stager,
    pub ingestor: Ingestor,
}

impl AppState {
    /// State backed by the PostgreSQL repositories
    pub fn new(db_pool: PgPool, config: &AppConfig) -> Self {
        let users = Arc::new(UserRepository::new(db_pool.clone()));
        let cars = Arc::new(CarRepository::new(db_pool.clone()));
        Self::from_parts(db_pool, users, cars, &config.jwt, &config.upload)
    }

    pub fn from_parts(
        db_pool: PgPool,
        users: Arc<dyn UserStore>,
        cars: Arc<dyn CarStore>,
        jwt: &JwtConfig,
        upload: &UploadConfig,
    ) -> Self {
        Self {
            db_pool,
            credentials: CredentialService::new(users, JwtService::new(jwt)),
            stager: Stager::new(upload),
            ingestor: Ingestor::new(cars.clone(), upload.cleanup),
            cars,
        }
    }
}
