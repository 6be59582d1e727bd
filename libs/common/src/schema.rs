//! Table bootstrap
//!
//! The service owns two flat tables. They are created at startup if missing;
//! there is no migration history.

use sqlx::PgPool;
use tracing::info;

use crate::error::{DatabaseError, DatabaseResult};

const CREATE_USERS: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id UUID PRIMARY KEY,
    username TEXT NOT NULL,
    email TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const CREATE_CARS: &str = r#"
CREATE TABLE IF NOT EXISTS cars (
    id UUID PRIMARY KEY,
    model_name TEXT NOT NULL,
    price DOUBLE PRECISION NOT NULL CHECK (price >= 0),
    manufacturing_year INTEGER NOT NULL,
    engine_capacity TEXT NOT NULL,
    spare_key TEXT NOT NULL,
    transmission TEXT NOT NULL,
    km_driven DOUBLE PRECISION NOT NULL CHECK (km_driven >= 0),
    ownership TEXT NOT NULL,
    fuel_type TEXT NOT NULL,
    imperfections TEXT NOT NULL,
    repainted_parts TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

/// Create the `users` and `cars` tables when they do not exist yet
pub async fn ensure_schema(pool: &PgPool) -> DatabaseResult<()> {
    for statement in [CREATE_USERS, CREATE_CARS] {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(DatabaseError::Schema)?;
    }

    info!("Database schema is up to date");
    Ok(())
}
