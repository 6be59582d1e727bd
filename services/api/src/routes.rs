//! API service routes

use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, State, multipart::MultipartRejection,
        rejection::JsonRejection,
    },
    http::{HeaderValue, Method, StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use common::config::ServerConfig;
use ingest::{CarInput, current_year};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    upload::receive_csv,
};

/// Room for multipart boundaries and headers on top of the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let csv_routes = Router::new()
        .route("/", get(csv_status))
        .route("/upload", post(upload_csv))
        .route("/process", post(process_csv))
        .route("/cars", get(list_cars).post(create_car))
        .layer(DefaultBodyLimit::max(
            state.stager.max_bytes() + MULTIPART_OVERHEAD,
        ));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/csv", csv_routes)
        .nest(
            "/api/auth",
            auth::routes::create_router(state.credentials.clone()),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Credentialed CORS for the configured UI origins
pub fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::COOKIE])
        .allow_credentials(true)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = common::database::health_check(&state.db_pool).await;

    Json(json!({
        "status": "ok",
        "service": "carstock-api",
        "database": database,
    }))
}

pub async fn csv_status() -> impl IntoResponse {
    Json(json!({ "message": "CSV upload API is running" }))
}

/// Every stored car, unpaginated
pub async fn list_cars(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let cars = state.cars.list_all().await.map_err(ApiError::FetchCars)?;
    Ok(Json(cars))
}

/// Stage a CSV file without processing it
pub async fn upload_csv(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<impl IntoResponse> {
    let multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let staged = receive_csv(&state.stager, multipart).await?;
    info!(
        "Uploaded {:?} as {}",
        staged.original_filename,
        staged.filename()
    );

    Ok(Json(json!({
        "message": "File uploaded successfully!",
        "filename": staged.filename(),
        "originalname": staged.original_filename,
        "path": staged.storage_path.display().to_string(),
    })))
}

/// Stage a CSV file and import its rows
pub async fn process_csv(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<impl IntoResponse> {
    let multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let staged = receive_csv(&state.stager, multipart).await?;
    info!("Processing upload {:?}", staged.original_filename);

    let report = state.ingestor.ingest(&staged.storage_path).await?;

    Ok(Json(json!({
        "message": "CSV data uploaded and stored successfully!",
        "count": report.inserted,
    })))
}

/// Store one manually entered car
pub async fn create_car(
    State(state): State<AppState>,
    payload: Result<Json<CarInput>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(input) = payload.map_err(|e| {
        ApiError::BadRequest(format!("Data validation failed: {}", e.body_text()))
    })?;

    let car = input.validate(current_year())?;
    let stored = state.cars.insert_one(&car).await?;
    info!("Added car {}", stored.id);

    Ok((StatusCode::CREATED, Json(stored)))
}
