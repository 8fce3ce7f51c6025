//! Route definitions for the Smart Agriculture backend

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/weather", weather_routes())
        .nest("/irrigation", irrigation_routes())
        .nest("/crop-monitoring", crop_monitoring_routes())
        .nest("/dashboard", dashboard_routes())
}

/// Weather service routes
fn weather_routes() -> Router<AppState> {
    Router::new()
        .route("/temperature", get(handlers::get_temperature))
        .route("/humidity", get(handlers::get_humidity))
        .route("/wind", get(handlers::get_wind_info))
        // Server-sent events
        .route("/updates", get(handlers::stream_weather_updates))
}

/// Irrigation service routes
fn irrigation_routes() -> Router<AppState> {
    Router::new()
        .route("/start", post(handlers::start_irrigation))
        .route("/stop", post(handlers::stop_irrigation))
        // NDJSON request body
        .route("/sensor-data", post(handlers::receive_sensor_data))
}

/// Crop monitoring service routes
fn crop_monitoring_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::get_crop_health))
        .route("/pests", get(handlers::get_pest_detection))
        // NDJSON in, NDJSON out
        .route("/monitor", post(handlers::monitor_crop_health))
}

/// Aggregated views for the display layer
fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/weather", get(handlers::weather_overview))
        .route("/irrigation", get(handlers::irrigation_overview))
        .route("/crop-health", get(handlers::crop_overview))
}
