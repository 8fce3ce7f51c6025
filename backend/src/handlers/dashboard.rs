//! JSON aggregation for the display layer

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};

use crate::error::AppResult;
use crate::models::{
    CropOverview, IrrigationOverview, LocationQuery, StartIrrigationRequest,
    StopIrrigationRequest, WeatherOverview,
};
use crate::services::{normalize_location, CropMonitoringService, IrrigationService, WeatherService};
use crate::AppState;

/// Temperature, humidity and wind in one response
pub async fn weather_overview(
    State(state): State<AppState>,
    query: Result<Query<LocationQuery>, QueryRejection>,
) -> AppResult<Json<WeatherOverview>> {
    let Query(query) = query?;
    let location = normalize_location("location", &query.location)?;
    let overview = WeatherService::new(&state).get_overview(&location).await?;
    Ok(Json(overview))
}

/// Start then stop irrigation, as the dashboard's irrigation panel shows
pub async fn irrigation_overview(
    State(state): State<AppState>,
    query: Result<Query<LocationQuery>, QueryRejection>,
) -> AppResult<Json<IrrigationOverview>> {
    let Query(query) = query?;
    let service = IrrigationService::new(&state);

    let start_irrigation = service
        .start(StartIrrigationRequest {
            field_id: query.location.clone(),
            duration: None,
        })
        .await?;
    let stop_irrigation = service
        .stop(StopIrrigationRequest {
            field_id: query.location,
        })
        .await?;

    Ok(Json(IrrigationOverview {
        start_irrigation,
        stop_irrigation,
    }))
}

/// Crop health and pest detection in one response
pub async fn crop_overview(
    State(state): State<AppState>,
    query: Result<Query<LocationQuery>, QueryRejection>,
) -> AppResult<Json<CropOverview>> {
    let Query(query) = query?;
    let location = normalize_location("location", &query.location)?;
    let overview = CropMonitoringService::new(&state).get_overview(&location).await?;
    Ok(Json(overview))
}
