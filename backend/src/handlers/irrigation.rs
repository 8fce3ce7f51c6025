//! HTTP handlers for the Irrigation service

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    Json,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{
    IrrigationOutcome, SensorDatum, StartIrrigationRequest, StopIrrigationRequest, StreamSummary,
};
use crate::ndjson;
use crate::services::IrrigationService;
use crate::AppState;

/// StartIrrigation
pub async fn start_irrigation(
    State(state): State<AppState>,
    input: Result<Json<StartIrrigationRequest>, JsonRejection>,
) -> AppResult<Json<IrrigationOutcome>> {
    let Json(input) = input?;
    let outcome = IrrigationService::new(&state).start(input).await?;
    Ok(Json(outcome))
}

/// StopIrrigation
pub async fn stop_irrigation(
    State(state): State<AppState>,
    input: Result<Json<StopIrrigationRequest>, JsonRejection>,
) -> AppResult<Json<IrrigationOutcome>> {
    let Json(input) = input?;
    let outcome = IrrigationService::new(&state).stop(input).await?;
    Ok(Json(outcome))
}

/// ReceiveSensorData: NDJSON request body in, one summary out
pub async fn receive_sensor_data(
    State(state): State<AppState>,
    body: Body,
) -> AppResult<Json<StreamSummary>> {
    let call_id = Uuid::new_v4();
    tracing::info!(%call_id, "Sensor stream opened");

    let data = ndjson::decode_body::<SensorDatum>(body);
    let summary = IrrigationService::new(&state)
        .receive_sensor_data(call_id, data)
        .await?;
    Ok(Json(summary))
}
