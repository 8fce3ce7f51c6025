//! HTTP handlers for the CropMonitoring service

use axum::{
    body::Body,
    extract::{rejection::QueryRejection, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppResult, ErrorResponse};
use crate::models::{
    CropHealthObservation, CropHealthRecommendation, CropHealthResult, FieldQuery, PestResult,
};
use crate::ndjson;
use crate::services::{normalize_location, CropMonitoringService};
use crate::AppState;

/// One outbound line of the duplex monitor
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MonitorFrame {
    Recommendation(CropHealthRecommendation),
    Error(ErrorResponse),
}

/// GetCropHealth
pub async fn get_crop_health(
    State(state): State<AppState>,
    query: Result<Query<FieldQuery>, QueryRejection>,
) -> AppResult<Json<CropHealthResult>> {
    let Query(query) = query?;
    let location = normalize_location("field_id", &query.field_id)?;
    let result = CropMonitoringService::new(&state).get_crop_health(&location).await?;
    Ok(Json(result))
}

/// GetPestDetection
pub async fn get_pest_detection(
    State(state): State<AppState>,
    query: Result<Query<FieldQuery>, QueryRejection>,
) -> AppResult<Json<PestResult>> {
    let Query(query) = query?;
    let location = normalize_location("field_id", &query.field_id)?;
    let result = CropMonitoringService::new(&state).get_pest_detection(&location).await?;
    Ok(Json(result))
}

/// MonitorCropHealthBidirectional: NDJSON observations in, NDJSON
/// recommendations out, one line per observation
pub async fn monitor_crop_health(State(state): State<AppState>, body: Body) -> Response {
    let call_id = Uuid::new_v4();
    tracing::info!(%call_id, "Crop health monitor opened");

    let inbound = ndjson::decode_body::<CropHealthObservation>(body);
    let outbound = CropMonitoringService::new(&state)
        .monitor(call_id, inbound)
        .map(|answer| match answer {
            Ok(recommendation) => MonitorFrame::Recommendation(recommendation),
            Err(e) => {
                e.log();
                MonitorFrame::Error(e.to_response_body())
            }
        });

    (
        [(header::CONTENT_TYPE, ndjson::CONTENT_TYPE)],
        ndjson::encode(outbound),
    )
        .into_response()
}
