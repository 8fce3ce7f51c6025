//! Irrigation control models

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::Location;
use crate::validation::MAX_IRRIGATION_MINUTES;

/// Structured counterpart to the free-text outcome message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IrrigationDecision {
    Continue,
    Skip,
}

/// Why the engine reached its decision
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    LowMoisture,
    ScheduledHour,
    LowMoistureAndScheduledHour,
    MoistureAdequate,
    StopRequested,
}

/// Where the moisture threshold came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdSource {
    /// Threshold configured for this location
    Configured,
    /// Location has no threshold; the service-wide default was applied
    Default,
}

/// Result of an irrigation command
#[derive(Debug, Clone, Serialize)]
pub struct IrrigationOutcome {
    /// Command accepted. Always true: commands are fire-and-forget.
    pub success: bool,
    pub message: String,
    pub decision: IrrigationDecision,
    pub reason: DecisionReason,
    pub location: Location,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soil_moisture: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold_source: Option<ThresholdSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_hour: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u32>,
}

/// Input for StartIrrigation
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct StartIrrigationRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "field_id is required"))]
    pub field_id: String,

    /// Minutes; the configured default is used when absent
    #[validate(range(min = 1, max = 1440, message = "duration must be between 1 and 1440 minutes"))]
    pub duration: Option<u32>,
}

/// Input for StopIrrigation
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct StopIrrigationRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "field_id is required"))]
    pub field_id: String,
}

/// One reading on the inbound sensor stream
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct SensorDatum {
    #[serde(default)]
    #[validate(length(min = 1, message = "field_id is required"))]
    pub field_id: String,

    /// Opaque reading body; the collector does not inspect it
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Summary produced once the sensor stream has ended
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreamSummary {
    pub success: bool,
    pub message: String,
    pub count: u64,
    /// Last field seen on the stream, empty when no data arrived
    pub location: String,
}

/// Start and stop outcomes as shown by the display layer
#[derive(Debug, Clone, Serialize)]
pub struct IrrigationOverview {
    pub start_irrigation: IrrigationOutcome,
    pub stop_irrigation: IrrigationOutcome,
}
