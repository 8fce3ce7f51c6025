//! Crop monitoring models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::Location;

/// Coarse crop health grade
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum HealthStatus {
    Good,
    Fair,
    Poor,
}

impl HealthStatus {
    pub const ALL: [HealthStatus; 3] = [HealthStatus::Good, HealthStatus::Fair, HealthStatus::Poor];
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Good => write!(f, "Good"),
            HealthStatus::Fair => write!(f, "Fair"),
            HealthStatus::Poor => write!(f, "Poor"),
        }
    }
}

/// Crop health assessment for a field
#[derive(Debug, Clone, Serialize)]
pub struct CropHealthResult {
    pub field_id: Location,
    pub health_status: HealthStatus,
    /// Display line, e.g. "Health at Cork: Fair"
    pub summary: String,
    pub recommendation: String,
}

/// Pest detection result for a field
#[derive(Debug, Clone, Serialize)]
pub struct PestResult {
    pub field_id: Location,
    pub pests_detected: bool,
    pub pest_type: String,
    /// Display line, e.g. "Pest at Cork: Aphids"
    pub summary: String,
    pub recommendation: String,
}

/// Query accepted by the unary crop monitoring endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldQuery {
    #[serde(default)]
    pub field_id: String,
}

/// One inbound message on the duplex health monitor
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CropHealthObservation {
    #[serde(default)]
    #[validate(length(min = 1, message = "field_id is required"))]
    pub field_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_at: Option<DateTime<Utc>>,

    /// Opaque observation body
    #[serde(default)]
    pub readings: serde_json::Value,
}

/// One outbound message on the duplex health monitor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CropHealthRecommendation {
    /// Position of the answered observation within the call, starting at 1
    pub sequence: u64,
    pub field_id: String,
    pub health_status: HealthStatus,
    pub recommendation: String,
}

/// Crop health and pest detection as shown by the display layer
#[derive(Debug, Clone, Serialize)]
pub struct CropOverview {
    pub crop_health: CropHealthResult,
    pub pest_detection: PestResult,
}
