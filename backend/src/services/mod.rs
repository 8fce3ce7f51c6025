//! Business logic services for the Smart Agriculture backend

pub mod crop_monitor;
pub mod irrigation;
pub mod metrics;
pub mod sensor_stream;
pub mod sites;
pub mod weather;

pub use crop_monitor::{CropMonitoringService, HealthAdvice, HealthPolicy, MaintainCurrentCare};
pub use irrigation::{DecisionEngine, IrrigationService};
pub use sites::{SiteProfile, SiteTable};
pub use weather::WeatherService;

use shared::Location;

use crate::error::{AppError, AppResult};

/// Canonical location normalization applied at every entry point
pub fn normalize_location(field: &str, raw: &str) -> AppResult<Location> {
    Location::parse(raw).map_err(|e| AppError::invalid(field, e))
}
