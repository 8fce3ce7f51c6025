//! Irrigation control: the decision engine and the service wrapping it

use std::sync::Arc;

use futures::Stream;
use shared::{
    format_hour_12, validate_hour, validate_soil_moisture, DecisionReason, IrrigationDecision,
    IrrigationOutcome, Location, SensorDatum, StartIrrigationRequest, StopIrrigationRequest,
    StreamSummary, ThresholdSource,
};
use uuid::Uuid;
use validator::Validate;

use crate::config::IrrigationConfig;
use crate::error::{AppError, AppResult};
use crate::services::{normalize_location, sensor_stream, sites::SiteTable};
use crate::simulation::{Clock, Entropy};
use crate::AppState;

/// Decides whether irrigation should run for a location.
///
/// Continues iff soil moisture is below the location's threshold or the
/// current hour is the scheduled irrigation hour.
#[derive(Clone)]
pub struct DecisionEngine {
    sites: Arc<SiteTable>,
    scheduled_hour: u32,
    default_threshold: f64,
}

impl DecisionEngine {
    pub fn new(sites: Arc<SiteTable>, config: &IrrigationConfig) -> Self {
        Self {
            sites,
            scheduled_hour: config.scheduled_hour,
            default_threshold: config.default_moisture_threshold,
        }
    }

    /// Moisture threshold for a location and whether it was configured.
    ///
    /// Locations without a threshold get the service-wide default; this is
    /// reported in the outcome and logged so a misspelled field is visible.
    pub fn threshold_for(&self, location: &Location) -> (f64, ThresholdSource) {
        match self.sites.moisture_threshold(location) {
            Some(threshold) => (threshold, ThresholdSource::Configured),
            None => {
                tracing::warn!(
                    %location,
                    default = self.default_threshold,
                    "No moisture threshold for location, applying default"
                );
                (self.default_threshold, ThresholdSource::Default)
            }
        }
    }

    pub fn decide(
        &self,
        location: &Location,
        soil_moisture: f64,
        current_hour: u32,
    ) -> AppResult<IrrigationOutcome> {
        validate_soil_moisture(soil_moisture).map_err(|e| AppError::invalid("soil_moisture", e))?;
        validate_hour(current_hour).map_err(|e| AppError::invalid("current_hour", e))?;

        let (threshold, threshold_source) = self.threshold_for(location);
        let low_moisture = soil_moisture < threshold;
        let scheduled = current_hour == self.scheduled_hour;

        let (decision, reason) = match (low_moisture, scheduled) {
            (true, true) => (IrrigationDecision::Continue, DecisionReason::LowMoistureAndScheduledHour),
            (true, false) => (IrrigationDecision::Continue, DecisionReason::LowMoisture),
            (false, true) => (IrrigationDecision::Continue, DecisionReason::ScheduledHour),
            (false, false) => (IrrigationDecision::Skip, DecisionReason::MoistureAdequate),
        };

        let (headline, rationale) = match decision {
            IrrigationDecision::Continue => (
                "Irrigation started.",
                "Continuing due to low soil moisture or scheduled time.",
            ),
            IrrigationDecision::Skip => (
                "Irrigation not started.",
                "Irrigation may not be necessary at this time.",
            ),
        };

        let message = format!(
            "{} Location: {}, Current Soil Moisture: {}%, Scheduled Irrigation Time: {}, Current Time: {}. {}",
            headline,
            location,
            soil_moisture.round() as i64,
            format_hour_12(self.scheduled_hour),
            format_hour_12(current_hour),
            rationale
        );

        tracing::debug!(
            %location,
            soil_moisture,
            threshold,
            current_hour,
            ?decision,
            ?reason,
            "Irrigation decision"
        );

        Ok(IrrigationOutcome {
            success: true,
            message,
            decision,
            reason,
            location: location.clone(),
            soil_moisture: Some(soil_moisture),
            threshold: Some(threshold),
            threshold_source: Some(threshold_source),
            current_hour: Some(current_hour),
            duration_minutes: None,
        })
    }

    /// Confirm a stop request.
    ///
    /// Run state is not tracked, so this cannot tell whether irrigation was
    /// actually running at the location.
    pub fn stop(&self, location: &Location) -> IrrigationOutcome {
        IrrigationOutcome {
            success: true,
            message: format!("Irrigation stopped at {}.", location),
            decision: IrrigationDecision::Skip,
            reason: DecisionReason::StopRequested,
            location: location.clone(),
            soil_moisture: None,
            threshold: None,
            threshold_source: None,
            current_hour: None,
            duration_minutes: None,
        }
    }
}

/// Irrigation service for start/stop commands and sensor ingestion
#[derive(Clone)]
pub struct IrrigationService {
    engine: DecisionEngine,
    entropy: Arc<dyn Entropy>,
    clock: Arc<dyn Clock>,
    default_duration_minutes: u32,
}

impl IrrigationService {
    /// Create a new IrrigationService instance
    pub fn new(state: &AppState) -> Self {
        Self {
            engine: DecisionEngine::new(state.sites.clone(), &state.config.irrigation),
            entropy: state.entropy.clone(),
            clock: state.clock.clone(),
            default_duration_minutes: state.config.irrigation.default_duration_minutes,
        }
    }

    /// StartIrrigation: sample soil moisture, read the clock, decide
    pub async fn start(&self, input: StartIrrigationRequest) -> AppResult<IrrigationOutcome> {
        input.validate()?;
        let location = normalize_location("field_id", &input.field_id)?;

        let soil_moisture = self.entropy.source().next_unit() * 100.0;
        let current_hour = self.clock.current_hour();

        let mut outcome = self.engine.decide(&location, soil_moisture, current_hour)?;
        outcome.duration_minutes = Some(input.duration.unwrap_or(self.default_duration_minutes));

        tracing::info!(
            %location,
            decision = ?outcome.decision,
            duration_minutes = outcome.duration_minutes,
            "Irrigation start requested"
        );
        Ok(outcome)
    }

    /// StopIrrigation
    pub async fn stop(&self, input: StopIrrigationRequest) -> AppResult<IrrigationOutcome> {
        input.validate()?;
        let location = normalize_location("field_id", &input.field_id)?;

        tracing::info!(%location, "Irrigation stop requested");
        Ok(self.engine.stop(&location))
    }

    /// ReceiveSensorData: drain the inbound stream into one summary
    pub async fn receive_sensor_data<S>(&self, call_id: Uuid, data: S) -> AppResult<StreamSummary>
    where
        S: Stream<Item = AppResult<SensorDatum>>,
    {
        sensor_stream::collect(call_id, data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> DecisionEngine {
        DecisionEngine::new(Arc::new(SiteTable::builtin()), &IrrigationConfig::default())
    }

    fn loc(raw: &str) -> Location {
        Location::parse(raw).unwrap()
    }

    #[test]
    fn test_low_moisture_continues() {
        let outcome = engine().decide(&loc("Cork"), 20.0, 14).unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.decision, IrrigationDecision::Continue);
        assert_eq!(outcome.reason, DecisionReason::LowMoisture);
        assert_eq!(outcome.threshold, Some(35.0));
        assert_eq!(outcome.threshold_source, Some(ThresholdSource::Configured));
        assert_eq!(
            outcome.message,
            "Irrigation started. Location: Cork, Current Soil Moisture: 20%, \
             Scheduled Irrigation Time: 6 AM, Current Time: 2 PM. \
             Continuing due to low soil moisture or scheduled time."
        );
    }

    #[test]
    fn test_scheduled_hour_continues_when_wet() {
        let outcome = engine().decide(&loc("Dublin"), 90.0, 6).unwrap();
        assert_eq!(outcome.decision, IrrigationDecision::Continue);
        assert_eq!(outcome.reason, DecisionReason::ScheduledHour);
    }

    #[test]
    fn test_both_conditions() {
        let outcome = engine().decide(&loc("Dublin"), 5.0, 6).unwrap();
        assert_eq!(outcome.reason, DecisionReason::LowMoistureAndScheduledHour);
    }

    #[test]
    fn test_adequate_moisture_skips() {
        let outcome = engine().decide(&loc("Wicklow"), 40.0, 0).unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.decision, IrrigationDecision::Skip);
        assert!(outcome.message.starts_with("Irrigation not started."));
        assert!(outcome.message.contains("Current Time: 12 AM"));
        assert!(outcome.message.ends_with("Irrigation may not be necessary at this time."));
    }

    #[test]
    fn test_unknown_location_uses_explicit_default() {
        let outcome = engine().decide(&loc("Galway"), 29.0, 12).unwrap();
        assert_eq!(outcome.threshold, Some(30.0));
        assert_eq!(outcome.threshold_source, Some(ThresholdSource::Default));
        assert_eq!(outcome.decision, IrrigationDecision::Continue);
    }

    #[test]
    fn test_moisture_is_rounded_in_message() {
        let outcome = engine().decide(&loc("Cork"), 67.6, 9).unwrap();
        assert!(outcome.message.contains("Current Soil Moisture: 68%"));
    }

    #[test]
    fn test_out_of_range_inputs_rejected() {
        assert!(matches!(
            engine().decide(&loc("Cork"), 101.0, 9),
            Err(AppError::InvalidRequest { ref field, .. }) if field == "soil_moisture"
        ));
        assert!(matches!(
            engine().decide(&loc("Cork"), 50.0, 24),
            Err(AppError::InvalidRequest { ref field, .. }) if field == "current_hour"
        ));
    }

    #[test]
    fn test_stop_always_succeeds() {
        let outcome = engine().stop(&loc("cork"));
        assert!(outcome.success);
        assert_eq!(outcome.message, "Irrigation stopped at Cork.");
        assert_eq!(outcome.reason, DecisionReason::StopRequested);
    }
}
