//! Crop monitoring: unary health/pest checks and the duplex health monitor

use std::sync::Arc;

use futures::{Stream, StreamExt};
use shared::{
    CropHealthObservation, CropHealthRecommendation, CropHealthResult, CropOverview, HealthStatus,
    Location, PestResult,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppResult;
use crate::services::{
    metrics::{self, MetricKind},
    normalize_location,
    sites::SiteTable,
};
use crate::simulation::Entropy;
use crate::AppState;

/// Advice returned by a [`HealthPolicy`] for one observation
#[derive(Debug, Clone, PartialEq)]
pub struct HealthAdvice {
    pub health_status: HealthStatus,
    pub recommendation: String,
}

/// Maps one observation to one piece of advice.
///
/// The duplex exchange only depends on this trait, so a real health model can
/// replace the default without changing the protocol.
pub trait HealthPolicy: Send + Sync {
    fn respond(&self, observation: &CropHealthObservation) -> HealthAdvice;
}

/// Answers every observation with "Good / Maintain current care"
#[derive(Debug, Default, Clone, Copy)]
pub struct MaintainCurrentCare;

impl HealthPolicy for MaintainCurrentCare {
    fn respond(&self, _observation: &CropHealthObservation) -> HealthAdvice {
        HealthAdvice {
            health_status: HealthStatus::Good,
            recommendation: "Maintain current care".to_string(),
        }
    }
}

/// Per-call context of one duplex exchange
struct MonitorContext {
    call_id: Uuid,
    answered: u64,
    policy: Arc<dyn HealthPolicy>,
    finished: bool,
}

impl MonitorContext {
    fn answer(&mut self, observation: &CropHealthObservation) -> AppResult<CropHealthRecommendation> {
        observation.validate()?;
        let field = normalize_location("field_id", &observation.field_id)?;

        let advice = self.policy.respond(observation);
        self.answered += 1;
        tracing::debug!(call_id = %self.call_id, sequence = self.answered, %field, "Received crop health data");

        Ok(CropHealthRecommendation {
            sequence: self.answered,
            field_id: field.to_string(),
            health_status: advice.health_status,
            recommendation: advice.recommendation,
        })
    }
}

/// Crop monitoring service
#[derive(Clone)]
pub struct CropMonitoringService {
    sites: Arc<SiteTable>,
    entropy: Arc<dyn Entropy>,
    policy: Arc<dyn HealthPolicy>,
}

impl CropMonitoringService {
    /// Create a new CropMonitoringService instance
    pub fn new(state: &AppState) -> Self {
        Self::with_parts(state.sites.clone(), state.entropy.clone(), state.health_policy.clone())
    }

    pub fn with_parts(
        sites: Arc<SiteTable>,
        entropy: Arc<dyn Entropy>,
        policy: Arc<dyn HealthPolicy>,
    ) -> Self {
        Self {
            sites,
            entropy,
            policy,
        }
    }

    /// GetCropHealth
    pub async fn get_crop_health(&self, location: &Location) -> AppResult<CropHealthResult> {
        metrics::generate_as(
            MetricKind::CropHealth,
            &self.sites,
            location,
            self.entropy.source().as_mut(),
        )
    }

    /// GetPestDetection
    pub async fn get_pest_detection(&self, location: &Location) -> AppResult<PestResult> {
        metrics::generate_as(
            MetricKind::PestDetection,
            &self.sites,
            location,
            self.entropy.source().as_mut(),
        )
    }

    /// Health and pest checks, requested concurrently and joined
    pub async fn get_overview(&self, location: &Location) -> AppResult<CropOverview> {
        let (crop_health, pest_detection) = tokio::try_join!(
            self.get_crop_health(location),
            self.get_pest_detection(location),
        )?;

        Ok(CropOverview {
            crop_health,
            pest_detection,
        })
    }

    /// MonitorCropHealthBidirectional.
    ///
    /// Strictly one-in-one-out and in order. When the inbound side ends the
    /// outbound side ends after the last answer. An inbound error or an
    /// invalid observation is forwarded as the final item.
    pub fn monitor<S>(
        &self,
        call_id: Uuid,
        inbound: S,
    ) -> impl Stream<Item = AppResult<CropHealthRecommendation>> + Send + 'static
    where
        S: Stream<Item = AppResult<CropHealthObservation>> + Send + 'static,
    {
        let context = MonitorContext {
            call_id,
            answered: 0,
            policy: self.policy.clone(),
            finished: false,
        };

        futures::stream::unfold(
            (Box::pin(inbound), context),
            |(mut inbound, mut context)| async move {
                if context.finished {
                    return None;
                }
                match inbound.next().await {
                    Some(Ok(observation)) => {
                        let answer = context.answer(&observation);
                        if answer.is_err() {
                            context.finished = true;
                        }
                        Some((answer, (inbound, context)))
                    }
                    Some(Err(e)) => {
                        tracing::warn!(call_id = %context.call_id, answered = context.answered, "Crop health stream failed: {}", e);
                        context.finished = true;
                        Some((Err(e), (inbound, context)))
                    }
                    None => {
                        tracing::info!(call_id = %context.call_id, answered = context.answered, "Crop health stream closed");
                        None
                    }
                }
            },
        )
    }
}
