//! Client-streaming sensor collector.
//!
//! Each ReceiveSensorData call owns one [`SensorCollector`]. It moves
//! `Open -> Receiving -> Closed`, counts data points and remembers the
//! active location. The active location is last-write-wins: a stream that
//! mixes fields is summarized under whichever field arrived last.

use futures::{Stream, StreamExt};
use shared::{Location, SensorDatum, StreamSummary};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::normalize_location;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorState {
    Open,
    Receiving,
    Closed,
}

/// Per-call accumulation context
#[derive(Debug)]
pub struct SensorCollector {
    call_id: Uuid,
    state: CollectorState,
    count: u64,
    active_location: Option<Location>,
}

impl SensorCollector {
    pub fn new(call_id: Uuid) -> Self {
        Self {
            call_id,
            state: CollectorState::Open,
            count: 0,
            active_location: None,
        }
    }

    pub fn state(&self) -> CollectorState {
        self.state
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn active_location(&self) -> Option<&Location> {
        self.active_location.as_ref()
    }

    /// Account for one inbound datum
    pub fn record(&mut self, datum: &SensorDatum) -> AppResult<()> {
        if self.state == CollectorState::Closed {
            return Err(AppError::Internal(
                "sensor collector received data after close".into(),
            ));
        }
        datum.validate()?;
        let location = normalize_location("field_id", &datum.field_id)?;

        self.state = CollectorState::Receiving;
        self.count += 1;
        tracing::debug!(call_id = %self.call_id, count = self.count, %location, "Received sensor data");
        self.active_location = Some(location);
        Ok(())
    }

    /// Close the stream and produce its summary. Only succeeds once.
    pub fn finish(&mut self) -> AppResult<StreamSummary> {
        if self.state == CollectorState::Closed {
            return Err(AppError::Internal("sensor collector already closed".into()));
        }
        self.state = CollectorState::Closed;

        let location = self
            .active_location
            .as_ref()
            .map(|l| l.to_string())
            .unwrap_or_default();

        tracing::info!(call_id = %self.call_id, count = self.count, %location, "Sensor stream closed");

        Ok(StreamSummary {
            success: true,
            message: format!("Received {} data points for {}.", self.count, location),
            count: self.count,
            location,
        })
    }
}

/// Drain a sensor stream into its summary.
///
/// The first inbound error fails the call with that error; no partial summary
/// is produced. Dropping the returned future (client cancellation) drops the
/// collector without emitting anything.
pub async fn collect<S>(call_id: Uuid, data: S) -> AppResult<StreamSummary>
where
    S: Stream<Item = AppResult<SensorDatum>>,
{
    let mut collector = SensorCollector::new(call_id);
    let mut data = std::pin::pin!(data);

    while let Some(item) = data.next().await {
        match item {
            Ok(datum) => collector.record(&datum)?,
            Err(e) => {
                tracing::warn!(
                    call_id = %call_id,
                    received = collector.count(),
                    "Sensor stream failed: {}",
                    e
                );
                return Err(e);
            }
        }
    }

    collector.finish()
}
