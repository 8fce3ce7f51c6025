//! Weather service: unary readings and the update feed

use std::sync::Arc;
use std::time::Duration;

use futures::Stream;
use shared::{HumidityReading, Location, WeatherOverview, WeatherReading, WindReading};

use crate::config::WeatherConfig;
use crate::error::AppResult;
use crate::services::{
    metrics::{self, MetricKind},
    sites::SiteTable,
};
use crate::simulation::{Entropy, RandomSource};
use crate::AppState;

/// Weather service for simulated readings
#[derive(Clone)]
pub struct WeatherService {
    sites: Arc<SiteTable>,
    entropy: Arc<dyn Entropy>,
    feed_updates: u32,
    feed_interval: Duration,
}

impl WeatherService {
    /// Create a new WeatherService instance
    pub fn new(state: &AppState) -> Self {
        Self::with_parts(state.sites.clone(), state.entropy.clone(), &state.config.weather)
    }

    pub fn with_parts(sites: Arc<SiteTable>, entropy: Arc<dyn Entropy>, feed: &WeatherConfig) -> Self {
        Self {
            sites,
            entropy,
            feed_updates: feed.stream_updates,
            feed_interval: Duration::from_millis(feed.stream_interval_ms),
        }
    }

    /// GetTemperature
    pub async fn get_temperature(&self, location: &Location) -> AppResult<WeatherReading> {
        metrics::generate_as(
            MetricKind::Temperature,
            &self.sites,
            location,
            self.entropy.source().as_mut(),
        )
    }

    /// GetHumidity
    pub async fn get_humidity(&self, location: &Location) -> AppResult<HumidityReading> {
        metrics::generate_as(
            MetricKind::Humidity,
            &self.sites,
            location,
            self.entropy.source().as_mut(),
        )
    }

    /// GetWindInfo
    pub async fn get_wind(&self, location: &Location) -> AppResult<WindReading> {
        metrics::generate_as(
            MetricKind::Wind,
            &self.sites,
            location,
            self.entropy.source().as_mut(),
        )
    }

    /// All three readings, requested concurrently and joined
    pub async fn get_overview(&self, location: &Location) -> AppResult<WeatherOverview> {
        let (temperature, humidity, wind) = tokio::try_join!(
            self.get_temperature(location),
            self.get_humidity(location),
            self.get_wind(location),
        )?;

        Ok(WeatherOverview {
            temperature,
            humidity,
            wind,
        })
    }

    /// StreamWeatherUpdates: a bounded feed of temperature readings.
    ///
    /// Fails up front for an unknown location so no partial feed is started.
    pub fn update_feed(
        &self,
        location: Location,
    ) -> AppResult<impl Stream<Item = AppResult<WeatherReading>> + Send + 'static> {
        self.sites.profile(&location)?;

        let sites = self.sites.clone();
        let total = self.feed_updates;
        let interval = self.feed_interval;
        let rng: Box<dyn RandomSource> = self.entropy.source();

        tracing::debug!(%location, total, "Starting weather update feed");

        Ok(futures::stream::unfold(
            (0u32, rng),
            move |(sent, mut rng)| {
                let sites = sites.clone();
                let location = location.clone();
                async move {
                    if sent >= total {
                        return None;
                    }
                    if sent > 0 && !interval.is_zero() {
                        tokio::time::sleep(interval).await;
                    }
                    let reading: AppResult<WeatherReading> = metrics::generate_as(
                        MetricKind::Temperature,
                        &sites,
                        &location,
                        rng.as_mut(),
                    );
                    Some((reading, (sent + 1, rng)))
                }
            },
        ))
    }
}
