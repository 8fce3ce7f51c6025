//! HTTP handlers for the Weather service

use std::convert::Infallible;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::{future, Stream, StreamExt};

use crate::error::{AppError, AppResult};
use crate::models::{HumidityReading, LocationQuery, WeatherReading, WindReading};
use crate::services::{normalize_location, WeatherService};
use crate::AppState;

/// GetTemperature
pub async fn get_temperature(
    State(state): State<AppState>,
    query: Result<Query<LocationQuery>, QueryRejection>,
) -> AppResult<Json<WeatherReading>> {
    let Query(query) = query?;
    let location = normalize_location("location", &query.location)?;
    let reading = WeatherService::new(&state).get_temperature(&location).await?;
    Ok(Json(reading))
}

/// GetHumidity
pub async fn get_humidity(
    State(state): State<AppState>,
    query: Result<Query<LocationQuery>, QueryRejection>,
) -> AppResult<Json<HumidityReading>> {
    let Query(query) = query?;
    let location = normalize_location("location", &query.location)?;
    let reading = WeatherService::new(&state).get_humidity(&location).await?;
    Ok(Json(reading))
}

/// GetWindInfo
pub async fn get_wind_info(
    State(state): State<AppState>,
    query: Result<Query<LocationQuery>, QueryRejection>,
) -> AppResult<Json<WindReading>> {
    let Query(query) = query?;
    let location = normalize_location("location", &query.location)?;
    let reading = WeatherService::new(&state).get_wind(&location).await?;
    Ok(Json(reading))
}

/// StreamWeatherUpdates as Server-Sent Events.
///
/// Each reading is a `weather` event; a failure mid-feed is sent as one
/// `error` event and ends the stream.
pub async fn stream_weather_updates(
    State(state): State<AppState>,
    query: Result<Query<LocationQuery>, QueryRejection>,
) -> AppResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let Query(query) = query?;
    let location = normalize_location("location", &query.location)?;
    let feed = WeatherService::new(&state).update_feed(location)?;

    let events = feed
        .scan(false, |failed, reading| {
            if *failed {
                return future::ready(None);
            }
            *failed = reading.is_err();
            future::ready(Some(reading))
        })
        .map(|reading| Ok(to_event(reading)));
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

fn to_event(reading: AppResult<WeatherReading>) -> Event {
    let (name, payload) = match reading {
        Ok(reading) => ("weather", serde_json::to_string(&reading)),
        Err(e) => {
            e.log();
            ("error", serde_json::to_string(&e.to_response_body()))
        }
    };

    match payload {
        Ok(data) => Event::default().event(name).data(data),
        Err(e) => {
            let err = AppError::Internal(format!("failed to encode weather event: {}", e));
            err.log();
            Event::default().event("error").data(err.to_string())
        }
    }
}
