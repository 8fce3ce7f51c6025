//! Weather reading models

use serde::{Deserialize, Serialize};

use crate::types::{CompassDirection, Location, Trend};

/// Temperature reading for a location
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WeatherReading {
    pub location: Location,
    /// Degrees Celsius
    pub temperature: i32,
    pub trend: Trend,
}

/// Humidity reading for a location
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HumidityReading {
    pub location: Location,
    /// Relative humidity, percent
    pub humidity_level: i32,
}

/// Wind reading for a location
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WindReading {
    pub location: Location,
    /// km/h
    pub wind_speed: i32,
    pub wind_direction: CompassDirection,
}

/// Combined weather view assembled for the display layer
#[derive(Debug, Clone, Serialize)]
pub struct WeatherOverview {
    pub temperature: WeatherReading,
    pub humidity: HumidityReading,
    pub wind: WindReading,
}

/// Query accepted by every weather endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationQuery {
    #[serde(default)]
    pub location: String,
}
