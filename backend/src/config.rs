//! Configuration management for the Smart Agriculture services
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with AGRI_ prefix

use config::{ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Irrigation decision configuration
    pub irrigation: IrrigationConfig,

    /// Weather update feed configuration
    pub weather: WeatherConfig,

    /// Simulation randomness
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// Site table override; the built-in sites are used when empty
    #[serde(default)]
    pub sites: Vec<SiteConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IrrigationConfig {
    /// Hour of day (0-23) at which irrigation always continues
    pub scheduled_hour: u32,

    /// Threshold applied to locations without one of their own
    pub default_moisture_threshold: f64,

    /// Run length used when StartIrrigation omits a duration
    pub default_duration_minutes: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    /// Readings sent per StreamWeatherUpdates call
    pub stream_updates: u32,

    /// Delay between streamed readings
    pub stream_interval_ms: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SimulationConfig {
    /// Fixed seed for reproducible readings
    pub seed: Option<u64>,
}

/// One entry of the site table
#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    pub name: String,
    pub base_temperature: f64,
    pub base_humidity: f64,
    pub base_wind_speed: f64,
    pub moisture_threshold: Option<f64>,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("AGRI_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 50051)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("irrigation.scheduled_hour", 6)?
            .set_default("irrigation.default_moisture_threshold", 30.0)?
            .set_default("irrigation.default_duration_minutes", 30)?
            .set_default("weather.stream_updates", 3)?
            .set_default("weather.stream_interval_ms", 1000)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (AGRI_ prefix)
            .add_source(
                Environment::with_prefix("AGRI")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the services cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        shared::validate_hour(self.irrigation.scheduled_hour)
            .map_err(|e| ConfigError::Message(format!("irrigation.scheduled_hour: {}", e)))?;
        shared::validate_moisture_threshold(self.irrigation.default_moisture_threshold).map_err(
            |e| ConfigError::Message(format!("irrigation.default_moisture_threshold: {}", e)),
        )?;
        if self.irrigation.default_duration_minutes == 0
            || self.irrigation.default_duration_minutes > shared::MAX_IRRIGATION_MINUTES
        {
            return Err(ConfigError::Message(
                "irrigation.default_duration_minutes must be between 1 and 1440".into(),
            ));
        }
        for site in &self.sites {
            site.validate_bases()?;
            if let Some(threshold) = site.moisture_threshold {
                shared::validate_moisture_threshold(threshold).map_err(|e| {
                    ConfigError::Message(format!("sites[{}].moisture_threshold: {}", site.name, e))
                })?;
            }
        }
        Ok(())
    }

    /// Socket address string the listener binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl SiteConfig {
    /// Reject non-finite base values
    pub fn validate_bases(&self) -> Result<(), ConfigError> {
        let bases = [
            ("base_temperature", self.base_temperature),
            ("base_humidity", self.base_humidity),
            ("base_wind_speed", self.base_wind_speed),
        ];
        for (key, value) in bases {
            if !value.is_finite() {
                return Err(ConfigError::Message(format!(
                    "sites[{}].{}: must be a finite number",
                    self.name, key
                )));
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            server: ServerConfig::default(),
            irrigation: IrrigationConfig::default(),
            weather: WeatherConfig::default(),
            simulation: SimulationConfig::default(),
            sites: Vec::new(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 50051,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for IrrigationConfig {
    fn default() -> Self {
        Self {
            scheduled_hour: 6,
            default_moisture_threshold: 30.0,
            default_duration_minutes: 30,
        }
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            stream_updates: 3,
            stream_interval_ms: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bind_address(), "0.0.0.0:50051");
    }

    #[test]
    fn test_scheduled_hour_out_of_range_rejected() {
        let mut config = Config::default();
        config.irrigation.scheduled_hour = 24;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_site_threshold_out_of_range_rejected() {
        let mut config = Config::default();
        config.sites.push(SiteConfig {
            name: "Galway".into(),
            base_temperature: 12.0,
            base_humidity: 55.0,
            base_wind_speed: 9.0,
            moisture_threshold: Some(140.0),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_finite_site_base_rejected() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let mut config = Config::default();
            config.sites.push(SiteConfig {
                name: "Galway".into(),
                base_temperature: 12.0,
                base_humidity: bad,
                base_wind_speed: 9.0,
                moisture_threshold: None,
            });
            let err = config.validate().unwrap_err().to_string();
            assert!(err.contains("base_humidity"), "{}", err);
        }
    }

    #[test]
    fn test_env_overrides_use_single_underscore_prefix() {
        std::env::set_var("AGRI_SERVER__PORT", "4321");
        std::env::set_var("AGRI_WEATHER__STREAM_UPDATES", "7");
        let config = Config::load();
        std::env::remove_var("AGRI_SERVER__PORT");
        std::env::remove_var("AGRI_WEATHER__STREAM_UPDATES");

        let config = config.unwrap();
        assert_eq!(config.server.port, 4321);
        assert_eq!(config.weather.stream_updates, 7);
    }

    #[test]
    fn test_zero_default_duration_rejected() {
        let mut config = Config::default();
        config.irrigation.default_duration_minutes = 0;
        assert!(config.validate().is_err());
    }
}
