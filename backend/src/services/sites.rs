//! Site table: per-location base metrics and moisture thresholds.
//!
//! Built once at start-up and shared read-only between calls.

use std::collections::BTreeMap;

use shared::Location;

use crate::config::{Config, SiteConfig};
use crate::error::{AppError, AppResult};

/// Base values the generators offset from, for one location
#[derive(Debug, Clone, PartialEq)]
pub struct SiteProfile {
    pub location: Location,
    pub base_temperature: f64,
    pub base_humidity: f64,
    pub base_wind_speed: f64,
    pub moisture_threshold: Option<f64>,
}

/// Lookup table keyed by normalized location
#[derive(Debug, Clone)]
pub struct SiteTable {
    sites: BTreeMap<Location, SiteProfile>,
}

impl SiteTable {
    /// Dublin, Cork and Wicklow with their stock bases and thresholds
    pub fn builtin() -> Self {
        let entries = [
            ("Dublin", 15.0, 40.0, 5.0, 30.0),
            ("Cork", 10.0, 50.0, 7.0, 35.0),
            ("Wicklow", 20.0, 60.0, 6.0, 40.0),
        ];

        let sites = entries
            .into_iter()
            .filter_map(|(name, temp, humidity, wind, threshold)| {
                let location = Location::parse(name).ok()?;
                Some((
                    location.clone(),
                    SiteProfile {
                        location,
                        base_temperature: temp,
                        base_humidity: humidity,
                        base_wind_speed: wind,
                        moisture_threshold: Some(threshold),
                    },
                ))
            })
            .collect();

        Self { sites }
    }

    /// Table from configuration, falling back to the built-in sites
    pub fn from_config(config: &Config) -> AppResult<Self> {
        if config.sites.is_empty() {
            return Ok(Self::builtin());
        }
        Self::from_sites(&config.sites)
    }

    pub fn from_sites(entries: &[SiteConfig]) -> AppResult<Self> {
        let mut sites = BTreeMap::new();
        for entry in entries {
            entry
                .validate_bases()
                .map_err(|e| AppError::Configuration(e.to_string()))?;
            let location = Location::parse(&entry.name)
                .map_err(|e| AppError::Configuration(format!("site name: {}", e)))?;
            let profile = SiteProfile {
                location: location.clone(),
                base_temperature: entry.base_temperature,
                base_humidity: entry.base_humidity,
                base_wind_speed: entry.base_wind_speed,
                moisture_threshold: entry.moisture_threshold,
            };
            if sites.insert(location.clone(), profile).is_some() {
                return Err(AppError::Configuration(format!(
                    "site '{}' is configured more than once",
                    location
                )));
            }
        }
        Ok(Self { sites })
    }

    /// Profile for a known location
    pub fn profile(&self, location: &Location) -> AppResult<&SiteProfile> {
        self.sites
            .get(location)
            .ok_or_else(|| AppError::UnknownLocation(location.to_string()))
    }

    /// Configured moisture threshold, if the location has one
    pub fn moisture_threshold(&self, location: &Location) -> Option<f64> {
        self.sites.get(location).and_then(|p| p.moisture_threshold)
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

impl Default for SiteTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(raw: &str) -> Location {
        Location::parse(raw).unwrap()
    }

    #[test]
    fn test_builtin_sites() {
        let table = SiteTable::builtin();
        assert_eq!(table.len(), 3);
        assert_eq!(table.profile(&loc("Cork")).unwrap().base_temperature, 10.0);
        assert_eq!(table.moisture_threshold(&loc("wicklow")), Some(40.0));
    }

    #[test]
    fn test_unknown_location() {
        let table = SiteTable::builtin();
        match table.profile(&loc("Galway")) {
            Err(AppError::UnknownLocation(name)) => assert_eq!(name, "Galway"),
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(table.moisture_threshold(&loc("Galway")), None);
    }

    #[test]
    fn test_config_sites_are_normalized() {
        let entries = vec![SiteConfig {
            name: "  galway ".into(),
            base_temperature: 12.0,
            base_humidity: 55.0,
            base_wind_speed: 9.0,
            moisture_threshold: None,
        }];
        let table = SiteTable::from_sites(&entries).unwrap();
        assert!(table.profile(&loc("GALWAY")).is_ok());
        assert_eq!(table.moisture_threshold(&loc("Galway")), None);
    }

    #[test]
    fn test_duplicate_sites_rejected() {
        let site = |name: &str| SiteConfig {
            name: name.into(),
            base_temperature: 12.0,
            base_humidity: 55.0,
            base_wind_speed: 9.0,
            moisture_threshold: Some(30.0),
        };
        let entries = vec![site("Cork"), site("CORK")];
        assert!(matches!(
            SiteTable::from_sites(&entries),
            Err(AppError::Configuration(_))
        ));
    }

    #[test]
    fn test_non_finite_base_rejected() {
        let entries = vec![SiteConfig {
            name: "Galway".into(),
            base_temperature: f64::NAN,
            base_humidity: 55.0,
            base_wind_speed: 9.0,
            moisture_threshold: None,
        }];
        assert!(matches!(
            SiteTable::from_sites(&entries),
            Err(AppError::Configuration(ref msg)) if msg.contains("base_temperature")
        ));
    }

    #[test]
    fn test_empty_config_falls_back_to_builtin() {
        let table = SiteTable::from_config(&Config::default()).unwrap();
        assert_eq!(table.len(), 3);
    }
}
