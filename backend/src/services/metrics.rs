//! Simulated metric generators.
//!
//! Each generator is a pure function of the site table, a location and an
//! injected random source. Unknown locations fail with
//! [`AppError::UnknownLocation`]; no numeric reading is ever produced for them.

use shared::{
    CompassDirection, CropHealthResult, HealthStatus, HumidityReading, Location, PestResult,
    Trend, WeatherReading, WindReading,
};

use crate::error::{AppError, AppResult};
use crate::services::sites::SiteTable;
use crate::simulation::RandomSource;

/// Spread added on top of each base value
const TEMPERATURE_SPREAD: f64 = 10.0;
const HUMIDITY_SPREAD: f64 = 40.0;
const WIND_SPREAD: f64 = 5.0;

/// Readings above this are reported as rising
const RISING_ABOVE_CELSIUS: i32 = 22;

const PEST_TYPE: &str = "Aphids";

/// Which reading to generate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Temperature,
    Humidity,
    Wind,
    CropHealth,
    PestDetection,
}

/// Any generated reading
#[derive(Debug, Clone)]
pub enum Reading {
    Temperature(WeatherReading),
    Humidity(HumidityReading),
    Wind(WindReading),
    CropHealth(CropHealthResult),
    PestDetection(PestResult),
}

/// Generate one reading of the given kind
pub fn generate(
    kind: MetricKind,
    sites: &SiteTable,
    location: &Location,
    rng: &mut dyn RandomSource,
) -> AppResult<Reading> {
    Ok(match kind {
        MetricKind::Temperature => Reading::Temperature(temperature(sites, location, rng)?),
        MetricKind::Humidity => Reading::Humidity(humidity(sites, location, rng)?),
        MetricKind::Wind => Reading::Wind(wind(sites, location, rng)?),
        MetricKind::CropHealth => Reading::CropHealth(crop_health(sites, location, rng)?),
        MetricKind::PestDetection => Reading::PestDetection(pest_detection(sites, location, rng)?),
    })
}

fn temperature(
    sites: &SiteTable,
    location: &Location,
    rng: &mut dyn RandomSource,
) -> AppResult<WeatherReading> {
    let profile = sites.profile(location)?;
    let temperature = offset(profile.base_temperature, TEMPERATURE_SPREAD, rng);
    let trend = if temperature > RISING_ABOVE_CELSIUS {
        Trend::Rising
    } else {
        Trend::Falling
    };

    Ok(WeatherReading {
        location: location.clone(),
        temperature,
        trend,
    })
}

fn humidity(
    sites: &SiteTable,
    location: &Location,
    rng: &mut dyn RandomSource,
) -> AppResult<HumidityReading> {
    let profile = sites.profile(location)?;
    Ok(HumidityReading {
        location: location.clone(),
        humidity_level: offset(profile.base_humidity, HUMIDITY_SPREAD, rng),
    })
}

fn wind(
    sites: &SiteTable,
    location: &Location,
    rng: &mut dyn RandomSource,
) -> AppResult<WindReading> {
    let profile = sites.profile(location)?;
    let wind_speed = offset(profile.base_wind_speed, WIND_SPREAD, rng);
    let wind_direction = *pick(&CompassDirection::ALL, rng);

    Ok(WindReading {
        location: location.clone(),
        wind_speed,
        wind_direction,
    })
}

fn crop_health(
    sites: &SiteTable,
    location: &Location,
    rng: &mut dyn RandomSource,
) -> AppResult<CropHealthResult> {
    sites.profile(location)?;
    let health_status = *pick(&HealthStatus::ALL, rng);
    let recommendation = match health_status {
        HealthStatus::Poor => "Inspect for pests or diseases",
        HealthStatus::Good | HealthStatus::Fair => "No action needed",
    };

    Ok(CropHealthResult {
        field_id: location.clone(),
        health_status,
        summary: format!("Health at {}: {}", location, health_status),
        recommendation: recommendation.to_string(),
    })
}

fn pest_detection(
    sites: &SiteTable,
    location: &Location,
    rng: &mut dyn RandomSource,
) -> AppResult<PestResult> {
    sites.profile(location)?;
    let pests_detected = rng.next_unit() > 0.5;
    let (pest_type, recommendation) = if pests_detected {
        (PEST_TYPE, "Apply organic pesticides")
    } else {
        ("None", "No action needed")
    };

    Ok(PestResult {
        field_id: location.clone(),
        pests_detected,
        pest_type: pest_type.to_string(),
        summary: format!("Pest at {}: {}", location, pest_type),
        recommendation: recommendation.to_string(),
    })
}

/// Generate one reading and unwrap it as the concrete type its kind produces
pub fn generate_as<T>(
    kind: MetricKind,
    sites: &SiteTable,
    location: &Location,
    rng: &mut dyn RandomSource,
) -> AppResult<T>
where
    T: TryFrom<Reading, Error = AppError>,
{
    generate(kind, sites, location, rng)?.try_into()
}

macro_rules! reading_conversion {
    ($variant:ident, $reading:ty) => {
        impl TryFrom<Reading> for $reading {
            type Error = AppError;

            fn try_from(reading: Reading) -> Result<Self, Self::Error> {
                match reading {
                    Reading::$variant(inner) => Ok(inner),
                    other => Err(AppError::Internal(format!(
                        "expected {} reading, generated {:?}",
                        stringify!($variant),
                        other.kind()
                    ))),
                }
            }
        }
    };
}

reading_conversion!(Temperature, WeatherReading);
reading_conversion!(Humidity, HumidityReading);
reading_conversion!(Wind, WindReading);
reading_conversion!(CropHealth, CropHealthResult);
reading_conversion!(PestDetection, PestResult);

impl Reading {
    pub fn kind(&self) -> MetricKind {
        match self {
            Reading::Temperature(_) => MetricKind::Temperature,
            Reading::Humidity(_) => MetricKind::Humidity,
            Reading::Wind(_) => MetricKind::Wind,
            Reading::CropHealth(_) => MetricKind::CropHealth,
            Reading::PestDetection(_) => MetricKind::PestDetection,
        }
    }
}

fn offset(base: f64, spread: f64, rng: &mut dyn RandomSource) -> i32 {
    (base + rng.next_unit() * spread).round() as i32
}

fn pick<'a, T>(options: &'a [T], rng: &mut dyn RandomSource) -> &'a T {
    let index = (rng.next_unit() * options.len() as f64) as usize;
    &options[index.min(options.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::FixedSource;

    fn loc(raw: &str) -> Location {
        Location::parse(raw).unwrap()
    }

    fn fixed(value: f64) -> FixedSource {
        FixedSource::new(value)
    }

    #[test]
    fn test_temperature_at_zero_sample_equals_base() {
        let sites = SiteTable::builtin();
        for (name, base) in [("Dublin", 15), ("Cork", 10), ("Wicklow", 20)] {
            let reading = temperature(&sites, &loc(name), &mut fixed(0.0)).unwrap();
            assert_eq!(reading.temperature, base);
            assert_eq!(reading.trend, Trend::Falling);
        }
    }

    #[test]
    fn test_temperature_trend_rising_above_22() {
        let sites = SiteTable::builtin();
        // Wicklow: 20 + 0.5 * 10 = 25
        let reading = temperature(&sites, &loc("Wicklow"), &mut fixed(0.5)).unwrap();
        assert_eq!(reading.temperature, 25);
        assert_eq!(reading.trend, Trend::Rising);

        // Wicklow: 20 + 0.2 * 10 = 22 is not rising
        let reading = temperature(&sites, &loc("Wicklow"), &mut fixed(0.2)).unwrap();
        assert_eq!(reading.temperature, 22);
        assert_eq!(reading.trend, Trend::Falling);
    }

    #[test]
    fn test_humidity_and_wind_offsets() {
        let sites = SiteTable::builtin();
        let humidity_reading = humidity(&sites, &loc("Cork"), &mut fixed(0.5)).unwrap();
        assert_eq!(humidity_reading.humidity_level, 70);

        let wind_reading = wind(&sites, &loc("Dublin"), &mut fixed(0.0)).unwrap();
        assert_eq!(wind_reading.wind_speed, 5);
        assert_eq!(wind_reading.wind_direction, CompassDirection::N);

        let wind_reading = wind(&sites, &loc("Dublin"), &mut fixed(0.99)).unwrap();
        assert_eq!(wind_reading.wind_direction, CompassDirection::Nw);
    }

    #[test]
    fn test_crop_health_recommendation_follows_status() {
        let sites = SiteTable::builtin();
        let good = crop_health(&sites, &loc("Cork"), &mut fixed(0.0)).unwrap();
        assert_eq!(good.health_status, HealthStatus::Good);
        assert_eq!(good.recommendation, "No action needed");
        assert_eq!(good.summary, "Health at Cork: Good");

        let poor = crop_health(&sites, &loc("Cork"), &mut fixed(0.9)).unwrap();
        assert_eq!(poor.health_status, HealthStatus::Poor);
        assert_eq!(poor.recommendation, "Inspect for pests or diseases");
    }

    #[test]
    fn test_pest_detection_mirrors_detection() {
        let sites = SiteTable::builtin();
        let clear = pest_detection(&sites, &loc("Dublin"), &mut fixed(0.5)).unwrap();
        assert!(!clear.pests_detected);
        assert_eq!(clear.pest_type, "None");
        assert_eq!(clear.recommendation, "No action needed");

        let infested = pest_detection(&sites, &loc("Dublin"), &mut fixed(0.75)).unwrap();
        assert!(infested.pests_detected);
        assert_eq!(infested.pest_type, "Aphids");
        assert_eq!(infested.recommendation, "Apply organic pesticides");
        assert_eq!(infested.summary, "Pest at Dublin: Aphids");
    }

    #[test]
    fn test_every_kind_rejects_unknown_location() {
        let sites = SiteTable::builtin();
        let kinds = [
            MetricKind::Temperature,
            MetricKind::Humidity,
            MetricKind::Wind,
            MetricKind::CropHealth,
            MetricKind::PestDetection,
        ];
        for kind in kinds {
            let result = generate(kind, &sites, &loc("Atlantis"), &mut fixed(0.3));
            assert!(
                matches!(result, Err(AppError::UnknownLocation(ref name)) if name == "Atlantis"),
                "{:?} did not reject unknown location",
                kind
            );
        }
    }

    #[test]
    fn test_generate_dispatches_by_kind() {
        let sites = SiteTable::builtin();
        let reading = generate(MetricKind::Humidity, &sites, &loc("Dublin"), &mut fixed(0.0)).unwrap();
        match reading {
            Reading::Humidity(h) => assert_eq!(h.humidity_level, 40),
            other => panic!("unexpected reading: {:?}", other),
        }
    }

    #[test]
    fn test_generate_as_checks_kind() {
        let sites = SiteTable::builtin();
        let wind_reading: WindReading =
            generate_as(MetricKind::Wind, &sites, &loc("Cork"), &mut fixed(0.0)).unwrap();
        assert_eq!(wind_reading.wind_speed, 7);

        let mismatch: AppResult<WindReading> =
            generate_as(MetricKind::Humidity, &sites, &loc("Cork"), &mut fixed(0.0));
        assert!(matches!(mismatch, Err(AppError::Internal(_))));
    }
}
