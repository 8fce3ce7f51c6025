//! Validation utilities for the Smart Agriculture services

// ============================================================================
// Irrigation Validations
// ============================================================================

/// Longest irrigation run accepted by StartIrrigation, in minutes
pub const MAX_IRRIGATION_MINUTES: u32 = 1440;

/// Validate a soil moisture reading is a percentage
pub fn validate_soil_moisture(moisture: f64) -> Result<(), &'static str> {
    if !moisture.is_finite() {
        return Err("Soil moisture must be a finite number");
    }
    if !(0.0..=100.0).contains(&moisture) {
        return Err("Soil moisture must be between 0 and 100%");
    }
    Ok(())
}

/// Validate an hour of day (0-23)
pub fn validate_hour(hour: u32) -> Result<(), &'static str> {
    if hour > 23 {
        return Err("Hour must be between 0 and 23");
    }
    Ok(())
}

/// Validate a moisture threshold is a usable percentage
pub fn validate_moisture_threshold(threshold: f64) -> Result<(), &'static str> {
    if !threshold.is_finite() || !(0.0..=100.0).contains(&threshold) {
        return Err("Moisture threshold must be between 0 and 100%");
    }
    Ok(())
}

// ============================================================================
// Formatting
// ============================================================================

/// Format a 24-hour clock hour as "6 AM", "12 PM", etc.
pub fn format_hour_12(hour: u32) -> String {
    match hour {
        0 => "12 AM".to_string(),
        1..=11 => format!("{} AM", hour),
        12 => "12 PM".to_string(),
        _ => format!("{} PM", hour - 12),
    }
}
