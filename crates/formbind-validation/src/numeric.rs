//! Numeric validation functions

use std::fmt::Display;

/// Validates minimum value for numeric types
pub fn validate_min<T: PartialOrd + Display>(value: T, min: T) -> Result<(), String> {
    if value >= min {
        Ok(())
    } else {
        Err(format!("Must be at least {}", min))
    }
}

/// Validates maximum value for numeric types
pub fn validate_max<T: PartialOrd + Display>(value: T, max: T) -> Result<(), String> {
    if value <= max {
        Ok(())
    } else {
        Err(format!("Must be at most {}", max))
    }
}

pub fn validate_range<T: PartialOrd + Display>(value: T, min: T, max: T) -> Result<(), String> {
    if value >= min && value <= max {
        Ok(())
    } else {
        Err(format!("Must be between {} and {}", min, max))
    }
}

/// Strictly greater than zero
pub fn validate_positive(value: f64) -> Result<(), String> {
    if value > 0.0 {
        Ok(())
    } else {
        Err("Must be a positive number".to_string())
    }
}

/// True for finite numbers with no fractional part
pub fn is_integral(value: f64) -> bool {
    value.is_finite() && value.fract() == 0.0
}
