//! Collection validation functions

pub fn validate_min_items<T>(items: &[T], min: usize) -> Result<(), String> {
    if items.len() >= min {
        Ok(())
    } else {
        Err(format!("Must have at least {} items", min))
    }
}

pub fn validate_max_items<T>(items: &[T], max: usize) -> Result<(), String> {
    if items.len() <= max {
        Ok(())
    } else {
        Err(format!("Must have at most {} items", max))
    }
}

/// Validates all items in collection are unique
///
/// Only needs `PartialEq`, so it works for values without an ordering
/// (e.g. JSON values). Quadratic, which is fine at form sizes.
pub fn validate_unique<T: PartialEq>(items: &[T]) -> Result<(), String> {
    for (i, item) in items.iter().enumerate() {
        if items[..i].contains(item) {
            return Err("All items must be unique".to_string());
        }
    }
    Ok(())
}
