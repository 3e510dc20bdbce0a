//! Input validation helpers
//!
//! Centralized text length constants and validation functions.

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: product, category, etc.
pub const MAX_NAME_LEN: usize = 200;

/// Product descriptions
pub const MAX_DESCRIPTION_LEN: usize = 2000;

/// Search terms (substring match on name)
pub const MAX_SEARCH_LEN: usize = 200;

/// URLs / image paths
pub const MAX_URL_LEN: usize = 2048;

// ── Numeric limits ──────────────────────────────────────────────────

/// Cart line quantity hard ceiling, independent of stock
pub const MAX_QUANTITY: u32 = 999;

// ── Validation helpers (CRUD handlers) ──────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Validate that a price is finite and non-negative.
pub fn validate_price(value: f64, field: &str) -> Result<(), AppError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::validation(format!(
            "{field} must be a non-negative number"
        )));
    }
    Ok(())
}

/// Validate a cart line quantity (positive, below the hard ceiling).
pub fn validate_quantity(value: u32, field: &str) -> Result<(), AppError> {
    if value == 0 {
        return Err(AppError::validation(format!("{field} must be at least 1")));
    }
    if value > MAX_QUANTITY {
        return Err(AppError::validation(format!(
            "{field} must not exceed {MAX_QUANTITY}"
        )));
    }
    Ok(())
}
