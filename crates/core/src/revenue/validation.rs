//! Input validation for revenue commands.
//!
//! Values arrive as `Decimal`, so NaN and infinities cannot reach this layer.

use neutron_shared::types::to_cents;
use rust_decimal::Decimal;

use super::error::RevenueError;

/// Maximum length of any revenue title.
pub const MAX_TITLE_LENGTH: usize = 30;

/// Maximum length of a revenue or ticket description.
pub const MAX_DESCRIPTION_LENGTH: usize = 250;

/// Checks a title is non-blank and at most [`MAX_TITLE_LENGTH`] characters.
pub fn validate_title(title: &str) -> Result<(), RevenueError> {
    let length = title.chars().count();
    if title.trim().is_empty() || length > MAX_TITLE_LENGTH {
        return Err(RevenueError::InvalidTitle {
            max: MAX_TITLE_LENGTH,
        });
    }
    Ok(())
}

/// Checks a value is non-negative and storable as cents.
pub fn validate_value(value: Decimal) -> Result<(), RevenueError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(RevenueError::NegativeValue);
    }
    if to_cents(value).is_none() {
        return Err(RevenueError::ValueOutOfRange);
    }
    Ok(())
}

/// Checks an optional description length.
pub fn validate_description(description: Option<&str>) -> Result<(), RevenueError> {
    match description {
        Some(text) if text.chars().count() > MAX_DESCRIPTION_LENGTH => {
            Err(RevenueError::InvalidDescription {
                max: MAX_DESCRIPTION_LENGTH,
            })
        }
        _ => Ok(()),
    }
}
