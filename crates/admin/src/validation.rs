//! Request body validation helpers.
//!
//! Request payloads deserialize into structs of `Option` fields so a missing
//! value produces `Missing field 'x'` instead of a serde rejection. These
//! helpers turn those options into validated values.

use rust_decimal::Decimal;
use storeroom_core::{HexColor, Rating};
use thiserror::Error;
use url::Url;

/// Minimum length for store, billboard and category names.
pub const MIN_NAME_LENGTH: usize = 3;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing field '{0}'")]
    Missing(&'static str),
    #[error("Field '{field}' must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },
    #[error("Field '{0}' must be an http(s) URL")]
    InvalidUrl(&'static str),
    #[error("Field '{field}' is invalid: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// A non-blank string, trimmed.
pub fn required_text(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(ValidationError::Missing(field))
}

/// Optional free text: blank becomes `None`.
#[must_use]
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// A required name of at least [`MIN_NAME_LENGTH`] characters.
pub fn name(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    let value = required_text(value, field)?;
    if value.chars().count() < MIN_NAME_LENGTH {
        return Err(ValidationError::TooShort {
            field,
            min: MIN_NAME_LENGTH,
        });
    }
    Ok(value)
}

/// Check that `value` is an absolute http or https URL.
pub fn http_url(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let url = Url::parse(value.trim()).map_err(|_| ValidationError::InvalidUrl(field))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ValidationError::InvalidUrl(field));
    }
    Ok(value.trim().to_string())
}

pub fn required_url(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    http_url(&required_text(value, field)?, field)
}

pub fn optional_url(value: Option<String>, field: &'static str) -> Result<Option<String>, ValidationError> {
    optional_text(value)
        .map(|v| http_url(&v, field))
        .transpose()
}

pub fn hex_color(value: Option<String>, field: &'static str) -> Result<HexColor, ValidationError> {
    let raw = required_text(value, field)?;
    HexColor::parse(&raw).map_err(|e| ValidationError::Invalid {
        field,
        reason: e.to_string(),
    })
}

/// 10^10: prices must stay below this to fit the `NUMERIC(12, 2)` column.
pub const PRICE_LIMIT: Decimal = Decimal::from_parts(1_410_065_408, 2, 0, false, 0);

/// A strictly positive price below [`PRICE_LIMIT`], rounded to cents.
pub fn price(value: Option<Decimal>, field: &'static str) -> Result<Decimal, ValidationError> {
    let price = value.ok_or(ValidationError::Missing(field))?.round_dp(2);
    if price <= Decimal::ZERO {
        return Err(ValidationError::Invalid {
            field,
            reason: "must be greater than 0".to_string(),
        });
    }
    if price >= PRICE_LIMIT {
        return Err(ValidationError::Invalid {
            field,
            reason: format!("must be less than {PRICE_LIMIT}"),
        });
    }
    Ok(price)
}

pub fn inventory(value: Option<i32>, field: &'static str) -> Result<Option<i32>, ValidationError> {
    match value {
        Some(n) if n < 0 => Err(ValidationError::Invalid {
            field,
            reason: "cannot be negative".to_string(),
        }),
        other => Ok(other),
    }
}

pub fn rating(value: Option<i64>, field: &'static str) -> Result<Rating, ValidationError> {
    let raw = value.ok_or(ValidationError::Missing(field))?;
    Rating::new(raw).map_err(|e| ValidationError::Invalid {
        field,
        reason: e.to_string(),
    })
}

/// Merge an id list with an optional single id, dropping duplicates and
/// keeping first-seen order.
#[must_use]
pub fn merge_ids<T: PartialEq + Copy>(list: Option<Vec<T>>, single: Option<T>) -> Vec<T> {
    let mut merged: Vec<T> = Vec::new();
    for id in list.unwrap_or_default().into_iter().chain(single) {
        if !merged.contains(&id) {
            merged.push(id);
        }
    }
    merged
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_required_text_trims_and_rejects_blank() {
        assert_eq!(required_text(Some("  Shoes ".into()), "name").unwrap(), "Shoes");
        assert_eq!(
            required_text(Some("   ".into()), "name"),
            Err(ValidationError::Missing("name"))
        );
        assert_eq!(
            required_text(None, "name").unwrap_err().to_string(),
            "Missing field 'name'"
        );
    }

    #[test]
    fn test_name_minimum_length() {
        assert!(name(Some("Hat".into()), "name").is_ok());
        assert_eq!(
            name(Some("ab".into()), "label"),
            Err(ValidationError::TooShort {
                field: "label",
                min: 3
            })
        );
    }

    #[test]
    fn test_http_url() {
        assert!(http_url("https://cdn.test/a.png", "imageUrl").is_ok());
        assert!(http_url("ftp://cdn.test/a.png", "imageUrl").is_err());
        assert!(http_url("not a url", "imageUrl").is_err());
        assert_eq!(optional_url(Some(String::new()), "logoUrl").unwrap(), None);
    }

    #[test]
    fn test_price_and_inventory() {
        assert_eq!(
            price(Some(Decimal::new(1999, 2)), "price").unwrap(),
            Decimal::new(1999, 2)
        );
        assert!(price(Some(Decimal::ZERO), "price").is_err());
        assert!(price(Some(Decimal::new(1, 3)), "price").is_err());
        assert_eq!(
            price(Some(Decimal::new(999_999_999_999, 2)), "price").unwrap(),
            Decimal::new(999_999_999_999, 2)
        );
        assert_eq!(
            price(Some(Decimal::new(9_999_999_999_995, 3)), "price")
                .unwrap_err()
                .to_string(),
            "Field 'price' is invalid: must be less than 10000000000"
        );
        assert!(price(Some(Decimal::new(9_999_999_999_900, 2)), "price").is_err());
        assert_eq!(price(None, "price"), Err(ValidationError::Missing("price")));
        assert!(inventory(Some(-1), "inventory").is_err());
        assert_eq!(inventory(None, "inventory").unwrap(), None);
    }

    #[test]
    fn test_rating_and_color() {
        assert_eq!(rating(Some(5), "rating").unwrap().get(), 5);
        assert!(rating(Some(0), "rating").is_err());
        assert!(hex_color(Some("#fff".into()), "value").is_ok());
        assert!(matches!(
            hex_color(Some("blue".into()), "value"),
            Err(ValidationError::Invalid { field: "value", .. })
        ));
    }

    #[test]
    fn test_merge_ids() {
        assert_eq!(merge_ids(Some(vec![1, 2, 1]), Some(3)), vec![1, 2, 3]);
        assert_eq!(merge_ids(Some(vec![4]), Some(4)), vec![4]);
        assert_eq!(merge_ids::<u8>(None, None), Vec::<u8>::new());
    }
}
