//! Hex color values for billboard text and product colors.

use core::fmt;

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HexColorError {
    #[error("color must start with '#'")]
    MissingHash,
    #[error("color must be #rgb or #rrggbb")]
    InvalidLength,
    #[error("color contains a non-hex digit")]
    InvalidDigit,
}

/// A CSS hex color, `#rgb` or `#rrggbb`.
///
/// Digits are accepted in either case and stored exactly as given.
///
/// ```
/// use storeroom_core::HexColor;
///
/// assert!(HexColor::parse("#FFF").is_ok());
/// assert!(HexColor::parse("#1a2B3c").is_ok());
/// assert!(HexColor::parse("red").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(String);

impl HexColor {
    /// Black, the default billboard text color.
    #[must_use]
    pub fn black() -> Self {
        Self("#000000".to_owned())
    }

    /// # Errors
    ///
    /// Returns an error unless the input is `#` followed by three or six
    /// hex digits.
    pub fn parse(s: &str) -> Result<Self, HexColorError> {
        let s = s.trim();
        let digits = s.strip_prefix('#').ok_or(HexColorError::MissingHash)?;
        if digits.len() != 3 && digits.len() != 6 {
            return Err(HexColorError::InvalidLength);
        }
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(HexColorError::InvalidDigit);
        }
        Ok(Self(s.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl core::str::FromStr for HexColor {
    type Err = HexColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for HexColor {
    type Error = HexColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for HexColor {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for HexColor {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self::parse(&s)?)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for HexColor {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_short_and_long_forms() {
        assert_eq!(HexColor::parse("#abc").unwrap().as_str(), "#abc");
        assert_eq!(HexColor::parse("#00FF7f").unwrap().as_str(), "#00FF7f");
        assert_eq!(HexColor::black().as_str(), "#000000");
    }

    #[test]
    fn test_rejects_bad_values() {
        assert_eq!(HexColor::parse("abc"), Err(HexColorError::MissingHash));
        assert_eq!(HexColor::parse("#abcd"), Err(HexColorError::InvalidLength));
        assert_eq!(HexColor::parse("#"), Err(HexColorError::InvalidLength));
        assert_eq!(HexColor::parse("#ggg"), Err(HexColorError::InvalidDigit));
    }

    #[test]
    fn test_deserialize_validates() {
        assert!(serde_json::from_str::<HexColor>("\"#123456\"").is_ok());
        assert!(serde_json::from_str::<HexColor>("\"blue\"").is_err());
    }
}
