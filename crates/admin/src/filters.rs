//! Display formatting for console listings.

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use storeroom_core::{CurrencyCode, Price};

/// English ordinal suffix for a day of the month.
#[must_use]
pub const fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

/// Long date as shown in the console, e.g. `January 1st, 2024`.
#[must_use]
pub fn long_date(at: &DateTime<Utc>) -> String {
    format!(
        "{} {}{}, {}",
        at.format("%B"),
        at.day(),
        ordinal_suffix(at.day()),
        at.year()
    )
}

/// Amount in the store currency with en-US grouping, e.g. `$1,234.50`.
#[must_use]
pub fn money(amount: Decimal, currency: CurrencyCode) -> String {
    Price::new(amount, currency).display()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_ordinal_suffix() {
        assert_eq!(ordinal_suffix(1), "st");
        assert_eq!(ordinal_suffix(2), "nd");
        assert_eq!(ordinal_suffix(3), "rd");
        assert_eq!(ordinal_suffix(4), "th");
        assert_eq!(ordinal_suffix(11), "th");
        assert_eq!(ordinal_suffix(12), "th");
        assert_eq!(ordinal_suffix(13), "th");
        assert_eq!(ordinal_suffix(21), "st");
        assert_eq!(ordinal_suffix(22), "nd");
        assert_eq!(ordinal_suffix(31), "st");
    }

    #[test]
    fn test_long_date() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(long_date(&at), "January 1st, 2024");
        let at = Utc.with_ymd_and_hms(2025, 3, 23, 0, 0, 0).unwrap();
        assert_eq!(long_date(&at), "March 23rd, 2025");
    }

    #[test]
    fn test_money() {
        assert_eq!(money(Decimal::new(123_450, 2), CurrencyCode::USD), "$1,234.50");
        assert_eq!(money(Decimal::ZERO, CurrencyCode::USD), "$0.00");
        assert_eq!(money(Decimal::new(99_900, 2), CurrencyCode::EUR), "€999.00");
        assert_eq!(money(Decimal::new(1_000_000, 2), CurrencyCode::GBP), "£10,000.00");
    }
}
