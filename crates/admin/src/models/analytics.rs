//! Dashboard aggregates.

use rust_decimal::Decimal;
use serde::Serialize;

use storeroom_core::CurrencyCode;

use crate::filters::money;

/// Abbreviated month names, January first.
pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyRevenue {
    pub name: &'static str,
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_revenue: Decimal,
    pub formatted_revenue: String,
    pub sales_count: i64,
    pub stock_count: i64,
    pub monthly_revenue: Vec<MonthlyRevenue>,
}

impl DashboardStats {
    #[must_use]
    pub fn new(
        total_revenue: Decimal,
        sales_count: i64,
        stock_count: i64,
        monthly_revenue: Vec<MonthlyRevenue>,
        currency: CurrencyCode,
    ) -> Self {
        Self {
            total_revenue,
            formatted_revenue: money(total_revenue, currency),
            sales_count,
            stock_count,
            monthly_revenue,
        }
    }
}

/// Spread `(month, total)` pairs, months numbered 1 to 12, over a full
/// year. Months without revenue are zero; out-of-range months are ignored.
#[must_use]
pub fn monthly_series(totals: &[(u32, Decimal)]) -> Vec<MonthlyRevenue> {
    let mut series: Vec<MonthlyRevenue> = MONTH_NAMES
        .iter()
        .map(|&name| MonthlyRevenue {
            name,
            total: Decimal::ZERO,
        })
        .collect();
    for &(month, total) in totals {
        let slot = usize::try_from(month)
            .ok()
            .and_then(|m| m.checked_sub(1))
            .and_then(|i| series.get_mut(i));
        if let Some(entry) = slot {
            entry.total += total;
        }
    }
    series
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monthly_series_fills_gaps() {
        let series = monthly_series(&[(1, Decimal::new(1000, 2)), (12, Decimal::new(5, 0))]);
        assert_eq!(series.len(), 12);
        assert_eq!(series.first().map(|m| (m.name, m.total)), Some(("Jan", Decimal::new(1000, 2))));
        assert_eq!(series.get(5).map(|m| m.total), Some(Decimal::ZERO));
        assert_eq!(series.last().map(|m| (m.name, m.total)), Some(("Dec", Decimal::new(5, 0))));
    }

    #[test]
    fn test_monthly_series_ignores_bad_months() {
        let series = monthly_series(&[(0, Decimal::ONE), (13, Decimal::ONE)]);
        assert!(series.iter().all(|m| m.total.is_zero()));
    }

    #[test]
    fn test_formatted_revenue() {
        let series = monthly_series(&[]);
        let stats = DashboardStats::new(Decimal::new(123_450, 2), 3, 7, series, CurrencyCode::USD);
        assert_eq!(stats.formatted_revenue, "$1,234.50");

        let stats = DashboardStats::new(Decimal::new(123_450, 2), 3, 7, vec![], CurrencyCode::EUR);
        assert_eq!(stats.formatted_revenue, "€1,234.50");
    }
}
