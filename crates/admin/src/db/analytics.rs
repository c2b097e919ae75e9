//! Dashboard aggregates.

use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use storeroom_core::{CurrencyCode, StoreId};

use super::RepositoryError;
use crate::models::{DashboardStats, monthly_series};

/// Read-only aggregate queries over orders and products.
pub struct AnalyticsRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AnalyticsRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Sum of item prices over paid orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn total_revenue(&self, store_id: StoreId) -> Result<Decimal, RepositoryError> {
        let total: Decimal = sqlx::query_scalar(
            "SELECT COALESCE(SUM(oi.unit_price), 0) \
             FROM orders o JOIN order_item oi ON oi.order_id = o.id \
             WHERE o.store_id = $1 AND o.is_paid",
        )
        .bind(store_id)
        .fetch_one(self.pool)
        .await?;

        Ok(total)
    }

    /// Number of paid orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn sales_count(&self, store_id: StoreId) -> Result<i64, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE store_id = $1 AND is_paid")
                .bind(store_id)
                .fetch_one(self.pool)
                .await?;

        Ok(count)
    }

    /// Number of products on sale.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stock_count(&self, store_id: StoreId) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM product WHERE store_id = $1 AND NOT is_archived",
        )
        .bind(store_id)
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }

    /// Paid revenue per calendar month of `year`, as `(month, total)` with
    /// months numbered from 1. Months without sales are absent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn revenue_by_month(
        &self,
        store_id: StoreId,
        year: i32,
    ) -> Result<Vec<(u32, Decimal)>, RepositoryError> {
        let rows: Vec<(i32, Decimal)> = sqlx::query_as(
            "SELECT EXTRACT(MONTH FROM o.created_at AT TIME ZONE 'UTC')::int AS month, \
                    SUM(oi.unit_price) AS total \
             FROM orders o JOIN order_item oi ON oi.order_id = o.id \
             WHERE o.store_id = $1 AND o.is_paid \
               AND EXTRACT(YEAR FROM o.created_at AT TIME ZONE 'UTC')::int = $2 \
             GROUP BY month ORDER BY month",
        )
        .bind(store_id)
        .bind(year)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|(month, total)| {
                u32::try_from(month)
                    .map(|m| (m, total))
                    .map_err(|_| RepositoryError::DataCorruption(format!("invalid month {month}")))
            })
            .collect()
    }

    /// Everything the dashboard shows, for the current UTC year.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn dashboard(
        &self,
        store_id: StoreId,
        currency: CurrencyCode,
    ) -> Result<DashboardStats, RepositoryError> {
        let year = Utc::now().year();
        let (total, sales, stock, months) = tokio::try_join!(
            self.total_revenue(store_id),
            self.sales_count(store_id),
            self.stock_count(store_id),
            self.revenue_by_month(store_id, year),
        )?;

        Ok(DashboardStats::new(
            total,
            sales,
            stock,
            monthly_series(&months),
            currency,
        ))
    }
}
