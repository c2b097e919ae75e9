//! Database operations for orders.
//!
//! Orders are created unpaid by checkout, one `order_item` per purchased
//! unit, and flipped to paid by the payment webhook.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use storeroom_core::{ClientId, CurrencyCode, OrderId, PaymentStatus, ProductId, StoreId};

use super::RepositoryError;
use super::clients::find_or_create_client;
use crate::filters::{long_date, money};
use crate::models::{CheckoutCompletion, CheckoutLine, FulfillmentOutcome, Order, OrderListing};

const ORDER_COLUMNS: &str =
    "id, store_id, is_paid, phone, address, client_id, created_at, updated_at";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    store_id: Uuid,
    is_paid: bool,
    phone: String,
    address: String,
    client_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: OrderId::from_uuid(row.id),
            store_id: StoreId::from_uuid(row.store_id),
            is_paid: row.is_paid,
            phone: row.phone,
            address: row.address,
            client_id: row.client_id.map(ClientId::from_uuid),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderListingRow {
    id: Uuid,
    phone: String,
    address: String,
    products: String,
    total_price: Decimal,
    is_paid: bool,
    created_at: DateTime<Utc>,
}

impl OrderListingRow {
    fn into_listing(self, currency: CurrencyCode) -> OrderListing {
        OrderListing {
            id: OrderId::from_uuid(self.id),
            phone: self.phone,
            address: self.address,
            products: self.products,
            total_price: self.total_price,
            formatted_total_price: money(self.total_price, currency),
            is_paid: self.is_paid,
            status: PaymentStatus::from(self.is_paid),
            created_at: long_date(&self.created_at),
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an unpaid order with one item per line, snapshotting prices.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn create_pending(
        &self,
        store_id: StoreId,
        lines: &[CheckoutLine],
    ) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO orders (store_id) VALUES ($1) RETURNING {ORDER_COLUMNS}"
        ))
        .bind(store_id)
        .fetch_one(&mut *tx)
        .await?;

        let product_ids: Vec<Uuid> = lines.iter().map(|l| l.product_id.as_uuid()).collect();
        let prices: Vec<Decimal> = lines.iter().map(|l| l.unit_price).collect();
        sqlx::query(
            "INSERT INTO order_item (order_id, product_id, unit_price) \
             SELECT $1, product_id, unit_price \
             FROM UNNEST($2::uuid[], $3::numeric[]) AS t(product_id, unit_price)",
        )
        .bind(row.id)
        .bind(&product_ids)
        .bind(&prices)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let order = Order::from(row);
        tracing::info!(order_id = %order.id, %store_id, items = lines.len(), "pending order created");
        Ok(order)
    }

    /// Console listing, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_console(
        &self,
        store_id: StoreId,
        currency: CurrencyCode,
    ) -> Result<Vec<OrderListing>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderListingRow>(
            "SELECT o.id, o.phone, o.address, o.is_paid, o.created_at, \
                    COALESCE(string_agg(p.name, ', ' ORDER BY oi.id), '') AS products, \
                    COALESCE(SUM(oi.unit_price), 0) AS total_price \
             FROM orders o \
             LEFT JOIN order_item oi ON oi.order_id = o.id \
             LEFT JOIN product p ON p.id = oi.product_id \
             WHERE o.store_id = $1 \
             GROUP BY o.id \
             ORDER BY o.created_at DESC",
        )
        .bind(store_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| row.into_listing(currency))
            .collect())
    }

    /// Delete an order and its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order is not in this store.
    pub async fn delete(&self, store_id: StoreId, id: OrderId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1 AND store_id = $2")
            .bind(id)
            .bind(store_id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tracing::info!(order_id = %id, %store_id, "order deleted");
        Ok(())
    }

    /// Remove an order whose checkout session could not be created.
    ///
    /// Paid orders are left alone.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn discard_unpaid(&self, id: OrderId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1 AND NOT is_paid")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Apply a completed checkout: record the buyer, mark the order paid,
    /// take the items out of stock and archive sold-out products.
    ///
    /// Runs in one transaction with the order row locked, so a redelivered
    /// event sees the order already paid and changes nothing.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails; the transaction
    /// is rolled back.
    pub async fn complete_checkout(
        &self,
        completion: &CheckoutCompletion,
    ) -> Result<FulfillmentOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let is_paid: Option<bool> =
            sqlx::query_scalar("SELECT is_paid FROM orders WHERE id = $1 FOR UPDATE")
                .bind(completion.order_id)
                .fetch_optional(&mut *tx)
                .await?;

        match is_paid {
            None => return Ok(FulfillmentOutcome::OrderNotFound),
            Some(true) => return Ok(FulfillmentOutcome::AlreadyPaid),
            Some(false) => {}
        }

        let client = match &completion.email {
            Some(email) => Some(
                find_or_create_client(
                    &mut *tx,
                    email,
                    completion.name.as_deref(),
                    &completion.phone,
                    &completion.address,
                )
                .await?,
            ),
            None => None,
        };
        let client_id = client.as_ref().map(|client| client.id);

        sqlx::query(
            "UPDATE orders SET is_paid = TRUE, address = $2, phone = $3, client_id = $4, \
                 updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(completion.order_id)
        .bind(completion.address.single_line())
        .bind(&completion.phone)
        .bind(client_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE product p SET inventory = p.inventory - sold.quantity, updated_at = NOW() \
             FROM (SELECT product_id, COUNT(*)::int AS quantity \
                   FROM order_item WHERE order_id = $1 GROUP BY product_id) AS sold \
             WHERE p.id = sold.product_id",
        )
        .bind(completion.order_id)
        .execute(&mut *tx)
        .await?;

        let archived: Vec<Uuid> = sqlx::query_scalar(
            "UPDATE product SET is_archived = TRUE, updated_at = NOW() \
             WHERE id IN (SELECT product_id FROM order_item WHERE order_id = $1) \
               AND inventory <= 0 AND NOT is_archived \
             RETURNING id",
        )
        .bind(completion.order_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(FulfillmentOutcome::Fulfilled {
            order_id: completion.order_id,
            archived: archived.into_iter().map(ProductId::from_uuid).collect(),
        })
    }
}
