//! Database operations for product reviews.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use storeroom_core::{ProductId, Rating, ReviewId, StoreId};

use super::RepositoryError;
use crate::models::{Review, ReviewInput, ReviewWithProduct};

/// Internal row type for review queries.
#[derive(Debug, sqlx::FromRow)]
struct ReviewRow {
    id: Uuid,
    product_id: Uuid,
    first_name: String,
    last_name: String,
    message: String,
    rating: Rating,
    created_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: ReviewId::from_uuid(row.id),
            product_id: ProductId::from_uuid(row.product_id),
            first_name: row.first_name,
            last_name: row.last_name,
            message: row.message,
            rating: row.rating,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ReviewWithProductRow {
    #[sqlx(flatten)]
    review: ReviewRow,
    product_name: String,
}

/// Reviews of any of `product_ids`, newest first.
pub(super) async fn reviews_for_products(
    pool: &PgPool,
    product_ids: &[Uuid],
) -> Result<Vec<Review>, RepositoryError> {
    let rows = sqlx::query_as::<_, ReviewRow>(
        "SELECT id, product_id, first_name, last_name, message, rating, created_at \
         FROM review WHERE product_id = ANY($1) ORDER BY created_at DESC",
    )
    .bind(product_ids)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    /// Create a new review repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Attach a review to a product. The caller checks the product's store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product was deleted meanwhile.
    pub async fn create(
        &self,
        product_id: ProductId,
        input: &ReviewInput,
    ) -> Result<Review, RepositoryError> {
        let row = sqlx::query_as::<_, ReviewRow>(
            "INSERT INTO review (product_id, first_name, last_name, message, rating) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, product_id, first_name, last_name, message, rating, created_at",
        )
        .bind(product_id)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.message)
        .bind(input.rating)
        .fetch_one(self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                RepositoryError::NotFound
            }
            other => RepositoryError::Database(other),
        })?;

        Ok(row.into())
    }

    /// Reviews of one product in a store, newest first, with the product name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_product(
        &self,
        store_id: StoreId,
        product_id: ProductId,
    ) -> Result<Vec<ReviewWithProduct>, RepositoryError> {
        let rows = sqlx::query_as::<_, ReviewWithProductRow>(
            "SELECT r.id, r.product_id, r.first_name, r.last_name, r.message, r.rating, \
                    r.created_at, p.name AS product_name \
             FROM review r JOIN product p ON p.id = r.product_id \
             WHERE r.product_id = $1 AND p.store_id = $2 \
             ORDER BY r.created_at DESC",
        )
        .bind(product_id)
        .bind(store_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ReviewWithProduct {
                review: row.review.into(),
                product_name: row.product_name,
            })
            .collect())
    }
}
