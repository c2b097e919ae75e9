//! Database operations for sizes and colors.
//!
//! Both are store-scoped name/value pairs linked to products through
//! `product_size` and `product_color`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use storeroom_core::{ColorId, HexColor, ProductId, SizeId, StoreId};

use super::{RepositoryError, conflict_on_constraint};
use crate::models::{Color, ColorInput, Size, SizeInput};

const ATTRIBUTE_COLUMNS: &str = "id, store_id, name, value, created_at, updated_at";

/// Row shape shared by `size` and `color`.
#[derive(Debug, sqlx::FromRow)]
pub(super) struct AttributeRow {
    pub(super) id: Uuid,
    store_id: Uuid,
    name: String,
    value: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Attribute row tagged with the product it is linked to.
#[derive(Debug, sqlx::FromRow)]
pub(super) struct LinkedAttributeRow {
    pub(super) product_id: Uuid,
    #[sqlx(flatten)]
    pub(super) attribute: AttributeRow,
}

impl From<AttributeRow> for Size {
    fn from(row: AttributeRow) -> Self {
        Self {
            id: SizeId::from_uuid(row.id),
            store_id: StoreId::from_uuid(row.store_id),
            name: row.name,
            value: row.value,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl TryFrom<AttributeRow> for Color {
    type Error = RepositoryError;

    fn try_from(row: AttributeRow) -> Result<Self, Self::Error> {
        let value = HexColor::parse(&row.value)
            .map_err(|e| RepositoryError::DataCorruption(format!("invalid color value: {e}")))?;

        Ok(Self {
            id: ColorId::from_uuid(row.id),
            store_id: StoreId::from_uuid(row.store_id),
            name: row.name,
            value,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Sizes linked to any of `product_ids`, keyed by product.
pub(super) async fn sizes_for_products(
    pool: &PgPool,
    product_ids: &[Uuid],
) -> Result<Vec<(ProductId, Size)>, RepositoryError> {
    let rows = sqlx::query_as::<_, LinkedAttributeRow>(
        "SELECT ps.product_id, s.id, s.store_id, s.name, s.value, s.created_at, s.updated_at \
         FROM product_size ps JOIN size s ON s.id = ps.size_id \
         WHERE ps.product_id = ANY($1) ORDER BY s.name",
    )
    .bind(product_ids)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| (ProductId::from_uuid(row.product_id), row.attribute.into()))
        .collect())
}

/// Colors linked to any of `product_ids`, keyed by product.
pub(super) async fn colors_for_products(
    pool: &PgPool,
    product_ids: &[Uuid],
) -> Result<Vec<(ProductId, Color)>, RepositoryError> {
    let rows = sqlx::query_as::<_, LinkedAttributeRow>(
        "SELECT pc.product_id, c.id, c.store_id, c.name, c.value, c.created_at, c.updated_at \
         FROM product_color pc JOIN color c ON c.id = pc.color_id \
         WHERE pc.product_id = ANY($1) ORDER BY c.name",
    )
    .bind(product_ids)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|row| Ok((ProductId::from_uuid(row.product_id), row.attribute.try_into()?)))
        .collect()
}

/// Repository for size database operations.
pub struct SizeRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SizeRepository<'a> {
    /// Create a new size repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, store_id: StoreId, input: &SizeInput) -> Result<Size, RepositoryError> {
        let row = sqlx::query_as::<_, AttributeRow>(&format!(
            "INSERT INTO size (store_id, name, value) VALUES ($1, $2, $3) RETURNING {ATTRIBUTE_COLUMNS}"
        ))
        .bind(store_id)
        .bind(&input.name)
        .bind(&input.value)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, store_id: StoreId, id: SizeId) -> Result<Option<Size>, RepositoryError> {
        let row = sqlx::query_as::<_, AttributeRow>(&format!(
            "SELECT {ATTRIBUTE_COLUMNS} FROM size WHERE id = $1 AND store_id = $2"
        ))
        .bind(id)
        .bind(store_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// All sizes of a store, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, store_id: StoreId) -> Result<Vec<Size>, RepositoryError> {
        let rows = sqlx::query_as::<_, AttributeRow>(&format!(
            "SELECT {ATTRIBUTE_COLUMNS} FROM size WHERE store_id = $1 ORDER BY created_at DESC"
        ))
        .bind(store_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the size is not in this store.
    pub async fn update(
        &self,
        store_id: StoreId,
        id: SizeId,
        input: &SizeInput,
    ) -> Result<Size, RepositoryError> {
        let row = sqlx::query_as::<_, AttributeRow>(&format!(
            "UPDATE size SET name = $3, value = $4, updated_at = NOW() \
             WHERE id = $1 AND store_id = $2 RETURNING {ATTRIBUTE_COLUMNS}"
        ))
        .bind(id)
        .bind(store_id)
        .bind(&input.name)
        .bind(&input.value)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the size is not in this store,
    /// `RepositoryError::Conflict` if a product still offers it.
    pub async fn delete(&self, store_id: StoreId, id: SizeId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM size WHERE id = $1 AND store_id = $2")
            .bind(id)
            .bind(store_id)
            .execute(self.pool)
            .await
            .map_err(|e| conflict_on_constraint(e, "Remove this size from all products first"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// How many of `ids` exist in this store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_in_store(&self, store_id: StoreId, ids: &[SizeId]) -> Result<usize, RepositoryError> {
        let ids: Vec<Uuid> = ids.iter().map(SizeId::as_uuid).collect();
        count_in_store(self.pool, "size", store_id, &ids).await
    }
}

/// Repository for color database operations.
pub struct ColorRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ColorRepository<'a> {
    /// Create a new color repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, store_id: StoreId, input: &ColorInput) -> Result<Color, RepositoryError> {
        sqlx::query_as::<_, AttributeRow>(&format!(
            "INSERT INTO color (store_id, name, value) VALUES ($1, $2, $3) RETURNING {ATTRIBUTE_COLUMNS}"
        ))
        .bind(store_id)
        .bind(&input.name)
        .bind(&input.value)
        .fetch_one(self.pool)
        .await?
        .try_into()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, store_id: StoreId, id: ColorId) -> Result<Option<Color>, RepositoryError> {
        sqlx::query_as::<_, AttributeRow>(&format!(
            "SELECT {ATTRIBUTE_COLUMNS} FROM color WHERE id = $1 AND store_id = $2"
        ))
        .bind(id)
        .bind(store_id)
        .fetch_optional(self.pool)
        .await?
        .map(TryInto::try_into)
        .transpose()
    }

    /// All colors of a store, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, store_id: StoreId) -> Result<Vec<Color>, RepositoryError> {
        sqlx::query_as::<_, AttributeRow>(&format!(
            "SELECT {ATTRIBUTE_COLUMNS} FROM color WHERE store_id = $1 ORDER BY created_at DESC"
        ))
        .bind(store_id)
        .fetch_all(self.pool)
        .await?
        .into_iter()
        .map(TryInto::try_into)
        .collect()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the color is not in this store.
    pub async fn update(
        &self,
        store_id: StoreId,
        id: ColorId,
        input: &ColorInput,
    ) -> Result<Color, RepositoryError> {
        sqlx::query_as::<_, AttributeRow>(&format!(
            "UPDATE color SET name = $3, value = $4, updated_at = NOW() \
             WHERE id = $1 AND store_id = $2 RETURNING {ATTRIBUTE_COLUMNS}"
        ))
        .bind(id)
        .bind(store_id)
        .bind(&input.name)
        .bind(&input.value)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?
        .try_into()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the color is not in this store,
    /// `RepositoryError::Conflict` if a product still offers it.
    pub async fn delete(&self, store_id: StoreId, id: ColorId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM color WHERE id = $1 AND store_id = $2")
            .bind(id)
            .bind(store_id)
            .execute(self.pool)
            .await
            .map_err(|e| conflict_on_constraint(e, "Remove this color from all products first"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// How many of `ids` exist in this store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count_in_store(&self, store_id: StoreId, ids: &[ColorId]) -> Result<usize, RepositoryError> {
        let ids: Vec<Uuid> = ids.iter().map(ColorId::as_uuid).collect();
        count_in_store(self.pool, "color", store_id, &ids).await
    }
}

/// Count distinct rows of `table` with an id in `ids` that belong to `store_id`.
async fn count_in_store(
    pool: &PgPool,
    table: &'static str,
    store_id: StoreId,
    ids: &[Uuid],
) -> Result<usize, RepositoryError> {
    let count: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM {table} WHERE store_id = $1 AND id = ANY($2)"
    ))
    .bind(store_id)
    .bind(ids)
    .fetch_one(pool)
    .await?;

    usize::try_from(count).map_err(|_| RepositoryError::DataCorruption("negative count".to_string()))
}
