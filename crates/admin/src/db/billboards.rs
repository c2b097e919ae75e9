//! Database operations for billboards.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use storeroom_core::{BillboardId, HexColor, StoreId};

use super::{RepositoryError, conflict_on_constraint};
use crate::models::{Billboard, BillboardInput};

const BILLBOARD_COLUMNS: &str =
    "id, store_id, label, image_url, text_color, created_at, updated_at";

/// Internal row type for billboard queries.
#[derive(Debug, sqlx::FromRow)]
pub(super) struct BillboardRow {
    id: Uuid,
    store_id: Uuid,
    label: String,
    image_url: String,
    text_color: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BillboardRow> for Billboard {
    type Error = RepositoryError;

    fn try_from(row: BillboardRow) -> Result<Self, Self::Error> {
        let text_color = HexColor::parse(&row.text_color).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid billboard text color: {e}"))
        })?;

        Ok(Self {
            id: BillboardId::from_uuid(row.id),
            store_id: StoreId::from_uuid(row.store_id),
            label: row.label,
            image_url: row.image_url,
            text_color,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for billboard database operations.
pub struct BillboardRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BillboardRepository<'a> {
    /// Create a new billboard repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(
        &self,
        store_id: StoreId,
        input: &BillboardInput,
    ) -> Result<Billboard, RepositoryError> {
        sqlx::query_as::<_, BillboardRow>(&format!(
            "INSERT INTO billboard (store_id, label, image_url, text_color) \
             VALUES ($1, $2, $3, $4) RETURNING {BILLBOARD_COLUMNS}"
        ))
        .bind(store_id)
        .bind(&input.label)
        .bind(&input.image_url)
        .bind(&input.text_color)
        .fetch_one(self.pool)
        .await?
        .try_into()
    }

    /// Get a billboard, scoped to its store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        store_id: StoreId,
        id: BillboardId,
    ) -> Result<Option<Billboard>, RepositoryError> {
        sqlx::query_as::<_, BillboardRow>(&format!(
            "SELECT {BILLBOARD_COLUMNS} FROM billboard WHERE id = $1 AND store_id = $2"
        ))
        .bind(id)
        .bind(store_id)
        .fetch_optional(self.pool)
        .await?
        .map(TryInto::try_into)
        .transpose()
    }

    /// All billboards of a store, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, store_id: StoreId) -> Result<Vec<Billboard>, RepositoryError> {
        sqlx::query_as::<_, BillboardRow>(&format!(
            "SELECT {BILLBOARD_COLUMNS} FROM billboard WHERE store_id = $1 ORDER BY created_at DESC"
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
    /// Returns `RepositoryError::NotFound` if the billboard is not in this store.
    pub async fn update(
        &self,
        store_id: StoreId,
        id: BillboardId,
        input: &BillboardInput,
    ) -> Result<Billboard, RepositoryError> {
        sqlx::query_as::<_, BillboardRow>(&format!(
            "UPDATE billboard SET label = $3, image_url = $4, text_color = $5, updated_at = NOW() \
             WHERE id = $1 AND store_id = $2 RETURNING {BILLBOARD_COLUMNS}"
        ))
        .bind(id)
        .bind(store_id)
        .bind(&input.label)
        .bind(&input.image_url)
        .bind(&input.text_color)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?
        .try_into()
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the billboard is not in this
    /// store, `RepositoryError::Conflict` if a category still uses it.
    pub async fn delete(
        &self,
        store_id: StoreId,
        id: BillboardId,
    ) -> Result<Billboard, RepositoryError> {
        sqlx::query_as::<_, BillboardRow>(&format!(
            "DELETE FROM billboard WHERE id = $1 AND store_id = $2 RETURNING {BILLBOARD_COLUMNS}"
        ))
        .bind(id)
        .bind(store_id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| {
            conflict_on_constraint(e, "Remove all categories using this billboard first")
        })?
        .ok_or(RepositoryError::NotFound)?
        .try_into()
    }
}
