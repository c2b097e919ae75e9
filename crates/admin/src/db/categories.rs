//! Database operations for categories.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use storeroom_core::{BillboardId, CategoryId, StoreId};

use super::{BillboardRepository, RepositoryError, conflict_on_constraint};
use crate::models::{Category, CategoryDetail, CategoryInput};

/// Category columns joined with the billboard label. Expects the category
/// aliased as `c` and the billboard as `b`.
const CATEGORY_SELECT: &str = "c.id, c.store_id, c.billboard_id, c.name, \
     b.label AS billboard_label, c.created_at, c.updated_at";

/// Internal row type for category queries.
#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: Uuid,
    store_id: Uuid,
    billboard_id: Uuid,
    name: String,
    billboard_label: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::from_uuid(row.id),
            store_id: StoreId::from_uuid(row.store_id),
            billboard_id: BillboardId::from_uuid(row.billboard_id),
            name: row.name,
            billboard_label: row.billboard_label,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a category. The caller checks the billboard belongs to the store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the billboard vanished meanwhile.
    pub async fn create(
        &self,
        store_id: StoreId,
        input: &CategoryInput,
    ) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "WITH c AS ( \
                 INSERT INTO category (store_id, billboard_id, name) VALUES ($1, $2, $3) \
                 RETURNING * \
             ) \
             SELECT {CATEGORY_SELECT} FROM c JOIN billboard b ON b.id = c.billboard_id"
        ))
        .bind(store_id)
        .bind(input.billboard_id)
        .bind(&input.name)
        .fetch_one(self.pool)
        .await
        .map_err(|e| conflict_on_constraint(e, "Billboard no longer exists"))?;

        Ok(row.into())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        store_id: StoreId,
        id: CategoryId,
    ) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_SELECT} FROM category c JOIN billboard b ON b.id = c.billboard_id \
             WHERE c.id = $1 AND c.store_id = $2"
        ))
        .bind(id)
        .bind(store_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// A category with its full billboard.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if the billboard row is
    /// missing or unreadable.
    pub async fn get_detail(
        &self,
        store_id: StoreId,
        id: CategoryId,
    ) -> Result<Option<CategoryDetail>, RepositoryError> {
        let Some(category) = self.get(store_id, id).await? else {
            return Ok(None);
        };
        let billboard = BillboardRepository::new(self.pool)
            .get(store_id, category.billboard_id)
            .await?
            .ok_or_else(|| {
                RepositoryError::DataCorruption(format!(
                    "category {} references a billboard outside its store",
                    category.id
                ))
            })?;

        Ok(Some(CategoryDetail {
            category,
            billboard,
        }))
    }

    /// All categories of a store, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, store_id: StoreId) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {CATEGORY_SELECT} FROM category c JOIN billboard b ON b.id = c.billboard_id \
             WHERE c.store_id = $1 ORDER BY c.created_at DESC"
        ))
        .bind(store_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category is not in this store.
    pub async fn update(
        &self,
        store_id: StoreId,
        id: CategoryId,
        input: &CategoryInput,
    ) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "WITH c AS ( \
                 UPDATE category SET billboard_id = $3, name = $4, updated_at = NOW() \
                 WHERE id = $1 AND store_id = $2 RETURNING * \
             ) \
             SELECT {CATEGORY_SELECT} FROM c JOIN billboard b ON b.id = c.billboard_id"
        ))
        .bind(id)
        .bind(store_id)
        .bind(input.billboard_id)
        .bind(&input.name)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| conflict_on_constraint(e, "Billboard no longer exists"))?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category is not in this
    /// store, `RepositoryError::Conflict` if products still use it.
    pub async fn delete(&self, store_id: StoreId, id: CategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM category WHERE id = $1 AND store_id = $2")
            .bind(id)
            .bind(store_id)
            .execute(self.pool)
            .await
            .map_err(|e| conflict_on_constraint(e, "Remove all products in this category first"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
