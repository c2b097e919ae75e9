//! Database operations for products.
//!
//! Product writes touch `product`, `image`, `product_size` and
//! `product_color`; each create or update runs in one transaction. Reads
//! load the product rows first and then batch-load related rows with
//! `= ANY($1)` so a listing costs a fixed number of queries.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use storeroom_core::{CategoryId, CurrencyCode, ImageId, ProductId, StoreId};

use super::attributes::{colors_for_products, sizes_for_products};
use super::reviews::reviews_for_products;
use super::{RepositoryError, conflict_on_constraint};
use crate::filters::{long_date, money};
use crate::models::{
    CategorySummary, CheckoutLine, Image, Product, ProductDetail, ProductFilter, ProductInput,
    ProductListing,
};

/// Product columns plus the category name. Expects `product p` joined with
/// `category c`.
const PRODUCT_SELECT: &str = "p.id, p.store_id, p.category_id, p.name, p.price, \
     p.short_description, p.inventory, p.is_featured, p.is_archived, \
     p.created_at, p.updated_at, c.name AS category_name";

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    store_id: Uuid,
    category_id: Uuid,
    name: String,
    price: Decimal,
    short_description: Option<String>,
    inventory: i32,
    is_featured: bool,
    is_archived: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    category_name: String,
}

impl ProductRow {
    fn into_parts(self) -> (Product, CategorySummary) {
        let category = CategorySummary {
            id: CategoryId::from_uuid(self.category_id),
            name: self.category_name,
        };
        let product = Product {
            id: ProductId::from_uuid(self.id),
            store_id: StoreId::from_uuid(self.store_id),
            category_id: category.id,
            name: self.name,
            price: self.price,
            short_description: self.short_description,
            inventory: self.inventory,
            is_featured: self.is_featured,
            is_archived: self.is_archived,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };
        (product, category)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ImageRow {
    id: Uuid,
    product_id: Uuid,
    url: String,
    is_main: bool,
    created_at: DateTime<Utc>,
}

impl From<ImageRow> for Image {
    fn from(row: ImageRow) -> Self {
        Self {
            id: ImageId::from_uuid(row.id),
            product_id: ProductId::from_uuid(row.product_id),
            url: row.url,
            is_main: row.is_main,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ListingRow {
    id: Uuid,
    name: String,
    is_featured: bool,
    is_archived: bool,
    price: Decimal,
    inventory: i32,
    category_name: String,
    sizes: String,
    colors: String,
    created_at: DateTime<Utc>,
}

impl ListingRow {
    fn into_listing(self, currency: CurrencyCode) -> ProductListing {
        ProductListing {
            id: ProductId::from_uuid(self.id),
            name: self.name,
            is_featured: self.is_featured,
            is_archived: self.is_archived,
            price: self.price,
            formatted_price: money(self.price, currency),
            inventory: self.inventory,
            category: self.category_name,
            sizes: self.sizes,
            colors: self.colors,
            created_at: long_date(&self.created_at),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CheckoutRow {
    id: Uuid,
    name: String,
    price: Decimal,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a product with its images and attribute links.
    ///
    /// The caller checks that the category, sizes and colors belong to the
    /// store. A product created without stock is stored archived.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a referenced category, size or
    /// color disappeared meanwhile.
    pub async fn create(
        &self,
        store_id: StoreId,
        input: &ProductInput,
    ) -> Result<ProductDetail, RepositoryError> {
        let inventory = input.inventory.unwrap_or(0);
        let mut tx = self.pool.begin().await?;

        let id: Uuid = sqlx::query_scalar(
            "INSERT INTO product \
                 (store_id, category_id, name, price, short_description, inventory, is_featured, is_archived) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING id",
        )
        .bind(store_id)
        .bind(input.category_id)
        .bind(&input.name)
        .bind(input.price)
        .bind(&input.short_description)
        .bind(inventory)
        .bind(input.is_featured)
        .bind(input.archived_with_stock(inventory))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| conflict_on_constraint(e, "Category no longer exists"))?;

        write_relations(&mut tx, id, input).await?;
        tx.commit().await?;

        let id = ProductId::from_uuid(id);
        tracing::info!(product_id = %id, %store_id, "product created");
        self.get_detail(store_id, id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Replace a product's fields, images, sizes and colors.
    ///
    /// Inventory is only changed when `input.inventory` is set. A product
    /// left without stock is archived.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is not in this store.
    pub async fn update(
        &self,
        store_id: StoreId,
        id: ProductId,
        input: &ProductInput,
    ) -> Result<ProductDetail, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let updated: Option<Uuid> = sqlx::query_scalar(
            "UPDATE product SET \
                 category_id = $3, name = $4, price = $5, short_description = $6, \
                 inventory = COALESCE($7, inventory), is_featured = $8, \
                 is_archived = ($9 OR COALESCE($7, inventory) <= 0), updated_at = NOW() \
             WHERE id = $1 AND store_id = $2 RETURNING id",
        )
        .bind(id)
        .bind(store_id)
        .bind(input.category_id)
        .bind(&input.name)
        .bind(input.price)
        .bind(&input.short_description)
        .bind(input.inventory)
        .bind(input.is_featured)
        .bind(input.is_archived)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| conflict_on_constraint(e, "Category no longer exists"))?;

        let Some(row_id) = updated else {
            return Err(RepositoryError::NotFound);
        };

        for table in ["image", "product_size", "product_color"] {
            sqlx::query(&format!("DELETE FROM {table} WHERE product_id = $1"))
                .bind(row_id)
                .execute(&mut *tx)
                .await?;
        }
        write_relations(&mut tx, row_id, input).await?;
        tx.commit().await?;

        self.get_detail(store_id, id)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// A product with all related data, archived or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_detail(
        &self,
        store_id: StoreId,
        id: ProductId,
    ) -> Result<Option<ProductDetail>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_SELECT} FROM product p JOIN category c ON c.id = p.category_id \
             WHERE p.id = $1 AND p.store_id = $2"
        ))
        .bind(id)
        .bind(store_id)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.with_relations(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Whether a product exists in the store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, store_id: StoreId, id: ProductId) -> Result<bool, RepositoryError> {
        let found: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM product WHERE id = $1 AND store_id = $2)",
        )
        .bind(id)
        .bind(store_id)
        .fetch_one(self.pool)
        .await?;

        Ok(found)
    }

    /// Storefront listing: non-archived products matching `filter`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_storefront(
        &self,
        store_id: StoreId,
        filter: &ProductFilter,
    ) -> Result<Vec<ProductDetail>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_SELECT} FROM product p JOIN category c ON c.id = p.category_id \
             WHERE p.store_id = $1 AND NOT p.is_archived \
               AND ($2::uuid IS NULL OR p.category_id = $2) \
               AND ($3::uuid IS NULL OR EXISTS ( \
                   SELECT 1 FROM product_color pc WHERE pc.product_id = p.id AND pc.color_id = $3)) \
               AND ($4::uuid IS NULL OR EXISTS ( \
                   SELECT 1 FROM product_size ps WHERE ps.product_id = p.id AND ps.size_id = $4)) \
               AND ($5::boolean IS NULL OR p.is_featured = $5) \
               AND ($6::uuid IS NULL OR p.id <> $6) \
             ORDER BY p.created_at DESC"
        ))
        .bind(store_id)
        .bind(filter.category_id)
        .bind(filter.color_id)
        .bind(filter.size_id)
        .bind(filter.is_featured)
        .bind(filter.exclude_id)
        .fetch_all(self.pool)
        .await?;

        self.with_relations(rows).await
    }

    /// Console listing: every product, archived included, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_console(
        &self,
        store_id: StoreId,
        currency: CurrencyCode,
    ) -> Result<Vec<ProductListing>, RepositoryError> {
        let rows = sqlx::query_as::<_, ListingRow>(
            "SELECT p.id, p.name, p.is_featured, p.is_archived, p.price, p.inventory, \
                    c.name AS category_name, \
                    COALESCE((SELECT string_agg(s.name, ', ' ORDER BY s.name) \
                              FROM product_size ps JOIN size s ON s.id = ps.size_id \
                              WHERE ps.product_id = p.id), '') AS sizes, \
                    COALESCE((SELECT string_agg(co.value, ', ' ORDER BY co.name) \
                              FROM product_color pc JOIN color co ON co.id = pc.color_id \
                              WHERE pc.product_id = p.id), '') AS colors, \
                    p.created_at \
             FROM product p JOIN category c ON c.id = p.category_id \
             WHERE p.store_id = $1 ORDER BY p.created_at DESC",
        )
        .bind(store_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| row.into_listing(currency))
            .collect())
    }

    /// Resolve checkout ids to purchasable products of this store.
    ///
    /// Returns one line per requested id, duplicates included, in request
    /// order. Archived or foreign products are left out, so callers compare
    /// lengths to detect them.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn checkout_lines(
        &self,
        store_id: StoreId,
        ids: &[ProductId],
    ) -> Result<Vec<CheckoutLine>, RepositoryError> {
        let raw: Vec<Uuid> = ids.iter().map(ProductId::as_uuid).collect();
        let rows = sqlx::query_as::<_, CheckoutRow>(
            "SELECT id, name, price FROM product \
             WHERE store_id = $1 AND id = ANY($2) AND NOT is_archived",
        )
        .bind(store_id)
        .bind(&raw)
        .fetch_all(self.pool)
        .await?;

        let by_id: HashMap<Uuid, CheckoutRow> = rows.into_iter().map(|r| (r.id, r)).collect();
        Ok(ids
            .iter()
            .filter_map(|id| by_id.get(&id.as_uuid()))
            .map(|row| CheckoutLine {
                product_id: ProductId::from_uuid(row.id),
                name: row.name.clone(),
                unit_price: row.price,
            })
            .collect())
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product is not in this
    /// store, `RepositoryError::Conflict` if orders reference it.
    pub async fn delete(&self, store_id: StoreId, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM product WHERE id = $1 AND store_id = $2")
            .bind(id)
            .bind(store_id)
            .execute(self.pool)
            .await
            .map_err(|e| {
                conflict_on_constraint(e, "Product has orders; archive it instead of deleting")
            })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tracing::info!(product_id = %id, %store_id, "product deleted");
        Ok(())
    }

    /// Attach images, sizes, colors and reviews to product rows, keeping order.
    async fn with_relations(
        &self,
        rows: Vec<ProductRow>,
    ) -> Result<Vec<ProductDetail>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

        let image_rows = sqlx::query_as::<_, ImageRow>(
            "SELECT id, product_id, url, is_main, created_at FROM image \
             WHERE product_id = ANY($1) ORDER BY is_main DESC, created_at ASC",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut images = group_by_product(
            image_rows
                .into_iter()
                .map(|row| (ProductId::from_uuid(row.product_id), Image::from(row))),
        );
        let mut sizes = group_by_product(sizes_for_products(self.pool, &ids).await?);
        let mut colors = group_by_product(colors_for_products(self.pool, &ids).await?);
        let mut reviews = group_by_product(
            reviews_for_products(self.pool, &ids)
                .await?
                .into_iter()
                .map(|review| (review.product_id, review)),
        );

        Ok(rows
            .into_iter()
            .map(|row| {
                let (product, category) = row.into_parts();
                let id = product.id;
                ProductDetail {
                    product,
                    category,
                    images: images.remove(&id).unwrap_or_default(),
                    sizes: sizes.remove(&id).unwrap_or_default(),
                    colors: colors.remove(&id).unwrap_or_default(),
                    reviews: reviews.remove(&id).unwrap_or_default(),
                }
            })
            .collect())
    }
}

/// Insert a product's images and attribute links.
async fn write_relations(
    conn: &mut PgConnection,
    product_id: Uuid,
    input: &ProductInput,
) -> Result<(), RepositoryError> {
    let urls: Vec<&str> = input.images.iter().map(|i| i.url.as_str()).collect();
    let mains: Vec<bool> = input.images.iter().map(|i| i.is_main).collect();
    sqlx::query(
        "INSERT INTO image (product_id, url, is_main) \
         SELECT $1, url, is_main FROM UNNEST($2::text[], $3::boolean[]) AS t(url, is_main)",
    )
    .bind(product_id)
    .bind(&urls)
    .bind(&mains)
    .execute(&mut *conn)
    .await?;

    let size_ids: Vec<Uuid> = input.size_ids.iter().map(|id| id.as_uuid()).collect();
    sqlx::query("INSERT INTO product_size (product_id, size_id) SELECT $1, UNNEST($2::uuid[])")
        .bind(product_id)
        .bind(&size_ids)
        .execute(&mut *conn)
        .await
        .map_err(|e| conflict_on_constraint(e, "Size no longer exists"))?;

    let color_ids: Vec<Uuid> = input.color_ids.iter().map(|id| id.as_uuid()).collect();
    sqlx::query("INSERT INTO product_color (product_id, color_id) SELECT $1, UNNEST($2::uuid[])")
        .bind(product_id)
        .bind(&color_ids)
        .execute(&mut *conn)
        .await
        .map_err(|e| conflict_on_constraint(e, "Color no longer exists"))?;

    Ok(())
}

fn group_by_product<T>(
    pairs: impl IntoIterator<Item = (ProductId, T)>,
) -> HashMap<ProductId, Vec<T>> {
    let mut grouped: HashMap<ProductId, Vec<T>> = HashMap::new();
    for (id, item) in pairs {
        grouped.entry(id).or_default().push(item);
    }
    grouped
}
