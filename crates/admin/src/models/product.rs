//! Product domain types.
//!
//! Products belong to one category and carry many sizes and colors. Images
//! are owned by the product and replaced wholesale on every update.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use storeroom_core::{CategoryId, ColorId, ImageId, ProductId, SizeId, StoreId};

use super::{Color, Review, Size};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub store_id: StoreId,
    pub category_id: CategoryId,
    pub name: String,
    pub price: Decimal,
    pub short_description: Option<String>,
    pub inventory: i32,
    pub is_featured: bool,
    /// Archived products are hidden from the storefront and cannot be bought.
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: ImageId,
    pub product_id: ProductId,
    pub url: String,
    pub is_main: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub id: CategoryId,
    pub name: String,
}

/// A product with everything the storefront renders on a product card.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub category: CategorySummary,
    pub images: Vec<Image>,
    pub sizes: Vec<Size>,
    pub colors: Vec<Color>,
    pub reviews: Vec<Review>,
}

/// Storefront listing filters. Every field is optional and they combine
/// with AND.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    pub category_id: Option<CategoryId>,
    /// Products offered in this color.
    pub color_id: Option<ColorId>,
    /// Products offered in this size.
    pub size_id: Option<SizeId>,
    pub is_featured: Option<bool>,
    /// Leave this product out, for "related products" rails.
    pub exclude_id: Option<ProductId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewImage {
    pub url: String,
    #[serde(default)]
    pub is_main: bool,
}

/// Validated product input, shared by create and update.
#[derive(Debug, Clone)]
pub struct ProductInput {
    pub name: String,
    pub price: Decimal,
    pub short_description: Option<String>,
    /// `None` keeps the current stock on update and means zero on create.
    pub inventory: Option<i32>,
    pub is_featured: bool,
    pub is_archived: bool,
    pub category_id: CategoryId,
    pub size_ids: Vec<SizeId>,
    pub color_ids: Vec<ColorId>,
    pub images: Vec<NewImage>,
}

impl ProductInput {
    /// Whether the product should be stored archived given the stock it
    /// will have after the write. Out-of-stock products are always archived.
    #[must_use]
    pub const fn archived_with_stock(&self, inventory: i32) -> bool {
        self.is_archived || inventory <= 0
    }
}

/// One row of the console's product table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListing {
    pub id: ProductId,
    pub name: String,
    pub is_featured: bool,
    pub is_archived: bool,
    pub price: Decimal,
    pub formatted_price: String,
    pub inventory: i32,
    pub category: String,
    /// Size names, comma separated.
    pub sizes: String,
    /// Color values, comma separated.
    pub colors: String,
    pub created_at: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn input(is_archived: bool) -> ProductInput {
        ProductInput {
            name: "Linen shirt".to_string(),
            price: Decimal::new(4500, 2),
            short_description: None,
            inventory: None,
            is_featured: false,
            is_archived,
            category_id: CategoryId::new_v4(),
            size_ids: vec![SizeId::new_v4()],
            color_ids: vec![ColorId::new_v4()],
            images: vec![NewImage {
                url: "https://cdn.test/shirt.jpg".to_string(),
                is_main: true,
            }],
        }
    }

    #[test]
    fn test_out_of_stock_is_archived() {
        assert!(input(false).archived_with_stock(0));
        assert!(!input(false).archived_with_stock(3));
        assert!(input(true).archived_with_stock(3));
    }

    #[test]
    fn test_filter_deserializes_camel_case() {
        let filter: ProductFilter = serde_json::from_str(
            r#"{"isFeatured":true,"excludeId":"0b7e3c1a-9d2f-4c6b-8e5a-1f2d3c4b5a69"}"#,
        )
        .unwrap();
        assert_eq!(filter.is_featured, Some(true));
        assert!(filter.exclude_id.is_some());
        assert!(filter.category_id.is_none());
    }
}
