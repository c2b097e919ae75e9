//! Product route handlers.
//!
//! Storefront reads are public and never show archived products except by
//! id. Console reads and writes require the store owner.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use storeroom_core::{CategoryId, ColorId, ProductId, SizeId, StoreId};

use crate::db::{CategoryRepository, ColorRepository, ProductRepository, SizeRepository};
use crate::error::{AppError, Result};
use crate::middleware::{JsonBody, RequireUser, require_store_owner};
use crate::models::{NewImage, ProductDetail, ProductFilter, ProductInput, ProductListing};
use crate::state::AppState;
use crate::validation::{self, ValidationError};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/{store_id}/products", get(list).post(create))
        .route("/api/{store_id}/products/admin", get(console_list))
        .route(
            "/api/{store_id}/products/{product_id}",
            get(show).patch(update).delete(destroy),
        )
}

/// Create/update body. `sizeId` and `colorId` are merged into the lists.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub short_description: Option<String>,
    pub inventory: Option<i32>,
    pub is_featured: Option<bool>,
    pub is_archived: Option<bool>,
    pub category_id: Option<CategoryId>,
    pub size_ids: Option<Vec<SizeId>>,
    pub size_id: Option<SizeId>,
    pub color_ids: Option<Vec<ColorId>>,
    pub color_id: Option<ColorId>,
    pub images: Option<Vec<NewImage>>,
}

impl TryFrom<ProductRequest> for ProductInput {
    type Error = ValidationError;

    fn try_from(req: ProductRequest) -> std::result::Result<Self, Self::Error> {
        let name = validation::required_text(req.name, "name")?;
        let price = validation::price(req.price, "price")?;
        let inventory = validation::inventory(req.inventory, "inventory")?;

        let images = req
            .images
            .filter(|images| !images.is_empty())
            .ok_or(ValidationError::Missing("images"))?
            .into_iter()
            .map(|image| {
                Ok(NewImage {
                    url: validation::http_url(&image.url, "images")?,
                    is_main: image.is_main,
                })
            })
            .collect::<std::result::Result<Vec<_>, ValidationError>>()?;

        let category_id = req.category_id.ok_or(ValidationError::Missing("categoryId"))?;

        let size_ids = validation::merge_ids(req.size_ids, req.size_id);
        if size_ids.is_empty() {
            return Err(ValidationError::Missing("sizeIds"));
        }
        let color_ids = validation::merge_ids(req.color_ids, req.color_id);
        if color_ids.is_empty() {
            return Err(ValidationError::Missing("colorIds"));
        }

        Ok(Self {
            name,
            price,
            short_description: validation::optional_text(req.short_description),
            inventory,
            is_featured: req.is_featured.unwrap_or(false),
            is_archived: req.is_archived.unwrap_or(false),
            category_id,
            size_ids,
            color_ids,
            images,
        })
    }
}

/// Check that the category, sizes and colors all belong to the store.
async fn check_references(state: &AppState, store_id: StoreId, input: &ProductInput) -> Result<()> {
    let pool = state.pool();

    if CategoryRepository::new(pool)
        .get(store_id, input.category_id)
        .await?
        .is_none()
    {
        return Err(AppError::BadRequest(
            "Category not found in this store".to_string(),
        ));
    }

    let sizes = SizeRepository::new(pool)
        .count_in_store(store_id, &input.size_ids)
        .await?;
    if sizes != input.size_ids.len() {
        return Err(AppError::BadRequest(
            "Sizes not found in this store".to_string(),
        ));
    }

    let colors = ColorRepository::new(pool)
        .count_in_store(store_id, &input.color_ids)
        .await?;
    if colors != input.color_ids.len() {
        return Err(AppError::BadRequest(
            "Colors not found in this store".to_string(),
        ));
    }

    Ok(())
}

#[instrument(skip_all, fields(store_id = %store_id))]
pub async fn create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(store_id): Path<StoreId>,
    JsonBody(body): JsonBody<ProductRequest>,
) -> Result<Json<ProductDetail>> {
    let input = ProductInput::try_from(body)?;
    require_store_owner(state.pool(), store_id, &user).await?;
    check_references(&state, store_id, &input).await?;
    let product = ProductRepository::new(state.pool())
        .create(store_id, &input)
        .await?;
    Ok(Json(product))
}

/// Storefront listing.
pub async fn list(
    State(state): State<AppState>,
    Path(store_id): Path<StoreId>,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<Vec<ProductDetail>>> {
    let products = ProductRepository::new(state.pool())
        .list_storefront(store_id, &filter)
        .await?;
    Ok(Json(products))
}

/// Console listing, archived products included.
pub async fn console_list(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(store_id): Path<StoreId>,
) -> Result<Json<Vec<ProductListing>>> {
    require_store_owner(state.pool(), store_id, &user).await?;
    let products = ProductRepository::new(state.pool())
        .list_for_console(store_id, state.currency())
        .await?;
    Ok(Json(products))
}

pub async fn show(
    State(state): State<AppState>,
    Path((store_id, product_id)): Path<(StoreId, ProductId)>,
) -> Result<Json<ProductDetail>> {
    ProductRepository::new(state.pool())
        .get_detail(store_id, product_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
}

#[instrument(skip_all, fields(store_id = %store_id, product_id = %product_id))]
pub async fn update(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path((store_id, product_id)): Path<(StoreId, ProductId)>,
    JsonBody(body): JsonBody<ProductRequest>,
) -> Result<Json<ProductDetail>> {
    let input = ProductInput::try_from(body)?;
    require_store_owner(state.pool(), store_id, &user).await?;
    check_references(&state, store_id, &input).await?;
    let product = ProductRepository::new(state.pool())
        .update(store_id, product_id, &input)
        .await?;
    Ok(Json(product))
}

#[instrument(skip_all, fields(store_id = %store_id, product_id = %product_id))]
pub async fn destroy(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path((store_id, product_id)): Path<(StoreId, ProductId)>,
) -> Result<Json<serde_json::Value>> {
    require_store_owner(state.pool(), store_id, &user).await?;
    ProductRepository::new(state.pool())
        .delete(store_id, product_id)
        .await?;
    Ok(Json(serde_json::json!({ "id": product_id })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn request(body: serde_json::Value) -> ProductRequest {
        serde_json::from_value(body).unwrap()
    }

    fn valid_body() -> serde_json::Value {
        json!({
            "name": "Linen shirt",
            "price": 45.5,
            "categoryId": "0b7e3c1a-9d2f-4c6b-8e5a-1f2d3c4b5a69",
            "sizeIds": ["5c0f4a8e-2b1d-4e3f-9a6b-7c8d9e0f1a2b"],
            "colorId": "9e8d7c6b-5a4f-4e3d-8c2b-1a0f9e8d7c6b",
            "images": [{"url": "https://cdn.test/shirt.jpg", "isMain": true}]
        })
    }

    #[test]
    fn test_valid_request() {
        let input = ProductInput::try_from(request(valid_body())).unwrap();
        assert_eq!(input.price, Decimal::new(4550, 2));
        assert_eq!(input.inventory, None);
        assert_eq!(input.color_ids.len(), 1);
        assert!(!input.is_featured);
        assert!(input.images.first().is_some_and(|image| image.is_main));
    }

    #[test]
    fn test_single_ids_merge_into_lists() {
        let mut body = valid_body();
        body["sizeId"] = json!("5c0f4a8e-2b1d-4e3f-9a6b-7c8d9e0f1a2b");
        let input = ProductInput::try_from(request(body)).unwrap();
        assert_eq!(input.size_ids.len(), 1);
    }

    #[test]
    fn test_missing_fields() {
        for (field, expected) in [
            ("images", "Missing field 'images'"),
            ("categoryId", "Missing field 'categoryId'"),
            ("colorId", "Missing field 'colorIds'"),
            ("price", "Missing field 'price'"),
        ] {
            let mut body = valid_body();
            body.as_object_mut().unwrap().remove(field);
            let err = ProductInput::try_from(request(body)).unwrap_err();
            assert_eq!(err.to_string(), expected);
        }
    }

    #[test]
    fn test_invalid_values() {
        let mut body = valid_body();
        body["price"] = json!(0);
        assert!(ProductInput::try_from(request(body)).is_err());

        let mut body = valid_body();
        body["inventory"] = json!(-2);
        assert!(ProductInput::try_from(request(body)).is_err());

        let mut body = valid_body();
        body["images"] = json!([]);
        assert!(ProductInput::try_from(request(body)).is_err());

        let mut body = valid_body();
        body["images"] = json!([{"url": "file:///etc/passwd"}]);
        assert!(ProductInput::try_from(request(body)).is_err());
    }
}
