//! Category route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::Deserialize;
use tracing::instrument;

use storeroom_core::{BillboardId, CategoryId, StoreId};

use crate::db::{BillboardRepository, CategoryRepository};
use crate::error::{AppError, Result};
use crate::middleware::{JsonBody, RequireUser, require_store_owner};
use crate::models::{Category, CategoryDetail, CategoryInput};
use crate::state::AppState;
use crate::validation::{self, ValidationError};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/{store_id}/categories", get(list).post(create))
        .route(
            "/api/{store_id}/categories/{category_id}",
            get(show).patch(update).delete(destroy),
        )
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRequest {
    pub name: Option<String>,
    pub billboard_id: Option<BillboardId>,
}

impl TryFrom<CategoryRequest> for CategoryInput {
    type Error = ValidationError;

    fn try_from(req: CategoryRequest) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            name: validation::name(req.name, "name")?,
            billboard_id: req
                .billboard_id
                .ok_or(ValidationError::Missing("billboardId"))?,
        })
    }
}

/// Validate the body and check the billboard belongs to the store.
async fn validated_input(
    state: &AppState,
    store_id: StoreId,
    body: CategoryRequest,
) -> Result<CategoryInput> {
    let input = CategoryInput::try_from(body)?;
    if BillboardRepository::new(state.pool())
        .get(store_id, input.billboard_id)
        .await?
        .is_none()
    {
        return Err(AppError::BadRequest(
            "Billboard not found in this store".to_string(),
        ));
    }
    Ok(input)
}

#[instrument(skip_all, fields(store_id = %store_id))]
pub async fn create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(store_id): Path<StoreId>,
    JsonBody(body): JsonBody<CategoryRequest>,
) -> Result<Json<Category>> {
    require_store_owner(state.pool(), store_id, &user).await?;
    let input = validated_input(&state, store_id, body).await?;
    let category = CategoryRepository::new(state.pool())
        .create(store_id, &input)
        .await?;
    Ok(Json(category))
}

pub async fn list(
    State(state): State<AppState>,
    Path(store_id): Path<StoreId>,
) -> Result<Json<Vec<Category>>> {
    let categories = CategoryRepository::new(state.pool()).list(store_id).await?;
    Ok(Json(categories))
}

/// One category with its billboard.
pub async fn show(
    State(state): State<AppState>,
    Path((store_id, category_id)): Path<(StoreId, CategoryId)>,
) -> Result<Json<CategoryDetail>> {
    CategoryRepository::new(state.pool())
        .get_detail(store_id, category_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))
}

#[instrument(skip_all, fields(store_id = %store_id, category_id = %category_id))]
pub async fn update(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path((store_id, category_id)): Path<(StoreId, CategoryId)>,
    JsonBody(body): JsonBody<CategoryRequest>,
) -> Result<Json<Category>> {
    require_store_owner(state.pool(), store_id, &user).await?;
    let input = validated_input(&state, store_id, body).await?;
    let category = CategoryRepository::new(state.pool())
        .update(store_id, category_id, &input)
        .await?;
    Ok(Json(category))
}

#[instrument(skip_all, fields(store_id = %store_id, category_id = %category_id))]
pub async fn destroy(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path((store_id, category_id)): Path<(StoreId, CategoryId)>,
) -> Result<Json<serde_json::Value>> {
    require_store_owner(state.pool(), store_id, &user).await?;
    CategoryRepository::new(state.pool())
        .delete(store_id, category_id)
        .await?;
    Ok(Json(serde_json::json!({ "id": category_id })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_billboard_id_is_required() {
        let err = CategoryInput::try_from(CategoryRequest {
            name: Some("Shoes".to_string()),
            billboard_id: None,
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "Missing field 'billboardId'");
    }
}
