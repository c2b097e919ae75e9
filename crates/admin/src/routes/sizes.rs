//! Size route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::Deserialize;
use tracing::instrument;

use storeroom_core::{SizeId, StoreId};

use crate::db::SizeRepository;
use crate::error::{AppError, Result};
use crate::middleware::{JsonBody, RequireUser, require_store_owner};
use crate::models::{Size, SizeInput};
use crate::state::AppState;
use crate::validation::{self, ValidationError};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/{store_id}/sizes", get(list).post(create))
        .route(
            "/api/{store_id}/sizes/{size_id}",
            get(show).patch(update).delete(destroy),
        )
}

#[derive(Debug, Default, Deserialize)]
pub struct SizeRequest {
    pub name: Option<String>,
    pub value: Option<String>,
}

impl TryFrom<SizeRequest> for SizeInput {
    type Error = ValidationError;

    fn try_from(req: SizeRequest) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            name: validation::required_text(req.name, "name")?,
            value: validation::required_text(req.value, "value")?,
        })
    }
}

#[instrument(skip_all, fields(store_id = %store_id))]
pub async fn create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(store_id): Path<StoreId>,
    JsonBody(body): JsonBody<SizeRequest>,
) -> Result<Json<Size>> {
    let input = SizeInput::try_from(body)?;
    require_store_owner(state.pool(), store_id, &user).await?;
    let size = SizeRepository::new(state.pool())
        .create(store_id, &input)
        .await?;
    Ok(Json(size))
}

pub async fn list(
    State(state): State<AppState>,
    Path(store_id): Path<StoreId>,
) -> Result<Json<Vec<Size>>> {
    Ok(Json(SizeRepository::new(state.pool()).list(store_id).await?))
}

pub async fn show(
    State(state): State<AppState>,
    Path((store_id, size_id)): Path<(StoreId, SizeId)>,
) -> Result<Json<Size>> {
    SizeRepository::new(state.pool())
        .get(store_id, size_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Size not found".to_string()))
}

#[instrument(skip_all, fields(store_id = %store_id, size_id = %size_id))]
pub async fn update(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path((store_id, size_id)): Path<(StoreId, SizeId)>,
    JsonBody(body): JsonBody<SizeRequest>,
) -> Result<Json<Size>> {
    let input = SizeInput::try_from(body)?;
    require_store_owner(state.pool(), store_id, &user).await?;
    let size = SizeRepository::new(state.pool())
        .update(store_id, size_id, &input)
        .await?;
    Ok(Json(size))
}

#[instrument(skip_all, fields(store_id = %store_id, size_id = %size_id))]
pub async fn destroy(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path((store_id, size_id)): Path<(StoreId, SizeId)>,
) -> Result<Json<serde_json::Value>> {
    require_store_owner(state.pool(), store_id, &user).await?;
    SizeRepository::new(state.pool())
        .delete(store_id, size_id)
        .await?;
    Ok(Json(serde_json::json!({ "id": size_id })))
}
