//! Billboard route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::Deserialize;
use tracing::instrument;

use storeroom_core::{BillboardId, HexColor, StoreId};

use crate::db::BillboardRepository;
use crate::error::{AppError, Result};
use crate::middleware::{JsonBody, RequireUser, require_store_owner};
use crate::models::{Billboard, BillboardInput};
use crate::state::AppState;
use crate::validation::{self, ValidationError};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/{store_id}/billboards", get(list).post(create))
        .route(
            "/api/{store_id}/billboards/{billboard_id}",
            get(show).patch(update).delete(destroy),
        )
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillboardRequest {
    pub label: Option<String>,
    pub image_url: Option<String>,
    pub text_color: Option<String>,
}

impl TryFrom<BillboardRequest> for BillboardInput {
    type Error = ValidationError;

    fn try_from(req: BillboardRequest) -> std::result::Result<Self, Self::Error> {
        let text_color = match validation::optional_text(req.text_color) {
            Some(raw) => validation::hex_color(Some(raw), "textColor")?,
            None => HexColor::black(),
        };

        Ok(Self {
            label: validation::name(req.label, "label")?,
            image_url: validation::required_url(req.image_url, "imageUrl")?,
            text_color,
        })
    }
}

#[instrument(skip_all, fields(store_id = %store_id))]
pub async fn create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(store_id): Path<StoreId>,
    JsonBody(body): JsonBody<BillboardRequest>,
) -> Result<Json<Billboard>> {
    let input = BillboardInput::try_from(body)?;
    require_store_owner(state.pool(), store_id, &user).await?;
    let billboard = BillboardRepository::new(state.pool())
        .create(store_id, &input)
        .await?;
    Ok(Json(billboard))
}

pub async fn list(
    State(state): State<AppState>,
    Path(store_id): Path<StoreId>,
) -> Result<Json<Vec<Billboard>>> {
    let billboards = BillboardRepository::new(state.pool()).list(store_id).await?;
    Ok(Json(billboards))
}

pub async fn show(
    State(state): State<AppState>,
    Path((store_id, billboard_id)): Path<(StoreId, BillboardId)>,
) -> Result<Json<Billboard>> {
    BillboardRepository::new(state.pool())
        .get(store_id, billboard_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Billboard not found".to_string()))
}

#[instrument(skip_all, fields(store_id = %store_id, billboard_id = %billboard_id))]
pub async fn update(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path((store_id, billboard_id)): Path<(StoreId, BillboardId)>,
    JsonBody(body): JsonBody<BillboardRequest>,
) -> Result<Json<Billboard>> {
    let input = BillboardInput::try_from(body)?;
    require_store_owner(state.pool(), store_id, &user).await?;
    let billboard = BillboardRepository::new(state.pool())
        .update(store_id, billboard_id, &input)
        .await?;
    Ok(Json(billboard))
}

#[instrument(skip_all, fields(store_id = %store_id, billboard_id = %billboard_id))]
pub async fn destroy(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path((store_id, billboard_id)): Path<(StoreId, BillboardId)>,
) -> Result<Json<Billboard>> {
    require_store_owner(state.pool(), store_id, &user).await?;
    let billboard = BillboardRepository::new(state.pool())
        .delete(store_id, billboard_id)
        .await?;
    Ok(Json(billboard))
}
