//! Color route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::Deserialize;
use tracing::instrument;

use storeroom_core::{ColorId, StoreId};

use crate::db::ColorRepository;
use crate::error::{AppError, Result};
use crate::middleware::{JsonBody, RequireUser, require_store_owner};
use crate::models::{Color, ColorInput};
use crate::state::AppState;
use crate::validation::{self, ValidationError};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/{store_id}/colors", get(list).post(create))
        .route(
            "/api/{store_id}/colors/{color_id}",
            get(show).patch(update).delete(destroy),
        )
}

#[derive(Debug, Default, Deserialize)]
pub struct ColorRequest {
    pub name: Option<String>,
    pub value: Option<String>,
}

impl TryFrom<ColorRequest> for ColorInput {
    type Error = ValidationError;

    fn try_from(req: ColorRequest) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            name: validation::required_text(req.name, "name")?,
            value: validation::hex_color(req.value, "value")?,
        })
    }
}

#[instrument(skip_all, fields(store_id = %store_id))]
pub async fn create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(store_id): Path<StoreId>,
    JsonBody(body): JsonBody<ColorRequest>,
) -> Result<Json<Color>> {
    let input = ColorInput::try_from(body)?;
    require_store_owner(state.pool(), store_id, &user).await?;
    let color = ColorRepository::new(state.pool())
        .create(store_id, &input)
        .await?;
    Ok(Json(color))
}

pub async fn list(
    State(state): State<AppState>,
    Path(store_id): Path<StoreId>,
) -> Result<Json<Vec<Color>>> {
    Ok(Json(ColorRepository::new(state.pool()).list(store_id).await?))
}

pub async fn show(
    State(state): State<AppState>,
    Path((store_id, color_id)): Path<(StoreId, ColorId)>,
) -> Result<Json<Color>> {
    ColorRepository::new(state.pool())
        .get(store_id, color_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Color not found".to_string()))
}

#[instrument(skip_all, fields(store_id = %store_id, color_id = %color_id))]
pub async fn update(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path((store_id, color_id)): Path<(StoreId, ColorId)>,
    JsonBody(body): JsonBody<ColorRequest>,
) -> Result<Json<Color>> {
    let input = ColorInput::try_from(body)?;
    require_store_owner(state.pool(), store_id, &user).await?;
    let color = ColorRepository::new(state.pool())
        .update(store_id, color_id, &input)
        .await?;
    Ok(Json(color))
}

#[instrument(skip_all, fields(store_id = %store_id, color_id = %color_id))]
pub async fn destroy(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path((store_id, color_id)): Path<(StoreId, ColorId)>,
) -> Result<Json<serde_json::Value>> {
    require_store_owner(state.pool(), store_id, &user).await?;
    ColorRepository::new(state.pool())
        .delete(store_id, color_id)
        .await?;
    Ok(Json(serde_json::json!({ "id": color_id })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_value_must_be_hex() {
        let request = |value: &str| ColorRequest {
            name: Some("Navy".to_string()),
            value: Some(value.to_string()),
        };
        assert!(ColorInput::try_from(request("#001f3f")).is_ok());
        assert!(matches!(
            ColorInput::try_from(request("navy")),
            Err(ValidationError::Invalid { field: "value", .. })
        ));
    }
}
