//! Store route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::Deserialize;
use tracing::instrument;

use storeroom_core::StoreId;

use crate::db::StoreRepository;
use crate::error::{AppError, Result};
use crate::middleware::{JsonBody, OptionalUser, RequireUser, require_store_owner};
use crate::models::{Store, StoreInput};
use crate::state::AppState;
use crate::validation::{self, ValidationError};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/stores", get(list).post(create))
        .route("/api/stores/{store_id}", get(show).patch(update).delete(destroy))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreRequest {
    pub name: Option<String>,
    pub logo_url: Option<String>,
}

impl TryFrom<StoreRequest> for StoreInput {
    type Error = ValidationError;

    fn try_from(req: StoreRequest) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            name: validation::name(req.name, "name")?,
            logo_url: validation::optional_url(req.logo_url, "logoUrl")?,
        })
    }
}

/// Create a store owned by the caller.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    JsonBody(body): JsonBody<StoreRequest>,
) -> Result<Json<Store>> {
    let input = StoreInput::try_from(body)?;
    let store = StoreRepository::new(state.pool())
        .create(&user.id, &input)
        .await?;
    Ok(Json(store))
}

/// The caller's stores, oldest first.
pub async fn list(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Vec<Store>>> {
    let stores = StoreRepository::new(state.pool())
        .list_for_owner(&user.id)
        .await?;
    Ok(Json(stores))
}

/// A single store. Public; a signed-in viewer is only recorded in the logs.
pub async fn show(
    State(state): State<AppState>,
    OptionalUser(viewer): OptionalUser,
    Path(store_id): Path<StoreId>,
) -> Result<Json<Store>> {
    let store = StoreRepository::new(state.pool())
        .get(store_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Store not found".to_string()))?;

    if let Some(viewer) = viewer {
        tracing::debug!(
            %store_id,
            user_id = %viewer.id,
            is_owner = store.is_owned_by(&viewer.id),
            "store viewed by signed-in user"
        );
    }
    Ok(Json(store))
}

#[instrument(skip_all, fields(store_id = %store_id))]
pub async fn update(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(store_id): Path<StoreId>,
    JsonBody(body): JsonBody<StoreRequest>,
) -> Result<Json<Store>> {
    let input = StoreInput::try_from(body)?;
    require_store_owner(state.pool(), store_id, &user).await?;
    let store = StoreRepository::new(state.pool())
        .update(store_id, &input)
        .await?;
    Ok(Json(store))
}

/// Delete a store and everything it owns.
#[instrument(skip_all, fields(store_id = %store_id))]
pub async fn destroy(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(store_id): Path<StoreId>,
) -> Result<Json<Store>> {
    require_store_owner(state.pool(), store_id, &user).await?;
    let store = StoreRepository::new(state.pool()).delete(store_id).await?;
    Ok(Json(store))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_store_request_validation() {
        let input = StoreInput::try_from(StoreRequest {
            name: Some("  Corner Shop ".to_string()),
            logo_url: Some(String::new()),
        })
        .unwrap();
        assert_eq!(input.name, "Corner Shop");
        assert_eq!(input.logo_url, None);

        assert_eq!(
            StoreInput::try_from(StoreRequest::default()).unwrap_err(),
            ValidationError::Missing("name")
        );
        assert!(
            StoreInput::try_from(StoreRequest {
                name: Some("Corner Shop".to_string()),
                logo_url: Some("javascript:alert(1)".to_string()),
            })
            .is_err()
        );
    }
}
