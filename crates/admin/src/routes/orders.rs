//! Console order handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get},
};
use tracing::instrument;

use storeroom_core::{OrderId, StoreId};

use crate::db::OrderRepository;
use crate::error::Result;
use crate::middleware::{RequireUser, require_store_owner};
use crate::models::OrderListing;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/{store_id}/orders", get(list))
        .route("/api/{store_id}/orders/{order_id}", delete(destroy))
}

/// All orders of the store, newest first.
pub async fn list(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(store_id): Path<StoreId>,
) -> Result<Json<Vec<OrderListing>>> {
    require_store_owner(state.pool(), store_id, &user).await?;
    let orders = OrderRepository::new(state.pool())
        .list_for_console(store_id, state.currency())
        .await?;
    Ok(Json(orders))
}

#[instrument(skip_all, fields(store_id = %store_id, order_id = %order_id))]
pub async fn destroy(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path((store_id, order_id)): Path<(StoreId, OrderId)>,
) -> Result<Json<serde_json::Value>> {
    require_store_owner(state.pool(), store_id, &user).await?;
    OrderRepository::new(state.pool())
        .delete(store_id, order_id)
        .await?;
    Ok(Json(serde_json::json!({ "id": order_id })))
}
