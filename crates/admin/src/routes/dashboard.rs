//! Dashboard aggregates for the console overview.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use storeroom_core::StoreId;

use crate::db::AnalyticsRepository;
use crate::error::Result;
use crate::middleware::{RequireUser, require_store_owner};
use crate::models::DashboardStats;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/{store_id}/dashboard", get(show))
}

pub async fn show(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(store_id): Path<StoreId>,
) -> Result<Json<DashboardStats>> {
    require_store_owner(state.pool(), store_id, &user).await?;
    let stats = AnalyticsRepository::new(state.pool())
        .dashboard(store_id, state.currency())
        .await?;
    Ok(Json(stats))
}
