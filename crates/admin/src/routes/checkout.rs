//! Storefront checkout endpoint.
//!
//! Called cross-origin from the storefront, so it carries its own CORS
//! layer.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderValue, Method, header},
    routing::post,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, CorsLayer};

use storeroom_core::{ProductId, StoreId};

use crate::config::AdminConfig;
use crate::error::Result;
use crate::middleware::JsonBody;
use crate::services::start_checkout;
use crate::state::AppState;

pub fn router(config: &AdminConfig) -> Router<AppState> {
    Router::new()
        .route("/api/{store_id}/checkout", post(create).options(preflight))
        .layer(cors_layer(&config.cors_allowed_origins))
}

/// CORS for storefront origins; any origin when none are configured.
#[must_use]
pub fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default)]
    pub product_ids: Vec<ProductId>,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub url: String,
}

pub async fn preflight() -> Json<serde_json::Value> {
    Json(serde_json::json!({}))
}

/// Create a pending order and return the hosted checkout URL.
pub async fn create(
    State(state): State<AppState>,
    Path(store_id): Path<StoreId>,
    JsonBody(body): JsonBody<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    let url = start_checkout(&state, store_id, &body.product_ids).await?;
    Ok(Json(CheckoutResponse { url }))
}
