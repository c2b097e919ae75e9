//! HTTP route handlers for the console API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                                      - Liveness
//! GET    /health/ready                                - Readiness (database)
//!
//! # Stores (auth unless noted)
//! GET    /api/stores                                  - Caller's stores
//! POST   /api/stores                                  - Create store
//! GET    /api/stores/{storeId}                        - Store (public)
//! PATCH  /api/stores/{storeId}                        - Rename / relogo (owner)
//! DELETE /api/stores/{storeId}                        - Delete store (owner)
//!
//! # Catalog (GET public, writes owner-only)
//! GET|POST              /api/{storeId}/billboards
//! GET|PATCH|DELETE      /api/{storeId}/billboards/{billboardId}
//! GET|POST              /api/{storeId}/categories
//! GET|PATCH|DELETE      /api/{storeId}/categories/{categoryId}
//! GET|POST              /api/{storeId}/sizes
//! GET|PATCH|DELETE      /api/{storeId}/sizes/{sizeId}
//! GET|POST              /api/{storeId}/colors
//! GET|PATCH|DELETE      /api/{storeId}/colors/{colorId}
//! GET|POST              /api/{storeId}/products
//! GET                   /api/{storeId}/products/admin  - Console listing (owner)
//! GET|PATCH|DELETE      /api/{storeId}/products/{productId}
//! GET|POST              /api/{storeId}/products/{productId}/reviews (public)
//!
//! # Orders and payments
//! GET    /api/{storeId}/orders                        - Console listing (owner)
//! DELETE /api/{storeId}/orders/{orderId}              - Delete order (owner)
//! OPTIONS|POST /api/{storeId}/checkout                - Start checkout (CORS)
//! POST   /api/webhook                                 - Payment webhook (signed)
//! GET    /api/{storeId}/dashboard                     - Aggregates (owner)
//! ```

pub mod billboards;
pub mod categories;
pub mod checkout;
pub mod colors;
pub mod dashboard;
pub mod health;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod sizes;
pub mod stores;
pub mod webhook;

use axum::{Router, middleware::from_fn};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::middleware::{request_id_middleware, security_headers_middleware};
use crate::state::AppState;

/// Create all API routes.
pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(stores::router())
        .merge(billboards::router())
        .merge(categories::router())
        .merge(sizes::router())
        .merge(colors::router())
        .merge(products::router())
        .merge(reviews::router())
        .merge(orders::router())
        .merge(dashboard::router())
        .merge(checkout::router(state.config()))
        .merge(webhook::router())
}

/// The complete application with tracing, request IDs and security headers.
///
/// Sentry layers are added by the binary so tests run without a hub.
pub fn app(state: AppState) -> Router {
    routes(&state)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}
