//! Payment processor webhook.

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use tracing::warn;

use crate::payments::{Event, SIGNATURE_HEADER};
use crate::services::handle_event;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/webhook", post(receive))
}

fn rejection(reason: impl std::fmt::Display) -> Response {
    warn!(%reason, "webhook rejected");
    (StatusCode::BAD_REQUEST, format!("Webhook Error: {reason}")).into_response()
}

/// Verify, parse and apply a webhook event.
///
/// The signature covers the exact bytes received, so the body is taken raw.
pub async fn receive(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let Some(signature) = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
    else {
        return rejection("missing signature header");
    };

    if let Err(e) = state.payments().verify_webhook(&body, signature) {
        return rejection(e);
    }

    let event: Event = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => return rejection(format!("invalid payload: {e}")),
    };

    match handle_event(state.pool(), &event).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => e.into_response(),
    }
}
