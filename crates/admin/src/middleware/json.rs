//! JSON request body extractor with plain-text rejections.
//!
//! `axum::Json` answers malformed or mistyped bodies with 400/415/422 and
//! its own wording. Handlers take [`JsonBody`] instead so every body
//! problem is a 400 in the same format as validation failures.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Deserialized JSON request body.
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection_message(&rejection)))?;
        Ok(Self(value))
    }
}

fn rejection_message(rejection: &JsonRejection) -> String {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => {
            "Expected a JSON body (Content-Type: application/json)".to_string()
        }
        JsonRejection::JsonSyntaxError(_) => "Request body is not valid JSON".to_string(),
        other => format!("Invalid request body: {}", other.body_text()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header::CONTENT_TYPE},
        routing::post,
    };
    use rust_decimal::Decimal;
    use serde::Deserialize;
    use tower::ServiceExt;

    use super::*;

    #[derive(Deserialize)]
    struct PriceBody {
        price: Option<Decimal>,
    }

    async fn echo(JsonBody(body): JsonBody<PriceBody>) -> String {
        body.price.map(|p| p.to_string()).unwrap_or_default()
    }

    async fn send(content_type: Option<&str>, body: &'static str) -> (StatusCode, String) {
        let mut request = Request::post("/");
        if let Some(content_type) = content_type {
            request = request.header(CONTENT_TYPE, content_type);
        }
        let response = Router::new()
            .route("/", post(echo))
            .oneshot(request.body(Body::from(body)).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_well_formed_body() {
        let (status, body) = send(Some("application/json"), r#"{"price": "12.50"}"#).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "12.50");
    }

    #[tokio::test]
    async fn test_mistyped_field_is_bad_request() {
        let (status, body) = send(Some("application/json"), r#"{"price": "abc"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.starts_with("Invalid request body: "), "{body}");
        assert!(body.contains("price"), "{body}");
    }

    #[tokio::test]
    async fn test_syntax_and_content_type_errors_are_bad_request() {
        let (status, body) = send(Some("application/json"), "{").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Request body is not valid JSON");

        let (status, body) = send(None, r#"{"price": "1"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Expected a JSON body (Content-Type: application/json)");
    }
}
