//! Product review handlers. Shoppers are anonymous, so both routes are public.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use serde::Deserialize;
use tracing::instrument;

use storeroom_core::{ProductId, StoreId};

use crate::db::{ProductRepository, ReviewRepository};
use crate::error::{AppError, Result};
use crate::middleware::JsonBody;
use crate::models::{Review, ReviewInput, ReviewWithProduct};
use crate::state::AppState;
use crate::validation::{self, ValidationError};

pub fn router() -> Router<AppState> {
    Router::new().route(
        "/api/{store_id}/products/{product_id}/reviews",
        get(list).post(create),
    )
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub message: Option<String>,
    pub rating: Option<i64>,
}

impl TryFrom<ReviewRequest> for ReviewInput {
    type Error = ValidationError;

    fn try_from(req: ReviewRequest) -> std::result::Result<Self, Self::Error> {
        Ok(Self {
            first_name: validation::required_text(req.first_name, "firstName")?,
            last_name: validation::required_text(req.last_name, "lastName")?,
            message: validation::required_text(req.message, "message")?,
            rating: validation::rating(req.rating, "rating")?,
        })
    }
}

pub async fn list(
    State(state): State<AppState>,
    Path((store_id, product_id)): Path<(StoreId, ProductId)>,
) -> Result<Json<Vec<ReviewWithProduct>>> {
    let reviews = ReviewRepository::new(state.pool())
        .list_for_product(store_id, product_id)
        .await?;
    Ok(Json(reviews))
}

#[instrument(skip_all, fields(store_id = %store_id, product_id = %product_id))]
pub async fn create(
    State(state): State<AppState>,
    Path((store_id, product_id)): Path<(StoreId, ProductId)>,
    JsonBody(body): JsonBody<ReviewRequest>,
) -> Result<Json<Review>> {
    let input = ReviewInput::try_from(body)?;
    if !ProductRepository::new(state.pool())
        .exists(store_id, product_id)
        .await?
    {
        return Err(AppError::NotFound("Product not found".to_string()));
    }
    let review = ReviewRepository::new(state.pool())
        .create(product_id, &input)
        .await?;
    Ok(Json(review))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_validation() {
        let request = |rating| ReviewRequest {
            first_name: Some("Ann".to_string()),
            last_name: Some("Lee".to_string()),
            message: Some("Fits well".to_string()),
            rating,
        };
        assert!(ReviewInput::try_from(request(Some(4))).is_ok());
        assert!(ReviewInput::try_from(request(Some(6))).is_err());
        assert!(matches!(
            ReviewInput::try_from(request(None)),
            Err(ValidationError::Missing("rating"))
        ));
    }
}
