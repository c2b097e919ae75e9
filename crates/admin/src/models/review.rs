//! Product reviews left by anonymous shoppers.

use chrono::{DateTime, Utc};
use serde::Serialize;

use storeroom_core::{ProductId, Rating, ReviewId};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub first_name: String,
    pub last_name: String,
    pub message: String,
    pub rating: Rating,
    pub created_at: DateTime<Utc>,
}

/// A review listed alongside the name of the product it is about.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewWithProduct {
    #[serde(flatten)]
    pub review: Review,
    pub product_name: String,
}

#[derive(Debug, Clone)]
pub struct ReviewInput {
    pub first_name: String,
    pub last_name: String,
    pub message: String,
    pub rating: Rating,
}
