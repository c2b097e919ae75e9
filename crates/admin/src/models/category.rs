//! Category domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use storeroom_core::{BillboardId, CategoryId, StoreId};

use super::Billboard;

/// A product category, fronted by a billboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub store_id: StoreId,
    pub billboard_id: BillboardId,
    pub name: String,
    /// Label of the billboard, for listings.
    pub billboard_label: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A category together with its full billboard.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDetail {
    #[serde(flatten)]
    pub category: Category,
    pub billboard: Billboard,
}

/// Validated category input.
#[derive(Debug, Clone)]
pub struct CategoryInput {
    pub name: String,
    pub billboard_id: BillboardId,
}
