//! Billboard domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use storeroom_core::{BillboardId, HexColor, StoreId};

/// A promotional banner shown above a category.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Billboard {
    pub id: BillboardId,
    pub store_id: StoreId,
    pub label: String,
    pub image_url: String,
    pub text_color: HexColor,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated billboard input.
#[derive(Debug, Clone)]
pub struct BillboardInput {
    pub label: String,
    pub image_url: String,
    pub text_color: HexColor,
}
