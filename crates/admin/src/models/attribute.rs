//! Size and color attributes attached to products.

use chrono::{DateTime, Utc};
use serde::Serialize;

use storeroom_core::{ColorId, HexColor, SizeId, StoreId};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Size {
    pub id: SizeId,
    pub store_id: StoreId,
    pub name: String,
    /// Short code shown to shoppers, e.g. `XL` or `42`.
    pub value: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Color {
    pub id: ColorId,
    pub store_id: StoreId,
    pub name: String,
    pub value: HexColor,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated size input.
#[derive(Debug, Clone)]
pub struct SizeInput {
    pub name: String,
    pub value: String,
}

/// Validated color input.
#[derive(Debug, Clone)]
pub struct ColorInput {
    pub name: String,
    pub value: HexColor,
}
