//! Store (tenant) domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use storeroom_core::{StoreId, UserId};

/// A store owned by one identity-provider user.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    pub logo_url: Option<String>,
    /// Identity subject of the owner.
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Store {
    #[must_use]
    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.user_id == user
    }
}

/// Validated input for creating or renaming a store.
#[derive(Debug, Clone)]
pub struct StoreInput {
    pub name: String,
    pub logo_url: Option<String>,
}
