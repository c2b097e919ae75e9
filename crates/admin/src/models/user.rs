//! The authenticated console user.

use serde::{Deserialize, Serialize};

use storeroom_core::UserId;

/// A user verified by the identity provider for the current request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: Option<String>,
    pub name: Option<String>,
}
