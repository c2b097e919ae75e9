//! Shoppers who completed a checkout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use storeroom_core::{ClientId, Email};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: ClientId,
    pub email: Email,
    pub name: Option<String>,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

/// A postal address as collected by the hosted checkout page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

impl PostalAddress {
    /// The address on one line: present, non-blank parts joined by `", "`.
    #[must_use]
    pub fn single_line(&self) -> String {
        [
            &self.line1,
            &self.line2,
            &self.city,
            &self.state,
            &self.postal_code,
            &self.country,
        ]
        .into_iter()
        .filter_map(|part| part.as_deref().map(str::trim))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_line_skips_missing_parts() {
        let address = PostalAddress {
            line1: Some("1 Market St".to_string()),
            line2: Some("  ".to_string()),
            city: Some("San Francisco".to_string()),
            state: Some("CA".to_string()),
            postal_code: Some("94105".to_string()),
            country: Some("US".to_string()),
        };
        assert_eq!(
            address.single_line(),
            "1 Market St, San Francisco, CA, 94105, US"
        );
        assert_eq!(PostalAddress::default().single_line(), "");
    }
}
