//! Order payment status.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Whether an order has been paid for.
///
/// Orders persist a plain `is_paid` flag; this is the typed view used by
/// read models and the console listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Paid,
}

impl PaymentStatus {
    #[must_use]
    pub const fn is_paid(self) -> bool {
        matches!(self, Self::Paid)
    }
}

impl From<bool> for PaymentStatus {
    fn from(is_paid: bool) -> Self {
        if is_paid { Self::Paid } else { Self::Unpaid }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unpaid => write!(f, "Unpaid"),
            Self::Paid => write!(f, "Paid"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_flag() {
        assert_eq!(PaymentStatus::from(true), PaymentStatus::Paid);
        assert_eq!(PaymentStatus::from(false), PaymentStatus::Unpaid);
        assert!(PaymentStatus::Paid.is_paid());
    }

    #[test]
    fn test_serde_and_display() {
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Paid).unwrap(),
            "\"paid\""
        );
        assert_eq!(PaymentStatus::Unpaid.to_string(), "Unpaid");
    }
}
