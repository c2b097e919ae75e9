//! Payment processor errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP request failed.
    #[error("payment request failed: {0}")]
    Request(String),

    /// Failed to parse response.
    #[error("payment response error: {0}")]
    Response(String),

    /// The processor returned an error.
    #[error("payment API error: {0}")]
    Api(String),

    /// Webhook signature missing, malformed, stale or wrong.
    #[error("{0}")]
    InvalidSignature(String),

    /// A price cannot be expressed in minor units.
    #[error("invalid price: {0}")]
    Price(#[from] storeroom_core::PriceError),
}
