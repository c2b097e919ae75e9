//! Hosted checkout and webhook verification for the payment processor.
//!
//! Checkout sessions are created through the processor's form-encoded REST
//! API. Completion arrives later as a signed webhook event; see
//! [`verify_signature`].

mod client;
mod error;
mod signature;
mod types;

pub use client::PaymentClient;
pub use error::PaymentError;
pub use signature::{SIGNATURE_HEADER, verify_signature};
pub use types::{CHECKOUT_COMPLETED, CheckoutSession, CustomerDetails, Event, SessionAddress};
