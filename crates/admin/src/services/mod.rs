//! Business logic that spans repositories and upstream clients.
//!
//! # Services
//!
//! - `checkout` - Pending order plus hosted checkout session
//! - `fulfillment` - Applying a completed checkout from the payment webhook

pub mod checkout;
pub mod fulfillment;

pub use checkout::start_checkout;
pub use fulfillment::{completion_from_session, handle_event};
