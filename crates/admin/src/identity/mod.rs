//! Bearer-token authentication against an external OIDC identity provider.
//!
//! The console never stores credentials. A request's bearer token is sent
//! to the provider's userinfo endpoint and the returned `sub` becomes the
//! [`UserId`](storeroom_core::UserId) that owns stores.

mod client;
mod error;

pub use client::IdentityClient;
pub use error::IdentityError;
