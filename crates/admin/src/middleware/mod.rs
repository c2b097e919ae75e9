//! HTTP middleware and extractors for the console API.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors, per-request hub)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers (JSON API policy)
//!
//! Authentication is per-handler through the [`RequireUser`] and
//! [`OptionalUser`] extractors rather than a layer, because storefront reads
//! on the same paths are public.

pub mod auth;
pub mod json;
pub mod request_id;
pub mod security_headers;

pub use auth::{OptionalUser, RequireUser, require_store_owner};
pub use json::JsonBody;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
