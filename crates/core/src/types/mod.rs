//! Core types for Storeroom.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod color;
pub mod email;
pub mod id;
pub mod price;
pub mod rating;
pub mod status;

pub use color::{HexColor, HexColorError};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{CurrencyCode, Price, PriceError};
pub use rating::{Rating, RatingError};
pub use status::PaymentStatus;
