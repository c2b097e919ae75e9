//! Storeroom Core - Shared domain types.
//!
//! This crate provides the types shared by every Storeroom component:
//! - `admin` - The store console HTTP API
//! - `cli` - Command-line tools for migrations and store bootstrap
//!
//! # Architecture
//!
//! The core crate contains only types and parsing rules - no I/O, no database
//! access, no HTTP clients. Database encoding lives behind the `postgres`
//! feature so the types stay usable anywhere.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, prices, colors, ratings, emails and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
