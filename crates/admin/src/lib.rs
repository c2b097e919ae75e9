//! Storeroom Admin library.
//!
//! The store console API as a library, so the binary, the CLI and the
//! integration tests share one router and one set of repositories.
//!
//! # Security
//!
//! Every write is gated on a bearer token verified against the identity
//! provider and on ownership of the target store. The payment webhook is
//! authenticated by its signature alone.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod identity;
pub mod middleware;
pub mod models;
pub mod payments;
pub mod routes;
pub mod services;
pub mod state;
pub mod validation;
