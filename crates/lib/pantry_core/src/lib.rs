//! # pantry_core
//!
//! Core domain logic for Pantry: credential store, token lifecycle,
//! and usage-quota metering.

pub mod auth;
pub mod db;
pub mod groceries;
pub mod migrate;
pub mod models;
pub mod quota;
pub mod uuid;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
