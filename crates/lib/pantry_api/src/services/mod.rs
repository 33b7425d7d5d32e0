//! Service layer — orchestrates `pantry_core` operations for the API.

pub mod auth;
pub mod quota;
