//! Domain types for the leettrack backend.

pub mod auth;
pub mod errors;
pub mod newtypes;
pub mod sync;

use serde::Serialize;

pub use auth::*;
pub use errors::*;
pub use newtypes::*;
pub use sync::*;

/// Health check response.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub build_sha: String,
    pub uptime_seconds: u64,
}

/// Ready check response.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ReadyResponse {
    pub status: String,
    pub database: String,
}
