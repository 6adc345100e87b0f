//! # API Shared
//!
//! Shared definitions for the Paeon HTTP surface.
//!
//! Contains:
//! - Request and response DTOs with OpenAPI schemas (`dto` module)
//! - Shared services like `HealthService`
//! - API key checking
//!
//! Used by `api-rest` and the root binary.

pub mod auth;
pub mod dto;
pub mod health;

pub use dto::*;
pub use health::HealthService;
