//! Shared types for the health-check service.

pub mod types;

pub use types::HealthStatus;
