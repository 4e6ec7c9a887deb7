//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - The reqwest-based attendance server client
//! - Tokio runtime bridge for async operations

pub mod attendance;
pub mod runtime;
