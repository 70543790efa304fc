//! Middleware module
//!
//! This module contains extractors and layers for request processing

pub mod auth;
pub mod logging;

// Re-export commonly used middleware
pub use auth::{AuthUser, BearerToken, MaybeAuthUser, RequireAdmin};
pub use logging::{cors_layer, trace_layer};
