//! Application state and dependency injection.

mod admin;
mod config;
mod state;

pub use crate::service::admin::AdminToken;
pub use crate::service::config::ServiceConfig;
pub use crate::service::state::ServiceState;

/// Tracing target for service initialization.
pub const TRACING_TARGET: &str = "beacon_server::service";
