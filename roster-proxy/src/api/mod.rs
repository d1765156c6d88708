//! HTTP API handlers for roster-proxy

pub mod health;
pub mod members;

pub use health::{get_build_info, health_routes};
pub use members::{banner, forward_countries, forward_members};
