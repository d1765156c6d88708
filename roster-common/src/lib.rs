//! # Roster Common Library
//!
//! Shared code for the member roster directory:
//! - Member model and the lenient raw-record decoder
//! - Upstream query shapes (filter body, filtered-table response)
//! - Search form option lists and the bundled country table
//! - Directory events (EventBus)
//! - Configuration loading
//! - Common error type

pub mod config;
pub mod error;
pub mod events;
pub mod member;
pub mod options;
pub mod query;

pub use error::{Error, Result};
pub use member::Member;
