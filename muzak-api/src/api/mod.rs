//! HTTP API handlers for muzak-api

pub mod error;
pub mod health;
pub mod index;
pub mod records;
pub mod stats;

pub use error::ApiError;
pub use health::health_check;
pub use index::get_index;
pub use records::{get_json, get_table};
pub use stats::get_stats;
