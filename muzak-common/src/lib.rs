//! # muzak Common Library
//!
//! Shared code for the muzak detection API:
//! - Error taxonomy
//! - Bootstrap configuration loading
//! - Detection records and the normalizer
//! - JSON and HTML table renderers
//! - Statistics snapshot types

pub mod config;
pub mod error;
pub mod query;
pub mod record;
pub mod render;
pub mod stats;

pub use error::{Error, Result};
pub use query::Limit;
pub use record::{normalize, Record};
pub use stats::{StatsSnapshot, TopSong};
