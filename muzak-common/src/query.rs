//! Request parameters shared by every data source

use crate::{Error, Result};
use std::fmt;

/// Row count used when a request does not name one
pub const DEFAULT_LIMIT: u32 = 100;

/// Validated row-count limit (always >= 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit(u32);

impl Limit {
    /// Validate a caller-supplied limit
    ///
    /// Zero and negative values are rejected rather than being read as
    /// "everything" or "nothing".
    pub fn new(value: i64) -> Result<Self> {
        if value < 1 {
            return Err(Error::InvalidInput(format!(
                "limit must be a positive integer, got {}",
                value
            )));
        }
        u32::try_from(value)
            .map(Self)
            .map_err(|_| Error::InvalidInput(format!("limit too large: {}", value)))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl Default for Limit {
    fn default() -> Self {
        Self(DEFAULT_LIMIT)
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
