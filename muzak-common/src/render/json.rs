//! JSON renderer
//!
//! Pure pass-through: records are serialized exactly as normalized,
//! without filtering or renaming fields.

use crate::record::Record;
use crate::Result;

/// Serialize records as a JSON array
pub fn render_json(records: &[Record]) -> Result<String> {
    Ok(serde_json::to_string(records)?)
}
