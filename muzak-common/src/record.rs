//! Detection records and normalization of raw source output
//!
//! Every data source hands its output to [`normalize`] (or builds
//! [`Record`]s positionally) so renderers can always assume a list of
//! uniform key-value records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field order of rows read from the `songs` table
pub const SONG_COLUMNS: [&str; 4] = ["timestamp", "title", "artist", "audio_level"];

/// Key used when a non-object JSON value has to be wrapped into a record
pub const SCALAR_KEY: &str = "value";

/// One detection entry: field name -> scalar value, in source order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field, keeping insertion order
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Field names in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Build a record by pairing column names with values positionally
    pub fn from_columns<I>(columns: &[&str], values: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        columns
            .iter()
            .zip(values)
            .map(|(name, value)| (name.to_string(), value))
            .collect()
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Shape arbitrary JSON into an ordered list of records
///
/// - array: one record per element
/// - object: a single record
/// - null: no records
/// - any other scalar (and non-object array elements): wrapped as
///   `{"value": scalar}`
pub fn normalize(raw: Value) -> Vec<Record> {
    match raw {
        Value::Null => Vec::new(),
        Value::Array(items) => items.into_iter().map(into_record).collect(),
        other => vec![into_record(other)],
    }
}

fn into_record(value: Value) -> Record {
    match value {
        Value::Object(map) => Record(map),
        scalar => {
            let mut record = Record::new();
            record.insert(SCALAR_KEY, scalar);
            record
        }
    }
}
