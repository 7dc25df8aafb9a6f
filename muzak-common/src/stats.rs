//! Aggregate statistics over the detection log

use serde::{Deserialize, Serialize};

/// Point-in-time aggregate over all stored detections
///
/// Computed fresh for every request; nothing is cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Number of detection rows
    pub total_detections: i64,
    /// Number of distinct (title, artist) pairs
    pub unique_songs: i64,
    /// Timestamp of the newest detection, if any
    pub last_detection: Option<String>,
    /// Most frequently detected song
    ///
    /// Ties are resolved by whatever order the database returns equal
    /// counts in, so the winner among equals is not deterministic.
    pub most_common: Option<TopSong>,
}

/// A (title, artist, count) triple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopSong {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub count: i64,
}
