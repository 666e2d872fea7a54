//! Training history types

use serde::{Deserialize, Serialize};

/// A completed exercise entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryDto {
    /// Backend identifier
    pub id: String,
    /// Exercise name
    pub name: String,
    /// Muscle group
    pub group: String,
    /// Time of day the exercise was done, as formatted by the backend
    pub hour: String,
    /// Creation timestamp, as sent by the backend
    #[serde(default)]
    pub created_at: Option<String>,
}

/// History entries of one day, titled by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryGroupDto {
    /// Day label (e.g. "26.08.22")
    pub title: String,
    /// Entries of that day
    pub data: Vec<HistoryDto>,
}

/// Counts all entries across day sections.
#[must_use]
pub fn total_entries(sections: &[HistoryGroupDto]) -> usize {
    sections.iter().map(|s| s.data.len()).sum()
}
