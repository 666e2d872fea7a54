//! Exercise catalogue types

use serde::{Deserialize, Serialize};

/// One exercise of a muscle group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseDto {
    /// Backend identifier
    pub id: String,
    /// Exercise name
    pub name: String,
    /// Number of series
    pub series: u32,
    /// Repetitions per series
    pub repetitions: u32,
    /// Muscle group
    pub group: String,
    /// Demo animation file name
    #[serde(default)]
    pub demo: Option<String>,
    /// Thumbnail file name
    #[serde(default)]
    pub thumb: Option<String>,
}

impl ExerciseDto {
    /// Short "3 séries x 12 repetições" style summary.
    #[must_use]
    pub fn summary(&self) -> String {
        format!("{} séries x {} repetições", self.series, self.repetitions)
    }
}
