//! A scored root-cause suggestion emitted per matching rule (§4.3).

use serde::{Deserialize, Serialize};

/// The four named components that sum (up to rounding) to a candidate's
/// total score (§7/§9).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub temporal: f64,
    pub topology: f64,
    pub magnitude: f64,
    pub change: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.temporal + self.topology + self.magnitude + self.change
    }
}

/// Sentinel component used when a rule has no focus entity to attach to.
pub const CLUSTER_COMPONENT: &str = "cluster";

/// A single scored suggestion for the root cause of an episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRoot {
    /// Graph node id, or [`CLUSTER_COMPONENT`].
    pub component: String,
    pub reason: String,
    pub evidence: Vec<String>,
    pub score_breakdown: ScoreBreakdown,
    /// Finite, non-negative, rounded to four decimal places.
    pub score: f64,
}

/// Rounds to four decimal places, matching the original's `round(x, 4)`.
pub fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}
