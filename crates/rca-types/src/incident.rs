//! The per-episode output record (§6): one JSON document per episode.

use crate::candidate::CandidateRoot;
use crate::episode::EpisodeEntities;
use crate::event::Event;
use crate::time::millis_to_rfc3339;
use serde::{Deserialize, Serialize};

/// Upper bound on the number of exemplar events attached to an incident.
pub const MAX_EXEMPLARS: usize = 10;

/// A trimmed, output-facing projection of an [`Event`] (§6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exemplar {
    pub ts: String,
    pub source: Option<String>,
    pub ns: Option<String>,
    pub pod: Option<String>,
    pub node: Option<String>,
    pub code: Option<i64>,
    pub msg: Option<String>,
}

impl From<&Event> for Exemplar {
    fn from(e: &Event) -> Self {
        Exemplar {
            ts: millis_to_rfc3339(e.ts_ms),
            source: e.source.clone(),
            ns: e.namespace.clone(),
            pod: e.pod.clone(),
            node: e.node.clone(),
            code: e.code,
            msg: e.msg.clone(),
        }
    }
}

/// One incident: an episode plus its ranked root-cause candidates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    pub episode_id: String,
    pub start: String,
    pub end: String,
    pub entities: EpisodeEntities,
    pub features: crate::episode::Features,
    /// At most 3, sorted by descending score (§4.3).
    pub candidates: Vec<CandidateRoot>,
    /// At most [`MAX_EXEMPLARS`], in chronological order.
    pub exemplars: Vec<Exemplar>,
}
