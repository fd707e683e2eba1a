//! Shared domain types for the RCA core: events, episodes, candidate roots,
//! and incidents.

pub mod candidate;
pub mod episode;
pub mod event;
pub mod incident;
pub mod time;

pub use candidate::{round4, CandidateRoot, ScoreBreakdown, CLUSTER_COMPONENT};
pub use episode::{Episode, EpisodeEntities, Features, MAX_SAMPLED_EVENTS};
pub use event::{Event, MAX_MESSAGE_CHARS};
pub use incident::{Exemplar, Incident, MAX_EXEMPLARS};
pub use time::{millis_to_rfc3339, parse_timestamp_millis, TimestampParseError};
