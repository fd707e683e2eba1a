//! The episode builder: a windowed aggregator that partitions a
//! heterogeneous event stream into (time-window x entity-tuple) groups and
//! computes per-group features.

pub mod error;
pub mod table;
pub mod windowing;

pub use error::EpisodeBuildError;
pub use table::load_events;
pub use windowing::{build_episodes, DEFAULT_WINDOW_SECS};
