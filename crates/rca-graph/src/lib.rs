//! The topology graph: a typed, heterogeneous, directed multigraph of
//! cluster entities built from a declarative snapshot.

pub mod graph;
pub mod snapshot;
pub mod wire;

pub use graph::{Direction, Edge, NodeId, NodeMeta, TopologyGraph};
pub use snapshot::{build_from_snapshot, load_snapshot, RawSnapshot, SnapshotLoadError};
