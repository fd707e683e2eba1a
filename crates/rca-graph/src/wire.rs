//! JSON wire form of the graph: `{meta: {id -> meta}, edges: [{src,dst,rel}]}`
//! (§4.1 Serialization).

use crate::graph::{Edge, NodeMeta, TopologyGraph};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Serialize, Deserialize)]
struct WireEdge {
    src: String,
    dst: String,
    rel: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireGraph {
    #[serde(default)]
    meta: BTreeMap<String, NodeMeta>,
    #[serde(default)]
    edges: Vec<WireEdge>,
}

impl TopologyGraph {
    /// Serializes to the `{meta, edges}` JSON form, deduplicating edges via
    /// [`TopologyGraph::iter_edges`].
    pub fn to_json(&self) -> String {
        let mut meta = BTreeMap::new();
        for id in self.node_ids() {
            meta.insert(id.clone(), self.node_meta(id).cloned().unwrap_or_default());
        }
        let edges = self
            .iter_edges()
            .into_iter()
            .map(|Edge { src, dst, rel }| WireEdge { src, dst, rel })
            .collect();
        let wire = WireGraph { meta, edges };
        serde_json::to_string_pretty(&wire).unwrap_or_else(|_| "{}".to_string())
    }

    /// Parses the `{meta, edges}` JSON form back into a graph. Malformed
    /// top-level JSON yields an empty graph rather than an error, matching
    /// the builder's total failure semantics.
    pub fn from_json(s: &str) -> Self {
        let wire: WireGraph = match serde_json::from_str(s) {
            Ok(w) => w,
            Err(err) => {
                tracing::warn!(%err, "could not parse graph JSON, returning empty graph");
                return Self::new();
            }
        };
        let mut g = Self::new();
        for (id, meta) in wire.meta {
            g.add_node(id, meta);
        }
        for e in wire.edges {
            g.add_edge(e.src, e.dst, e.rel);
        }
        g
    }
}
