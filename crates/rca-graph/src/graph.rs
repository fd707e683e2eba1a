//! The topology graph itself: nodes, edges, and the traversal queries the
//! rule engine runs against it (§4.1).

use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

pub type NodeId = String;

/// Which direction to walk edges in a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Out,
    In,
    Both,
}

/// A single directed, labeled edge. Parallel edges (same src/dst/rel) are
/// legal and never deduplicated on insertion (§3 Invariants).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub src: NodeId,
    pub dst: NodeId,
    pub rel: String,
}

/// Arbitrary node metadata. Always carries `kind` and, when applicable,
/// `namespace`, but is otherwise an open map — mirrors the original's
/// `dict.update(**meta)` semantics rather than a closed struct.
pub type NodeMeta = Map<String, Value>;

/// A directed, heterogeneous multigraph of cluster entities.
///
/// `nodes` is keyed by node id in a `BTreeMap` for deterministic iteration
/// order (grounded on `peeps-waitgraph::WaitGraph`, which keys its node
/// table the same way); the adjacency lists preserve edge insertion order
/// within each node's entry.
#[derive(Debug, Clone, Default)]
pub struct TopologyGraph {
    nodes: BTreeMap<NodeId, NodeMeta>,
    adj: BTreeMap<NodeId, Vec<(NodeId, String)>>,
    radj: BTreeMap<NodeId, Vec<(NodeId, String)>>,
}

impl TopologyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a node if absent and merges `meta` into its metadata map,
    /// overwriting keys already present. Mirrors `Graph.add_node`.
    pub fn add_node(&mut self, id: impl Into<NodeId>, meta: NodeMeta) {
        let id = id.into();
        self.adj.entry(id.clone()).or_default();
        self.radj.entry(id.clone()).or_default();
        let entry = self.nodes.entry(id).or_default();
        for (k, v) in meta {
            entry.insert(k, v);
        }
    }

    /// Adds an edge, implicitly creating both endpoints as bare nodes if
    /// they don't already exist (§3 Invariants: every edge endpoint appears
    /// as a node).
    pub fn add_edge(&mut self, src: impl Into<NodeId>, dst: impl Into<NodeId>, rel: impl Into<String>) {
        let src = src.into();
        let dst = dst.into();
        let rel = rel.into();
        self.nodes.entry(src.clone()).or_default();
        self.nodes.entry(dst.clone()).or_default();
        self.adj.entry(src.clone()).or_default().push((dst.clone(), rel.clone()));
        self.radj.entry(dst.clone()).or_default().push((src.clone(), rel));
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node_meta(&self, id: &str) -> Option<&NodeMeta> {
        self.nodes.get(id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn out_edges(&self, id: &str) -> &[(NodeId, String)] {
        self.adj.get(id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    fn in_edges(&self, id: &str) -> &[(NodeId, String)] {
        self.radj.get(id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// All `(neighbor, relation)` pairs reachable in one hop, including
    /// duplicates contributed by parallel edges.
    pub fn neighbors(&self, id: &str, direction: Direction) -> Vec<(NodeId, String)> {
        match direction {
            Direction::Out => self.out_edges(id).to_vec(),
            Direction::In => self.in_edges(id).to_vec(),
            Direction::Both => {
                let mut v = self.out_edges(id).to_vec();
                v.extend(self.in_edges(id).to_vec());
                v
            }
        }
    }

    /// Breadth-first traversal from `seeds`, returning every node reachable
    /// within `max_hops` edges (seeds included), in BFS discovery order —
    /// which for nodes at the same hop distance follows the insertion order
    /// of the adjacency lists they were discovered through. Root selection
    /// relies on this order to break ties deterministically (§4.3). Seeds
    /// absent from the graph are ignored.
    pub fn bfs(&self, seeds: &[&str], max_hops: u32, direction: Direction) -> Vec<NodeId> {
        let mut queue: VecDeque<(NodeId, u32)> = VecDeque::new();
        let mut seen: BTreeSet<NodeId> = BTreeSet::new();
        let mut order: Vec<NodeId> = Vec::new();
        for &s in seeds {
            if self.contains_node(s) && seen.insert(s.to_string()) {
                order.push(s.to_string());
                queue.push_back((s.to_string(), 0));
            }
        }
        while let Some((id, depth)) = queue.pop_front() {
            if depth == max_hops {
                continue;
            }
            for (next, _rel) in self.neighbors(&id, direction) {
                if seen.insert(next.clone()) {
                    order.push(next.clone());
                    queue.push_back((next, depth + 1));
                }
            }
        }
        order
    }

    /// Minimum hop count between `a` and `b`, or `None` when unreachable
    /// within `max_hops` or either endpoint is unknown.
    pub fn shortest_path_len(&self, a: &str, b: &str, direction: Direction, max_hops: u32) -> Option<u32> {
        if !self.contains_node(a) || !self.contains_node(b) {
            return None;
        }
        if a == b {
            return Some(0);
        }
        let mut queue: VecDeque<(NodeId, u32)> = VecDeque::new();
        let mut seen: BTreeMap<NodeId, ()> = BTreeMap::new();
        seen.insert(a.to_string(), ());
        queue.push_back((a.to_string(), 0));
        while let Some((id, depth)) = queue.pop_front() {
            if id == b {
                return Some(depth);
            }
            if depth == max_hops {
                continue;
            }
            for (next, _rel) in self.neighbors(&id, direction) {
                if !seen.contains_key(&next) {
                    seen.insert(next.clone(), ());
                    queue.push_back((next, depth + 1));
                }
            }
        }
        None
    }

    /// Deduplicated `(src, dst, rel)` triples, in first-seen order, for
    /// serialization (§4.1 `_iter_edges`).
    pub fn iter_edges(&self) -> Vec<Edge> {
        let mut seen: BTreeMap<(NodeId, NodeId, String), ()> = BTreeMap::new();
        let mut out = Vec::new();
        for (src, edges) in &self.adj {
            for (dst, rel) in edges {
                let key = (src.clone(), dst.clone(), rel.clone());
                if seen.insert(key, ()).is_none() {
                    out.push(Edge { src: src.clone(), dst: dst.clone(), rel: rel.clone() });
                }
            }
        }
        out
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }
}
