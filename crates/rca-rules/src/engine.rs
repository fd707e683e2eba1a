//! Evaluates rules against an episode and scores candidates against the
//! topology graph (§4.3).

use crate::schema::{Rule, ScoreWeights, Signal, When};
use rca_graph::{Direction, TopologyGraph};
use rca_types::{round4, CandidateRoot, Episode, ScoreBreakdown, CLUSTER_COMPONENT};

const MAX_BFS_HOPS: u32 = 3;
const MAX_PATH_HOPS: u32 = 8;
const FOCUS_PRIORITY: [&str; 3] = ["pod", "node", "namespace"];
const MAX_CANDIDATES: usize = 3;

fn signal_matches(episode: &Episode, signal: &Signal) -> bool {
    match signal {
        Signal::Metric { name, op, value } => {
            let Some(x) = episode.features.get(name) else { return false };
            match op.as_str() {
                "<" => x < *value,
                "<=" => x <= *value,
                ">" => x > *value,
                ">=" => x >= *value,
                "==" => x == *value,
                "!=" => x != *value,
                _ => {
                    tracing::warn!(op, "unknown comparison operator, signal evaluates false");
                    false
                }
            }
        }
        Signal::Event { substring } | Signal::LogPattern { substring } => {
            let needle = substring.to_lowercase();
            episode.events.iter().any(|e| {
                e.msg
                    .as_deref()
                    .map(|m| m.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            })
        }
        Signal::Unknown => false,
    }
}

fn when_matches(episode: &Episode, when: &When) -> bool {
    match when {
        When::All(signals) => signals.iter().all(|s| signal_matches(episode, s)),
        When::Any(signals) => signals.iter().any(|s| signal_matches(episode, s)),
        When::Unconditional => true,
    }
}

/// Picks the focus entity id: first value of the highest-priority kind
/// present, prefixed with `<kind>/` unless the value already contains a
/// `/` (§4.3 Focus selection). Pod ids in the graph are namespace-qualified
/// (`pod/<ns>/<name>`, §4.1), so a bare pod value is qualified with the
/// episode's namespace entity when one was observed, to actually land on a
/// node the graph knows about.
fn select_focus(episode: &Episode) -> Option<String> {
    let namespace = episode.entities.by_kind("namespace").first();
    for kind in FOCUS_PRIORITY {
        if let Some(value) = episode.entities.by_kind(kind).first() {
            if value.contains('/') {
                return Some(value.clone());
            }
            return Some(match namespace {
                Some(ns) if kind == "pod" => format!("{kind}/{ns}/{value}"),
                _ => format!("{kind}/{value}"),
            });
        }
    }
    None
}

/// Topology score given a hop distance: `max(0, 1 - 0.2*hops)` (§4.3 Root selection).
fn topology_score_for_hops(hops: u32) -> f64 {
    (1.0 - 0.2 * hops as f64).max(0.0)
}

/// Finds the nearest node whose id starts with `<root_component>/`,
/// reachable from `focus` within [`MAX_BFS_HOPS`]. Ties at the same hop
/// distance are broken by `graph.bfs`'s discovery order, which follows the
/// insertion order of each node's adjacency list — `Iterator::min_by_key`
/// keeps the first of equal minima, so walking `reachable` (already in that
/// order) rather than a hop-sorted copy is what makes the tie-break
/// deterministic per the graph's snapshot order (§4.3 Root selection, §9
/// Design Notes).
fn select_root(graph: &TopologyGraph, focus: &str, root_component: &str) -> Option<(String, u32)> {
    let prefix = format!("{root_component}/");
    let reachable = graph.bfs(&[focus], MAX_BFS_HOPS, Direction::Both);
    reachable
        .into_iter()
        .filter(|n| n.starts_with(&prefix))
        .filter_map(|n| {
            graph
                .shortest_path_len(focus, &n, Direction::Both, MAX_PATH_HOPS)
                .map(|hops| (n, hops))
        })
        .min_by_key(|(_, hops)| *hops)
}

fn score_candidate(episode: &Episode, weights: &ScoreWeights, topology_score: f64) -> ScoreBreakdown {
    ScoreBreakdown {
        temporal: weights.temporal,
        topology: weights.topology * topology_score,
        magnitude: weights.magnitude * episode.features.error_ratio.min(1.0),
        change: weights.change_flag * episode.features.rollout_in_window,
    }
}

/// Evaluates every rule against `episode`, returning at most
/// [`MAX_CANDIDATES`] candidates sorted by descending score (ties broken by
/// rule-file order, §4.3 Emission).
pub fn apply_rules(episode: &Episode, rules: &[Rule], graph: &TopologyGraph) -> Vec<CandidateRoot> {
    let mut candidates = Vec::new();
    for rule in rules {
        if !when_matches(episode, &rule.when) {
            continue;
        }

        let focus = select_focus(episode);
        let (component, topology_score) = match (&rule.root_component, &focus) {
            (Some(root_component), Some(focus_id)) => match select_root(graph, focus_id, root_component) {
                Some((target, hops)) => (target, topology_score_for_hops(hops)),
                None => {
                    tracing::warn!(
                        rule = %rule.id,
                        root_component,
                        "no reachable node matched root_component, topology score 0"
                    );
                    (focus_id.clone(), 0.0)
                }
            },
            (_, Some(focus_id)) => (focus_id.clone(), 0.0),
            (_, None) => (CLUSTER_COMPONENT.to_string(), 0.0),
        };

        let score_breakdown = score_candidate(episode, &rule.score, topology_score);
        let score = round4(score_breakdown.total());
        candidates.push(CandidateRoot {
            component,
            reason: rule.reason.clone(),
            evidence: rule.evidence.clone(),
            score_breakdown,
            score,
        });
    }

    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    candidates.truncate(MAX_CANDIDATES);
    candidates
}
