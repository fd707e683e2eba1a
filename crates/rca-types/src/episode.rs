//! The episode: a (time-window, entity-tuple) grouping of events with
//! derived numeric features.

use crate::event::Event;
use serde::{Deserialize, Serialize};

/// Upper bound on the number of sampled events an episode carries (§4.2).
pub const MAX_SAMPLED_EVENTS: usize = 200;

/// Numeric aggregates computed once per episode (§4.2).
///
/// Modeled as a closed set of named fields rather than a generic
/// string-keyed map: the rule engine only ever looks up a fixed, small
/// vocabulary of metric names, so [`Features::get`] gives it generic
/// lookup-by-name without paying for an open map on the hot aggregation
/// path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Features {
    pub count: f64,
    pub error_ratio: f64,
    pub restarts: f64,
    pub http5xx: f64,
    pub rollout_in_window: f64,
}

impl Features {
    pub fn zero() -> Self {
        Self { count: 0.0, error_ratio: 0.0, restarts: 0.0, http5xx: 0.0, rollout_in_window: 0.0 }
    }

    /// Looks up a feature by the name used in rule files (§4.3 `metric` signals).
    pub fn get(&self, name: &str) -> Option<f64> {
        match name {
            "count" => Some(self.count),
            "error_ratio" => Some(self.error_ratio),
            "restarts" => Some(self.restarts),
            "http5xx" => Some(self.http5xx),
            "rollout_in_window" => Some(self.rollout_in_window),
            _ => None,
        }
    }
}

/// Distinct non-null entity values observed within an episode's group,
/// keyed by entity kind, preserving first-seen order (§4.2 Entities).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpisodeEntities {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub namespace: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pod: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub node: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub route: Vec<String>,
}

impl EpisodeEntities {
    /// Returns the values for a given entity kind, or an empty slice for an
    /// unrecognized kind name.
    pub fn by_kind(&self, kind: &str) -> &[String] {
        match kind {
            "namespace" => &self.namespace,
            "pod" => &self.pod,
            "node" => &self.node,
            "route" => &self.route,
            _ => &[],
        }
    }

    fn push_distinct(values: &mut Vec<String>, value: &str) {
        if !value.is_empty() && !values.iter().any(|v| v == value) {
            values.push(value.to_string());
        }
    }

    pub fn observe(&mut self, kind: &str, value: &str) {
        match kind {
            "namespace" => Self::push_distinct(&mut self.namespace, value),
            "pod" => Self::push_distinct(&mut self.pod, value),
            "node" => Self::push_distinct(&mut self.node, value),
            "route" => Self::push_distinct(&mut self.route, value),
            _ => {}
        }
    }
}

/// A bounded-time, entity-scoped grouping of events (§3, §4.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    pub episode_id: String,
    pub start_ms: i64,
    pub end_ms: i64,
    pub entities: EpisodeEntities,
    pub features: Features,
    /// First [`MAX_SAMPLED_EVENTS`] events of the group, in chronological order.
    pub events: Vec<Event>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn features_get_matches_rule_engine_metric_names() {
        let f = Features { count: 3.0, error_ratio: 0.5, restarts: 2.0, http5xx: 1.0, rollout_in_window: 1.0 };
        assert_eq!(f.get("error_ratio"), Some(0.5));
        assert_eq!(f.get("unknown_metric"), None);
    }

    #[test]
    fn entities_preserve_first_seen_order_and_dedupe() {
        let mut e = EpisodeEntities::default();
        e.observe("pod", "checkout-1");
        e.observe("pod", "checkout-2");
        e.observe("pod", "checkout-1");
        assert_eq!(e.pod, vec!["checkout-1".to_string(), "checkout-2".to_string()]);
    }

    #[test]
    fn entities_ignore_empty_values() {
        let mut e = EpisodeEntities::default();
        e.observe("namespace", "");
        assert!(e.namespace.is_empty());
    }
}
