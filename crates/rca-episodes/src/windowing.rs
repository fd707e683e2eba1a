//! Partitions events into fixed-width time windows, groups each window by
//! entity-key tuple, and computes per-group features (§4.2).

use rca_types::{Episode, EpisodeEntities, Event, Features, MAX_SAMPLED_EVENTS};
use std::collections::BTreeMap;

/// Default window width (10 minutes), used when the caller doesn't override it.
pub const DEFAULT_WINDOW_SECS: u64 = 600;

const KEY_COLUMNS: [&str; 3] = ["namespace", "pod", "node"];
const ENTITY_COLUMNS: [&str; 4] = ["namespace", "pod", "node", "route"];

/// The entity-key tuple a group is identified by; `None` in a slot means
/// that key column was absent from the event (a valid, distinct group —
/// `(null, ...)` is its own bucket, matching `groupby(dropna=False)`).
type GroupKey = Vec<Option<String>>;

fn window_start_ms(ts_ms: i64, window_ms: i64) -> i64 {
    ts_ms.div_euclid(window_ms) * window_ms
}

fn group_key(event: &Event, key_columns: &[&str]) -> GroupKey {
    key_columns
        .iter()
        .map(|col| match *col {
            "namespace" => event.namespace.clone(),
            "pod" => event.pod.clone(),
            "node" => event.node.clone(),
            _ => None,
        })
        .collect()
}

/// Which key columns are actually present anywhere in `events`, in the
/// canonical order, intersected with the requested `keys` (§4.2 Grouping).
fn present_key_columns<'a>(events: &[Event], keys: &[&'a str]) -> Vec<&'a str> {
    keys.iter()
        .copied()
        .filter(|col| {
            events.iter().any(|e| match *col {
                "namespace" => e.namespace.is_some(),
                "pod" => e.pod.is_some(),
                "node" => e.node.is_some(),
                _ => false,
            })
        })
        .collect()
}

/// FNV-1a over the group-key's debug representation, folded to 28 bits —
/// enough to avoid collisions at the modest per-window cardinalities this
/// system expects (§4.2 Episode id).
fn stable_hash_28bit(key_repr: &str) -> u32 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in key_repr.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    (hash as u32) & 0x0fff_ffff
}

fn group_key_repr(columns: &[&str], key: &GroupKey) -> String {
    if columns.is_empty() {
        return "_all".to_string();
    }
    let parts: Vec<String> = columns
        .iter()
        .zip(key.iter())
        .map(|(col, val)| format!("{col}={}", val.as_deref().unwrap_or("None")))
        .collect();
    parts.join(",")
}

fn episode_id(window_start_ms: i64, key_repr: &str) -> String {
    let window_start_ns = (window_start_ms as i128) * 1_000_000;
    format!("{window_start_ns}::{:07x}", stable_hash_28bit(key_repr))
}

fn compute_features(events: &[Event]) -> Features {
    let count = events.len() as f64;
    if count == 0.0 {
        return Features::zero();
    }
    let errors = events.iter().filter(|e| e.is_error_level()).count() as f64;
    let restarts: f64 = events.iter().filter_map(|e| e.container_restart).sum::<i64>() as f64;
    let http5xx = events.iter().filter(|e| e.is_http5xx()).count() as f64;
    let rollout_in_window = events
        .iter()
        .filter_map(|e| e.rollout_in_window)
        .fold(0.0_f64, f64::max);
    Features { count, error_ratio: errors / count, restarts, http5xx, rollout_in_window }
}

fn collect_entities(events: &[Event]) -> EpisodeEntities {
    let mut entities = EpisodeEntities::default();
    for e in events {
        for col in ENTITY_COLUMNS {
            let value = match col {
                "namespace" => e.namespace.as_deref(),
                "pod" => e.pod.as_deref(),
                "node" => e.node.as_deref(),
                "route" => e.route.as_deref(),
                _ => None,
            };
            if let Some(v) = value {
                entities.observe(col, v);
            }
        }
    }
    entities
}

/// Builds episodes from an (already-loaded) event list.
///
/// `window_secs` is the window width `W` (§4.2 Windowing); events with no
/// timestamp were already dropped at the table-loading stage, so every
/// event here is assigned to exactly one aligned window.
pub fn build_episodes(mut events: Vec<Event>, window_secs: u64) -> Vec<Episode> {
    events.sort_by_key(|e| e.ts_ms);
    let window_ms = (window_secs as i64).max(1) * 1000;

    // Computed once over the whole table, matching pandas' `groupby` where a
    // column's membership in the frame's schema doesn't change per window
    // (original_source/utils/episodes.py:61) — not re-derived per window,
    // which would let a column's presence in one window and absence in
    // another silently change grouping granularity across the run.
    let key_columns = present_key_columns(&events, &KEY_COLUMNS);

    let mut windows: BTreeMap<i64, Vec<Event>> = BTreeMap::new();
    for event in events {
        let w = window_start_ms(event.ts_ms, window_ms);
        windows.entry(w).or_default().push(event);
    }

    let mut episodes = Vec::new();
    for (wstart, wevents) in windows {
        if wevents.is_empty() {
            continue;
        }
        let wend = wstart + window_ms;

        let mut groups: BTreeMap<GroupKey, Vec<Event>> = BTreeMap::new();
        for event in wevents {
            let key = if key_columns.is_empty() { Vec::new() } else { group_key(&event, &key_columns) };
            groups.entry(key).or_default().push(event);
        }

        for (key, mut group_events) in groups {
            group_events.sort_by_key(|e| e.ts_ms);
            let key_repr = group_key_repr(&key_columns, &key);
            let features = compute_features(&group_events);
            let entities = collect_entities(&group_events);
            let events_sample: Vec<Event> = group_events.into_iter().take(MAX_SAMPLED_EVENTS).collect();
            episodes.push(Episode {
                episode_id: episode_id(wstart, &key_repr),
                start_ms: wstart,
                end_ms: wend,
                entities,
                features,
                events: events_sample,
            });
        }
    }
    episodes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evt(ts_ms: i64, pod: &str, level: Option<&str>) -> Event {
        Event {
            ts_ms,
            source: Some("app".into()),
            namespace: Some("shop".into()),
            pod: Some(pod.into()),
            node: Some("n1".into()),
            level: level.map(|l| l.to_string()),
            verb: None,
            code: None,
            route: None,
            msg: Some("NodeNotReady".into()),
            container_restart: Some(0),
            rollout_in_window: None,
            extras: Vec::new(),
        }
    }

    #[test]
    fn single_window_single_group_computes_error_ratio() {
        let events: Vec<Event> = (0..20).map(|i| evt(i * 1000, "checkout-1", Some("error"))).collect();
        let episodes = build_episodes(events, 600);
        assert_eq!(episodes.len(), 1);
        assert_eq!(episodes[0].features.error_ratio, 1.0);
        assert_eq!(episodes[0].features.count, 20.0);
    }

    #[test]
    fn distinct_pods_in_same_window_form_distinct_groups() {
        let mut events = vec![evt(0, "a", None), evt(1000, "b", None)];
        events[0].level = Some("info".to_string());
        events[1].level = Some("error".to_string());
        let episodes = build_episodes(events, 600);
        assert_eq!(episodes.len(), 2);
    }

    #[test]
    fn multi_window_split_produces_distinct_episode_ids_and_disjoint_exemplars() {
        // 25 minutes of events at 1-minute spacing, 10-minute windows -> 3 windows.
        let events: Vec<Event> = (0..25).map(|m| evt(m * 60_000, "checkout-1", None)).collect();
        let episodes = build_episodes(events, 600);
        assert_eq!(episodes.len(), 3);
        let ids: std::collections::BTreeSet<_> = episodes.iter().map(|e| e.episode_id.clone()).collect();
        assert_eq!(ids.len(), 3);
        // exemplar timestamps never straddle a window boundary
        for ep in &episodes {
            for e in &ep.events {
                assert!(ep.start_ms <= e.ts_ms && e.ts_ms < ep.end_ms);
            }
        }
    }

    #[test]
    fn empty_events_produce_no_episodes() {
        assert!(build_episodes(Vec::new(), 600).is_empty());
    }

    #[test]
    fn rollout_in_window_takes_the_max_over_the_group() {
        let mut a = evt(0, "checkout-1", None);
        a.rollout_in_window = Some(0.0);
        let mut b = evt(1000, "checkout-1", None);
        b.rollout_in_window = Some(1.0);
        let episodes = build_episodes(vec![a, b], 600);
        assert_eq!(episodes[0].features.rollout_in_window, 1.0);
    }

    fn blank(ts_ms: i64) -> Event {
        Event {
            ts_ms,
            source: None,
            namespace: None,
            pod: None,
            node: None,
            level: None,
            verb: None,
            code: None,
            route: None,
            msg: None,
            container_restart: None,
            rollout_in_window: None,
            extras: Vec::new(),
        }
    }

    #[test]
    fn key_columns_are_derived_from_the_whole_table_not_each_window() {
        // Window 2's only event carries no key-column values at all, but
        // `pod` is present elsewhere in the table (window 1). The key
        // columns must be fixed once over the whole table: window 2's group
        // should key on `pod=None` (consistent with the rest of the run),
        // not fall back to the "_all" bucket purely because `pod` happens
        // to be absent within that one window.
        let mut w1 = blank(0);
        w1.pod = Some("checkout-1".into());
        let w2_event = blank(600_000);

        let combined = build_episodes(vec![w1, w2_event.clone()], 600);
        let isolated = build_episodes(vec![w2_event], 600);

        let combined_w2_id = combined.iter().find(|e| e.start_ms == 600_000).unwrap().episode_id.clone();
        let isolated_id = isolated[0].episode_id.clone();
        // Run in isolation, window 2's event has no key columns anywhere in
        // its (single-window) table, so it gets the "_all" bucket id. Run
        // alongside window 1, it must get a different id: `pod` is part of
        // the fixed key-column set, so its group key is `pod=None`, not `_all`.
        assert_ne!(combined_w2_id, isolated_id);
    }

    #[test]
    fn no_key_columns_present_groups_as_single_all_bucket() {
        let events = vec![Event {
            ts_ms: 0,
            source: None,
            namespace: None,
            pod: None,
            node: None,
            level: None,
            verb: None,
            code: None,
            route: None,
            msg: None,
            container_restart: None,
            rollout_in_window: None,
            extras: Vec::new(),
        }];
        let episodes = build_episodes(events, 600);
        assert_eq!(episodes.len(), 1);
    }
}
