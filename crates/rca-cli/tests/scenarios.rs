//! End-to-end scenarios built entirely in memory: event rows straight to
//! `rca_episodes::build_episodes`, a snapshot straight to
//! `rca_graph::build_from_snapshot`, rules parsed from an inline YAML
//! string, asserting on the resulting incident.

use rca_graph::build_from_snapshot;
use rca_rules::apply_rules;
use rca_types::{millis_to_rfc3339, Event, Exemplar, Incident, MAX_EXEMPLARS};

fn blank_event(ts_ms: i64) -> Event {
    Event {
        ts_ms,
        source: Some("app".into()),
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

fn rules_from_yaml(yaml: &str) -> Vec<rca_rules::Rule> {
    let path = std::env::temp_dir().join(format!("rca-cli-scenario-rules-{}.yaml", std::process::id()));
    std::fs::write(&path, yaml).unwrap();
    let rules = rca_rules::load_rules(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    rules
}

fn to_incident(episode: &rca_types::Episode, candidates: Vec<rca_types::CandidateRoot>) -> Incident {
    Incident {
        episode_id: episode.episode_id.clone(),
        start: millis_to_rfc3339(episode.start_ms),
        end: millis_to_rfc3339(episode.end_ms),
        entities: episode.entities.clone(),
        features: episode.features,
        candidates,
        exemplars: episode.events.iter().take(MAX_EXEMPLARS).map(Exemplar::from).collect(),
    }
}

#[test]
fn scenario_1_node_correlated_failure() {
    let events: Vec<Event> = (0..20)
        .map(|i| {
            let mut e = blank_event(i * 1_000);
            e.namespace = Some("shop".into());
            e.pod = Some("checkout-1".into());
            e.node = Some("n1".into());
            e.level = Some("error".into());
            e.msg = Some("NodeNotReady".into());
            e.container_restart = Some(0);
            e
        })
        .collect();
    let episodes = rca_episodes::build_episodes(events, 600);
    assert_eq!(episodes.len(), 1);

    let snapshot: rca_graph::RawSnapshot = serde_json::from_value(serde_json::json!({
        "pods": [{"name": "checkout-1", "ns": "shop", "node": "n1"}]
    }))
    .unwrap();
    let graph = build_from_snapshot(&snapshot);

    let rules = rules_from_yaml(
        r#"
- id: node-not-ready
  reason: "node not ready"
  when:
    all:
      - event: "NodeNotReady"
  root_component: node
"#,
    );

    let episode = &episodes[0];
    assert_eq!(episode.features.error_ratio, 1.0);
    let candidates = apply_rules(episode, &rules, &graph);
    assert_eq!(candidates.len(), 1);
    let c = &candidates[0];
    assert_eq!(c.component, "node/n1");
    assert!((c.score_breakdown.topology - 0.32).abs() < 1e-9);
    assert!((c.score_breakdown.magnitude - 0.3).abs() < 1e-9);
    assert_eq!(c.score_breakdown.temporal, 0.3);
    assert_eq!(c.score_breakdown.change, 0.0);
    assert!((c.score - 0.92).abs() < 1e-9);
}

#[test]
fn scenario_2_rollout_related_5xx_points_at_owning_deployment() {
    let mut events = Vec::new();
    let mut rollout = blank_event(0);
    rollout.namespace = Some("shop".into());
    rollout.pod = Some("checkout-1".into());
    rollout.msg = Some("Scaled up".into());
    rollout.rollout_in_window = Some(1.0);
    events.push(rollout);
    for i in 0..5 {
        let mut e = blank_event((i + 1) * 1_000);
        e.namespace = Some("shop".into());
        e.pod = Some("checkout-1".into());
        e.code = Some(503);
        events.push(e);
    }
    let episodes = rca_episodes::build_episodes(events, 600);
    assert_eq!(episodes.len(), 1);
    assert_eq!(episodes[0].features.http5xx, 5.0);

    let snapshot: rca_graph::RawSnapshot = serde_json::from_value(serde_json::json!({
        "pods": [{"name": "checkout-1", "ns": "shop", "owner": {"kind": "Deployment", "name": "checkout"}}],
        "deployments": [{"name": "checkout", "ns": "shop"}]
    }))
    .unwrap();
    let graph = build_from_snapshot(&snapshot);

    let rules = rules_from_yaml(
        r#"
- id: rollout-5xx
  reason: "rollout caused 5xx"
  when:
    all:
      - metric: http5xx
        op: ">="
        value: 5
  root_component: deployment
  score:
    change_flag: 0.1
"#,
    );

    let candidates = apply_rules(&episodes[0], &rules, &graph);
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].component, "deployment/shop/checkout");
    assert!((candidates[0].score_breakdown.change - 0.1).abs() < 1e-9);
}

#[test]
fn scenario_3_pvc_read_only_through_pod_pvc_pv_chain() {
    let mut events = Vec::new();
    let mut e = blank_event(0);
    e.namespace = Some("shop".into());
    e.pod = Some("worker-1".into());
    e.msg = Some("read-only file system".into());
    events.push(e);

    let episodes = rca_episodes::build_episodes(events, 600);
    let snapshot: rca_graph::RawSnapshot = serde_json::from_value(serde_json::json!({
        "pods": [{"name": "worker-1", "ns": "shop"}],
        "pvcs": [{"name": "data", "ns": "shop", "pv": "pv1", "pod": "worker-1"}],
        "pvs": [{"name": "pv1"}]
    }))
    .unwrap();
    let graph = build_from_snapshot(&snapshot);

    let rules = rules_from_yaml(
        r#"
- id: pvc-read-only
  reason: "filesystem went read-only"
  when:
    all:
      - event: "read-only file system"
  root_component: pvc
"#,
    );

    let candidates = apply_rules(&episodes[0], &rules, &graph);
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].component, "pvc/shop/data");
    assert!((candidates[0].score_breakdown.topology - 0.32).abs() < 1e-9);
}

#[test]
fn scenario_4_no_match_yields_empty_candidates() {
    let mut e = blank_event(0);
    e.level = Some("info".into());
    e.msg = Some("all nominal".into());
    let episodes = rca_episodes::build_episodes(vec![e], 600);
    let graph = build_from_snapshot(&rca_graph::RawSnapshot::default());
    let rules = rules_from_yaml(
        r#"
- id: never-fires
  reason: "should not match"
  when:
    all:
      - event: "boom"
"#,
    );
    let candidates = apply_rules(&episodes[0], &rules, &graph);
    let incident = to_incident(&episodes[0], candidates);
    assert!(incident.candidates.is_empty());
}

#[test]
fn scenario_5_multi_window_split_has_distinct_ids_and_disjoint_exemplars() {
    let events: Vec<Event> = (0..25)
        .map(|m| {
            let mut e = blank_event(m * 60_000);
            e.pod = Some("checkout-1".into());
            e
        })
        .collect();
    let episodes = rca_episodes::build_episodes(events, 600);
    assert_eq!(episodes.len(), 3);
    let ids: std::collections::BTreeSet<_> = episodes.iter().map(|e| e.episode_id.clone()).collect();
    assert_eq!(ids.len(), 3);
    for w in episodes.windows(2) {
        let a_max = w[0].events.iter().map(|e| e.ts_ms).max().unwrap();
        let b_min = w[1].events.iter().map(|e| e.ts_ms).min().unwrap();
        assert!(a_max < b_min);
    }
}

#[test]
fn scenario_6_graph_round_trip_produces_identical_candidates() {
    let snapshot: rca_graph::RawSnapshot = serde_json::from_value(serde_json::json!({
        "pods": [{"name": "checkout-1", "ns": "shop", "node": "n1"}]
    }))
    .unwrap();
    let graph = build_from_snapshot(&snapshot);
    let json = graph.to_json();
    let graph2 = rca_graph::TopologyGraph::from_json(&json);

    let mut e = blank_event(0);
    e.namespace = Some("shop".into());
    e.pod = Some("checkout-1".into());
    e.node = Some("n1".into());
    e.msg = Some("NodeNotReady".into());
    let episodes = rca_episodes::build_episodes(vec![e], 600);

    let rules = rules_from_yaml(
        r#"
- id: node-not-ready
  reason: "node not ready"
  when:
    all:
      - event: "NodeNotReady"
  root_component: node
"#,
    );

    let before = apply_rules(&episodes[0], &rules, &graph);
    let after = apply_rules(&episodes[0], &rules, &graph2);
    assert_eq!(before, after);
}
