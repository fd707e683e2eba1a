//! Tolerant parsing of the declarative cluster snapshot, and the
//! deterministic node/edge builder that turns it into a [`TopologyGraph`]
//! (§4.1 Construction).

use crate::graph::{NodeMeta, TopologyGraph};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Fatal error reading or parsing the top-level snapshot JSON document
/// (§7.1). Anything below the top level — a pod missing `name`, an
/// unexpected field type — degrades to a skipped item instead (§4.1
/// Failure semantics).
#[derive(Debug)]
pub enum SnapshotLoadError {
    UnreadableFile { path: PathBuf, source: std::io::Error },
    MalformedJson { path: PathBuf, source: serde_json::Error },
}

impl fmt::Display for SnapshotLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotLoadError::UnreadableFile { path, source } => {
                write!(f, "could not read snapshot {}: {source}", path.display())
            }
            SnapshotLoadError::MalformedJson { path, source } => {
                write!(f, "snapshot {} is not valid JSON: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for SnapshotLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotLoadError::UnreadableFile { source, .. } => Some(source),
            SnapshotLoadError::MalformedJson { source, .. } => Some(source),
        }
    }
}

/// Reads and parses a snapshot JSON document from disk.
pub fn load_snapshot(path: &Path) -> Result<RawSnapshot, SnapshotLoadError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| SnapshotLoadError::UnreadableFile { path: path.to_path_buf(), source: e })?;
    serde_json::from_str(&text).map_err(|e| SnapshotLoadError::MalformedJson { path: path.to_path_buf(), source: e })
}

fn meta_of(kind: &str, namespace: Option<&str>, extra: Map<String, Value>) -> NodeMeta {
    let mut m = extra;
    m.insert("kind".to_string(), Value::String(kind.to_string()));
    if let Some(ns) = namespace {
        m.insert("namespace".to_string(), Value::String(ns.to_string()));
    }
    m
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSnapshot {
    #[serde(default)]
    pub nodes: Vec<RawNode>,
    #[serde(default)]
    pub pods: Vec<RawPod>,
    #[serde(default)]
    pub replicasets: Vec<RawReplicaSet>,
    #[serde(default)]
    pub deployments: Vec<RawDeployment>,
    #[serde(default)]
    pub services: Vec<RawService>,
    #[serde(default)]
    pub endpoints: Vec<RawEndpoints>,
    #[serde(default)]
    pub routes: Vec<RawRoute>,
    #[serde(default)]
    pub ingresses: Vec<RawIngress>,
    #[serde(default)]
    pub pvcs: Vec<RawPvc>,
    #[serde(default)]
    pub pvs: Vec<RawPv>,
    #[serde(default)]
    pub hpas: Vec<RawHpa>,
    #[serde(default)]
    pub netpols: Vec<RawNetpol>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawNode {
    pub name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawOwner {
    pub kind: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPod {
    pub name: Option<String>,
    pub ns: Option<String>,
    pub node: Option<String>,
    pub owner: Option<RawOwner>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawReplicasetOwner {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawReplicaSet {
    pub name: Option<String>,
    pub ns: Option<String>,
    pub owner: Option<RawReplicasetOwner>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDeployment {
    pub name: Option<String>,
    pub ns: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawService {
    pub name: Option<String>,
    pub ns: Option<String>,
    #[serde(default)]
    pub selector: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEndpoints {
    pub svc: Option<String>,
    pub ns: Option<String>,
    #[serde(default)]
    pub pods: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRoute {
    pub name: Option<String>,
    pub ns: Option<String>,
    pub to_svc: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawIngress {
    pub name: Option<String>,
    pub ns: Option<String>,
    pub to_svc: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPvc {
    pub name: Option<String>,
    pub ns: Option<String>,
    pub pv: Option<String>,
    pub pod: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPv {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawHpa {
    pub name: Option<String>,
    pub ns: Option<String>,
    pub target_deploy: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawNetpol {
    pub name: Option<String>,
    pub ns: Option<String>,
    #[serde(default)]
    pub selects: Value,
}

/// Builds a [`TopologyGraph`] from a parsed snapshot, following the
/// deterministic 8-step order in §4.1. Items missing the fields needed to
/// form their node id are skipped with a warning rather than failing the
/// build — the builder is total.
pub fn build_from_snapshot(snapshot: &RawSnapshot) -> TopologyGraph {
    let mut g = TopologyGraph::new();

    // Step 1: cluster nodes.
    for n in &snapshot.nodes {
        let Some(name) = &n.name else {
            tracing::warn!("snapshot node missing `name`, skipping");
            continue;
        };
        g.add_node(format!("node/{name}"), meta_of("Node", None, n.extra.clone()));
    }

    // Step 2: pods, plus the pod-name -> [pod id] index used by later steps.
    let mut pod_index: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for p in &snapshot.pods {
        let (Some(name), Some(ns)) = (&p.name, &p.ns) else {
            tracing::warn!("snapshot pod missing `name` or `ns`, skipping");
            continue;
        };
        let id = format!("pod/{ns}/{name}");
        g.add_node(id.clone(), meta_of("Pod", Some(ns), p.extra.clone()));
        pod_index.entry(name.clone()).or_default().push(id.clone());
        if let Some(node) = &p.node {
            g.add_edge(id.clone(), format!("node/{node}"), "runs_on");
        }
        if let Some(owner) = &p.owner {
            let owner_kind = owner.kind.to_lowercase();
            g.add_edge(id, format!("{owner_kind}/{ns}/{}", owner.name), "owned_by");
        }
    }

    // Step 3: replicasets, owned by a deployment.
    for rs in &snapshot.replicasets {
        let (Some(name), Some(ns)) = (&rs.name, &rs.ns) else {
            tracing::warn!("snapshot replicaset missing `name` or `ns`, skipping");
            continue;
        };
        let id = format!("replicaset/{ns}/{name}");
        g.add_node(id.clone(), meta_of("ReplicaSet", Some(ns), Map::new()));
        if let Some(owner) = &rs.owner {
            g.add_edge(id, format!("deployment/{ns}/{}", owner.name), "owned_by");
        }
    }

    // Step 4: deployments, services.
    for d in &snapshot.deployments {
        let (Some(name), Some(ns)) = (&d.name, &d.ns) else {
            tracing::warn!("snapshot deployment missing `name` or `ns`, skipping");
            continue;
        };
        g.add_node(format!("deployment/{ns}/{name}"), meta_of("Deployment", Some(ns), Map::new()));
    }
    for s in &snapshot.services {
        let (Some(name), Some(ns)) = (&s.name, &s.ns) else {
            tracing::warn!("snapshot service missing `name` or `ns`, skipping");
            continue;
        };
        let mut extra = Map::new();
        extra.insert("selector".to_string(), s.selector.clone());
        g.add_node(format!("service/{ns}/{name}"), meta_of("Service", Some(ns), extra));
    }

    // Step 5: endpoints -> routes_to edges, resolved via the pod-name index.
    for e in &snapshot.endpoints {
        let (Some(svc), Some(ns)) = (&e.svc, &e.ns) else {
            tracing::warn!("snapshot endpoints record missing `svc` or `ns`, skipping");
            continue;
        };
        let sid = format!("service/{ns}/{svc}");
        for pod_name in &e.pods {
            match pod_index.get(pod_name) {
                Some(ids) => {
                    for pod_id in ids {
                        g.add_edge(sid.clone(), pod_id.clone(), "routes_to");
                    }
                }
                None => tracing::warn!(pod = %pod_name, "endpoints reference unknown pod name, edge dropped"),
            }
        }
    }

    // Step 6: routes and ingresses, exposing a service when a backend is named.
    for r in &snapshot.routes {
        let (Some(name), Some(ns)) = (&r.name, &r.ns) else {
            tracing::warn!("snapshot route missing `name` or `ns`, skipping");
            continue;
        };
        let id = format!("route/{ns}/{name}");
        g.add_node(id.clone(), meta_of("Route", Some(ns), Map::new()));
        if let Some(to_svc) = &r.to_svc {
            g.add_edge(id, format!("service/{ns}/{to_svc}"), "exposes");
        }
    }
    for ing in &snapshot.ingresses {
        let (Some(name), Some(ns)) = (&ing.name, &ing.ns) else {
            tracing::warn!("snapshot ingress missing `name` or `ns`, skipping");
            continue;
        };
        let id = format!("ingress/{ns}/{name}");
        g.add_node(id.clone(), meta_of("Ingress", Some(ns), Map::new()));
        if let Some(to_svc) = &ing.to_svc {
            g.add_edge(id, format!("service/{ns}/{to_svc}"), "exposes");
        }
    }

    // Step 7: PVCs (binds to a PV, mounted by indexed pods).
    for pvc in &snapshot.pvcs {
        let (Some(name), Some(ns)) = (&pvc.name, &pvc.ns) else {
            tracing::warn!("snapshot pvc missing `name` or `ns`, skipping");
            continue;
        };
        let id = format!("pvc/{ns}/{name}");
        g.add_node(id.clone(), meta_of("PVC", Some(ns), Map::new()));
        if let Some(pv) = &pvc.pv {
            g.add_edge(id.clone(), format!("pv/{pv}"), "binds");
        }
        if let Some(pod_name) = &pvc.pod {
            match pod_index.get(pod_name) {
                Some(ids) => {
                    for pod_id in ids {
                        g.add_edge(pod_id.clone(), id.clone(), "mounts");
                    }
                }
                None => tracing::warn!(pod = %pod_name, "pvc references unknown pod name, edge dropped"),
            }
        }
    }

    // Step 8: PVs, HPAs, NetworkPolicies.
    for pv in &snapshot.pvs {
        let Some(name) = &pv.name else {
            tracing::warn!("snapshot pv missing `name`, skipping");
            continue;
        };
        g.add_node(format!("pv/{name}"), meta_of("PV", None, Map::new()));
    }
    for h in &snapshot.hpas {
        let (Some(name), Some(ns)) = (&h.name, &h.ns) else {
            tracing::warn!("snapshot hpa missing `name` or `ns`, skipping");
            continue;
        };
        let id = format!("hpa/{ns}/{name}");
        g.add_node(id.clone(), meta_of("HPA", Some(ns), Map::new()));
        if let Some(target) = &h.target_deploy {
            g.add_edge(id, format!("deployment/{ns}/{target}"), "targets");
        }
    }
    for np in &snapshot.netpols {
        let (Some(name), Some(ns)) = (&np.name, &np.ns) else {
            tracing::warn!("snapshot netpol missing `name` or `ns`, skipping");
            continue;
        };
        let mut extra = Map::new();
        extra.insert("selects".to_string(), np.selects.clone());
        g.add_node(format!("netpol/{ns}/{name}"), meta_of("NetworkPolicy", Some(ns), extra));
    }

    g
}
