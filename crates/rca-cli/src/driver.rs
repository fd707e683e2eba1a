//! Ties the three core crates together into the "run one step" driver
//! surface (§6): load inputs, build the graph, build episodes, apply
//! rules, write one incident file per episode.

use crate::error::DriverError;
use rca_episodes::DEFAULT_WINDOW_SECS;
use rca_types::{millis_to_rfc3339, Exemplar, Incident, MAX_EXEMPLARS};
use std::path::{Path, PathBuf};

pub struct RunArgs {
    pub events_path: PathBuf,
    pub snapshot_path: PathBuf,
    pub rules_path: PathBuf,
    pub out_dir: PathBuf,
    pub window_secs: u64,
}

impl RunArgs {
    pub fn window_secs_or_default(window_secs: Option<u64>) -> u64 {
        window_secs.unwrap_or(DEFAULT_WINDOW_SECS)
    }
}

/// Runs one RCA step end to end, returning the number of incidents written.
pub fn run(args: &RunArgs) -> Result<usize, DriverError> {
    let raw_snapshot = rca_graph::load_snapshot(&args.snapshot_path)?;
    let graph = rca_graph::build_from_snapshot(&raw_snapshot);
    tracing::info!(nodes = graph.node_count(), "built topology graph");

    let events = rca_episodes::load_events(&args.events_path)?;
    tracing::info!(events = events.len(), "loaded event table");

    let episodes = rca_episodes::build_episodes(events, args.window_secs);
    tracing::info!(episodes = episodes.len(), "built episodes");

    let rules = rca_rules::load_rules(&args.rules_path)?;
    tracing::info!(rules = rules.len(), "loaded rule file");

    std::fs::create_dir_all(&args.out_dir)
        .map_err(|e| DriverError::OutputDir { path: args.out_dir.clone(), source: e })?;

    let mut written = 0;
    for episode in &episodes {
        let candidates = rca_rules::apply_rules(episode, &rules, &graph);
        let exemplars = episode
            .events
            .iter()
            .take(MAX_EXEMPLARS)
            .map(Exemplar::from)
            .collect();
        let incident = Incident {
            episode_id: episode.episode_id.clone(),
            start: millis_to_rfc3339(episode.start_ms),
            end: millis_to_rfc3339(episode.end_ms),
            entities: episode.entities.clone(),
            features: episode.features,
            candidates,
            exemplars,
        };
        write_incident(&args.out_dir, &incident)?;
        written += 1;
    }

    tracing::info!(count = written, dir = %args.out_dir.display(), "wrote incidents");
    Ok(written)
}

fn write_incident(out_dir: &Path, incident: &Incident) -> Result<(), DriverError> {
    let path = out_dir.join(format!("{}.json", incident.episode_id));
    let body = serde_json::to_string_pretty(incident).unwrap_or_else(|_| "{}".to_string());
    std::fs::write(&path, body).map_err(|e| DriverError::WriteIncident { path, source: e })
}
