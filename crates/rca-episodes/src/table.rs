//! Loads the declarative event table from disk. Table format is picked by
//! file extension: `.parquet` when the `parquet` feature is enabled and the
//! path ends in it, CSV otherwise (§10, mirroring the original's
//! `run_rca_step.py` dispatch).

use crate::error::EpisodeBuildError;
use rca_types::Event;
use std::path::Path;

const KNOWN_COLUMNS: &[&str] = &[
    "ts",
    "source",
    "namespace",
    "pod",
    "node",
    "level",
    "verb",
    "code",
    "route",
    "msg",
    "container_restart",
    "rollout_in_window",
];

/// Loads events from `path`, dispatching on extension. Rows with a missing
/// or unparseable `ts` are dropped with a warning (§4.2 Windowing); a
/// missing `ts` *column* is fatal.
pub fn load_events(path: &Path) -> Result<Vec<Event>, EpisodeBuildError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("parquet") => load_parquet(path),
        Some("csv") => load_csv(path),
        _ => load_csv(path),
    }
}

fn load_csv(path: &Path) -> Result<Vec<Event>, EpisodeBuildError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| EpisodeBuildError::UnreadableTable { path: path.to_path_buf(), source: Box::new(e) })?;

    let headers = reader
        .headers()
        .map_err(|e| EpisodeBuildError::UnreadableTable { path: path.to_path_buf(), source: Box::new(e) })?
        .clone();
    if !headers.iter().any(|h| h == "ts") {
        return Err(EpisodeBuildError::MissingTimestampColumn { path: path.to_path_buf() });
    }

    let mut events = Vec::new();
    for record in reader.records() {
        let record = match record {
            Ok(r) => r,
            Err(err) => {
                tracing::warn!(%err, "skipping unreadable CSV row");
                continue;
            }
        };
        let row: std::collections::HashMap<&str, &str> =
            headers.iter().zip(record.iter()).collect();

        let Some(ts_raw) = row.get("ts") else {
            continue;
        };
        let ts_ms = match rca_types::parse_timestamp_millis(ts_raw) {
            Ok(ms) => ms,
            Err(err) => {
                tracing::warn!(%err, "dropping event row with unparseable ts");
                continue;
            }
        };

        let extras: Vec<(String, String)> = headers
            .iter()
            .zip(record.iter())
            .filter(|(h, _)| !KNOWN_COLUMNS.contains(h))
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect();

        events.push(Event {
            ts_ms,
            source: non_empty(row.get("source").copied()),
            namespace: non_empty(row.get("namespace").copied()),
            pod: non_empty(row.get("pod").copied()),
            node: non_empty(row.get("node").copied()),
            level: non_empty(row.get("level").copied()),
            verb: non_empty(row.get("verb").copied()),
            code: row.get("code").and_then(|v| v.trim().parse::<i64>().ok()),
            route: non_empty(row.get("route").copied()),
            msg: row.get("msg").map(|m| Event::truncate_message(m)),
            container_restart: row.get("container_restart").and_then(|v| v.trim().parse::<i64>().ok()),
            rollout_in_window: row.get("rollout_in_window").and_then(|v| v.trim().parse::<f64>().ok()),
            extras,
        });
    }
    Ok(events)
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(|v| v.to_string())
}

#[cfg(feature = "parquet")]
fn load_parquet(path: &Path) -> Result<Vec<Event>, EpisodeBuildError> {
    use parquet::file::reader::{FileReader, SerializedFileReader};
    use std::fs::File;

    let file = File::open(path)
        .map_err(|e| EpisodeBuildError::UnreadableTable { path: path.to_path_buf(), source: Box::new(e) })?;
    let reader = SerializedFileReader::new(file)
        .map_err(|e| EpisodeBuildError::UnreadableTable { path: path.to_path_buf(), source: Box::new(e) })?;

    let schema_has_ts = reader
        .metadata()
        .file_metadata()
        .schema()
        .get_fields()
        .iter()
        .any(|f| f.name() == "ts");
    if !schema_has_ts {
        return Err(EpisodeBuildError::MissingTimestampColumn { path: path.to_path_buf() });
    }

    let mut events = Vec::new();
    let iter = reader
        .get_row_iter(None)
        .map_err(|e| EpisodeBuildError::UnreadableTable { path: path.to_path_buf(), source: Box::new(e) })?;
    for row_result in iter {
        let Ok(row) = row_result else {
            tracing::warn!("skipping unreadable parquet row");
            continue;
        };
        let mut ts_ms = None;
        let mut event = Event {
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
        };
        for (name, field) in row.get_column_iter() {
            let text = field.to_string();
            match name.as_str() {
                "ts" => ts_ms = rca_types::parse_timestamp_millis(&text).ok(),
                "source" => event.source = non_empty(Some(&text)),
                "namespace" => event.namespace = non_empty(Some(&text)),
                "pod" => event.pod = non_empty(Some(&text)),
                "node" => event.node = non_empty(Some(&text)),
                "level" => event.level = non_empty(Some(&text)),
                "verb" => event.verb = non_empty(Some(&text)),
                "code" => event.code = text.trim().parse::<i64>().ok(),
                "route" => event.route = non_empty(Some(&text)),
                "msg" => event.msg = Some(Event::truncate_message(&text)),
                "container_restart" => event.container_restart = text.trim().parse::<i64>().ok(),
                "rollout_in_window" => event.rollout_in_window = text.trim().parse::<f64>().ok(),
                other => event.extras.push((other.to_string(), text)),
            }
        }
        let Some(ts_ms) = ts_ms else {
            tracing::warn!("dropping parquet row with unparseable ts");
            continue;
        };
        event.ts_ms = ts_ms;
        events.push(event);
    }
    Ok(events)
}

#[cfg(not(feature = "parquet"))]
fn load_parquet(path: &Path) -> Result<Vec<Event>, EpisodeBuildError> {
    Err(EpisodeBuildError::UnsupportedExtension { path: path.to_path_buf() })
}
