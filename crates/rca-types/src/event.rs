//! The raw event: one row of the declarative event table (audit logs, app
//! logs, infra logs, metric samples, k8s events) after normalization.

use serde::{Deserialize, Serialize};

/// Which log stream an event was drawn from. Free-form in the source table;
/// an unrecognized value is kept verbatim rather than rejected (§7.2).
pub type LogSource = String;

/// Maximum length (in chars) a message is truncated to on ingestion.
pub const MAX_MESSAGE_CHARS: usize = 400;

/// One normalized event row.
///
/// Every field beyond `ts_ms` is optional: different sources populate
/// different subsets of the columns, and a row missing a column is never a
/// parse failure (§7.2). `level` is compared against the literal string
/// `"error"` by the feature aggregator, matching the declarative input
/// rather than a closed Rust enum, since the table is free to carry levels
/// the core never needs to interpret (`debug`, `trace`, vendor-specific
/// severities).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub ts_ms: i64,
    pub source: Option<LogSource>,
    pub namespace: Option<String>,
    pub pod: Option<String>,
    pub node: Option<String>,
    pub level: Option<String>,
    pub verb: Option<String>,
    pub code: Option<i64>,
    pub route: Option<String>,
    pub msg: Option<String>,
    pub container_restart: Option<i64>,
    pub rollout_in_window: Option<f64>,
    /// Any additional columns present in the source table but not modeled
    /// above, kept as opaque string pairs so nothing is silently dropped
    /// before the episode builder decides whether it needs them.
    #[serde(default)]
    pub extras: Vec<(String, String)>,
}

impl Event {
    /// Truncates `msg` to at most [`MAX_MESSAGE_CHARS`] characters, respecting
    /// UTF-8 boundaries.
    pub fn truncate_message(msg: &str) -> String {
        if msg.chars().count() <= MAX_MESSAGE_CHARS {
            return msg.to_string();
        }
        msg.chars().take(MAX_MESSAGE_CHARS).collect()
    }

    pub fn is_error_level(&self) -> bool {
        self.level.as_deref() == Some("error")
    }

    pub fn is_http5xx(&self) -> bool {
        matches!(self.code, Some(c) if c >= 500)
    }
}
