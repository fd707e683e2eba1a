//! The rule file schema (§4.3 Rule schema) and its tolerant YAML loader.

use crate::error::RuleLoadError;
use serde::Deserialize;
use serde_yaml::Value;
use std::path::Path;

/// A single atomic predicate over an episode.
#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    Metric { name: String, op: String, value: f64 },
    Event { substring: String },
    LogPattern { substring: String },
    /// An unrecognized signal key — always evaluates false (§4.3 Failure semantics).
    Unknown,
}

fn signal_from_value(value: &Value) -> Signal {
    let Some(map) = value.as_mapping() else {
        return Signal::Unknown;
    };
    if let Some(name) = map.get(Value::from("metric")).and_then(Value::as_str) {
        let op = map
            .get(Value::from("op"))
            .and_then(Value::as_str)
            .unwrap_or(">")
            .to_string();
        let value = map.get(Value::from("value")).and_then(Value::as_f64).unwrap_or(0.0);
        return Signal::Metric { name: name.to_string(), op, value };
    }
    if let Some(substring) = map.get(Value::from("event")).and_then(Value::as_str) {
        return Signal::Event { substring: substring.to_string() };
    }
    if let Some(substring) = map.get(Value::from("log_pattern")).and_then(Value::as_str) {
        return Signal::LogPattern { substring: substring.to_string() };
    }
    Signal::Unknown
}

/// The predicate tree under a rule's `when` key.
#[derive(Debug, Clone, PartialEq)]
pub enum When {
    All(Vec<Signal>),
    Any(Vec<Signal>),
    /// Neither `all` nor `any` present: the rule always matches.
    Unconditional,
}

fn when_from_value(value: &Value) -> When {
    let Some(map) = value.as_mapping() else {
        return When::Unconditional;
    };
    if let Some(Value::Sequence(signals)) = map.get(Value::from("all")) {
        return When::All(signals.iter().map(signal_from_value).collect());
    }
    if let Some(Value::Sequence(signals)) = map.get(Value::from("any")) {
        return When::Any(signals.iter().map(signal_from_value).collect());
    }
    When::Unconditional
}

/// The four named score weights, with the defaults from §4.3.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub temporal: f64,
    pub topology: f64,
    pub magnitude: f64,
    pub change_flag: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self { temporal: 0.3, topology: 0.4, magnitude: 0.3, change_flag: 0.0 }
    }
}

/// One rule, fully parsed (§4.3).
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub id: String,
    pub reason: String,
    pub when: When,
    pub root_component: Option<String>,
    pub score: ScoreWeights,
    pub evidence: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawRule {
    id: Option<String>,
    reason: Option<String>,
    #[serde(default)]
    when: Value,
    root_component: Option<String>,
    #[serde(default)]
    score: ScoreWeights,
    #[serde(default)]
    evidence: Vec<String>,
}

/// Parses the rule file's top-level YAML list. An individual malformed
/// entry (not even a mapping) is skipped with a warning rather than
/// failing the whole load; a non-list top-level document is fatal.
pub fn load_rules(path: &Path) -> Result<Vec<Rule>, RuleLoadError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| RuleLoadError::UnreadableFile { path: path.to_path_buf(), source: e })?;
    parse_rules(&text, path)
}

fn parse_rules(text: &str, path: &Path) -> Result<Vec<Rule>, RuleLoadError> {
    let top: Value = serde_yaml::from_str(text)
        .map_err(|e| RuleLoadError::MalformedYaml { path: path.to_path_buf(), source: e })?;
    let Value::Sequence(entries) = top else {
        if matches!(top, Value::Null) {
            return Ok(Vec::new());
        }
        return Err(RuleLoadError::NotAList { path: path.to_path_buf() });
    };

    let mut rules = Vec::new();
    for entry in entries {
        match serde_yaml::from_value::<RawRule>(entry) {
            Ok(raw) => {
                let Some(id) = raw.id else {
                    tracing::warn!("rule missing `id`, skipping");
                    continue;
                };
                rules.push(Rule {
                    reason: raw.reason.unwrap_or_else(|| id.clone()),
                    id,
                    when: when_from_value(&raw.when),
                    root_component: raw.root_component,
                    score: raw.score,
                    evidence: raw.evidence,
                });
            }
            Err(err) => tracing::warn!(%err, "skipping malformed rule entry"),
        }
    }
    Ok(rules)
}
