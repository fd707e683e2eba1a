//! Fatal rule-file parse errors (§7.1). Anything below the top-level YAML
//! document — unknown keys, malformed signals — degrades silently per
//! §4.3 Failure semantics rather than erroring here.

use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum RuleLoadError {
    UnreadableFile { path: PathBuf, source: std::io::Error },
    MalformedYaml { path: PathBuf, source: serde_yaml::Error },
    NotAList { path: PathBuf },
}

impl fmt::Display for RuleLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleLoadError::UnreadableFile { path, source } => {
                write!(f, "could not read rule file {}: {source}", path.display())
            }
            RuleLoadError::MalformedYaml { path, source } => {
                write!(f, "rule file {} is not valid YAML: {source}", path.display())
            }
            RuleLoadError::NotAList { path } => {
                write!(f, "rule file {} top-level document must be a YAML list", path.display())
            }
        }
    }
}

impl std::error::Error for RuleLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RuleLoadError::UnreadableFile { source, .. } => Some(source),
            RuleLoadError::MalformedYaml { source, .. } => Some(source),
            RuleLoadError::NotAList { .. } => None,
        }
    }
}
