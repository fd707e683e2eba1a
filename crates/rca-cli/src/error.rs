//! The top-level driver error (§7): wraps every fatal failure class plus
//! output I/O errors.

use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum DriverError {
    Snapshot(rca_graph::SnapshotLoadError),
    Episodes(rca_episodes::EpisodeBuildError),
    Rules(rca_rules::RuleLoadError),
    OutputDir { path: PathBuf, source: std::io::Error },
    WriteIncident { path: PathBuf, source: std::io::Error },
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::Snapshot(e) => write!(f, "{e}"),
            DriverError::Episodes(e) => write!(f, "{e}"),
            DriverError::Rules(e) => write!(f, "{e}"),
            DriverError::OutputDir { path, source } => {
                write!(f, "could not create output directory {}: {source}", path.display())
            }
            DriverError::WriteIncident { path, source } => {
                write!(f, "could not write incident file {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for DriverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DriverError::Snapshot(e) => Some(e),
            DriverError::Episodes(e) => Some(e),
            DriverError::Rules(e) => Some(e),
            DriverError::OutputDir { source, .. } => Some(source),
            DriverError::WriteIncident { source, .. } => Some(source),
        }
    }
}

impl From<rca_graph::SnapshotLoadError> for DriverError {
    fn from(e: rca_graph::SnapshotLoadError) -> Self {
        DriverError::Snapshot(e)
    }
}

impl From<rca_episodes::EpisodeBuildError> for DriverError {
    fn from(e: rca_episodes::EpisodeBuildError) -> Self {
        DriverError::Episodes(e)
    }
}

impl From<rca_rules::RuleLoadError> for DriverError {
    fn from(e: rca_rules::RuleLoadError) -> Self {
        DriverError::Rules(e)
    }
}
