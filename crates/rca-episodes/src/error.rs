//! Fatal input-shape errors for the episode builder (§7.1).

use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum EpisodeBuildError {
    /// The event table has no `ts` column at all — a fatal input-shape error,
    /// distinct from an individual row with an unparseable or missing `ts`
    /// value (which is tolerated, §4.2 Failures).
    MissingTimestampColumn { path: PathBuf },
    UnreadableTable { path: PathBuf, source: Box<dyn std::error::Error + Send + Sync> },
    UnsupportedExtension { path: PathBuf },
}

impl fmt::Display for EpisodeBuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EpisodeBuildError::MissingTimestampColumn { path } => {
                write!(f, "event table {} has no `ts` column", path.display())
            }
            EpisodeBuildError::UnreadableTable { path, source } => {
                write!(f, "could not read event table {}: {source}", path.display())
            }
            EpisodeBuildError::UnsupportedExtension { path } => {
                write!(f, "event table {} has no recognized extension (expected .csv or .parquet)", path.display())
            }
        }
    }
}

impl std::error::Error for EpisodeBuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EpisodeBuildError::UnreadableTable { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
