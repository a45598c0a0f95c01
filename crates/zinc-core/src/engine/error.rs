use super::config::ConfigError;
use super::neighbors::SearchError;
use super::source::DownloadError;
use crate::core::io::error::ParseError;
use std::fmt;
use thiserror::Error;

/// Errors that abort a whole scan before any structure is processed.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid scan configuration: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Failed to build the worker pool: {0}")]
    WorkerPool(String),
}

/// The pipeline stage at which a single structure scan failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScanStage {
    Download,
    Parse,
    Search,
}

impl fmt::Display for ScanStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ScanStage::Download => "download",
                ScanStage::Parse => "parse",
                ScanStage::Search => "search",
            }
        )
    }
}

/// A failure confined to one structure.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Search(#[from] SearchError),
}

impl ScanError {
    pub fn stage(&self) -> ScanStage {
        match self {
            ScanError::Download(_) => ScanStage::Download,
            ScanError::Parse(_) => ScanStage::Parse,
            ScanError::Search(_) => ScanStage::Search,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_follows_error_kind() {
        let download: ScanError = DownloadError::InvalidIdentifier("x/y".into()).into();
        let parse: ScanError = ParseError::MissingRecord("_atom_site loop".into()).into();
        let search: ScanError = SearchError::NonFiniteCoordinate { serial: 7 }.into();

        assert_eq!(download.stage(), ScanStage::Download);
        assert_eq!(parse.stage(), ScanStage::Parse);
        assert_eq!(search.stage(), ScanStage::Search);
    }

    #[test]
    fn stages_display_in_lower_case() {
        assert_eq!(ScanStage::Download.to_string(), "download");
        assert_eq!(ScanStage::Parse.to_string(), "parse");
        assert_eq!(ScanStage::Search.to_string(), "search");
    }

    #[test]
    fn configuration_errors_convert_into_engine_errors() {
        let err: EngineError = ConfigError::InvalidConcurrency(0).into();
        assert!(err.to_string().contains("at least 1"));
    }
}
