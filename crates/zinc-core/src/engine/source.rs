use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("Invalid structure identifier '{0}'")]
    InvalidIdentifier(String),

    #[error("Timed out fetching '{identifier}' after {seconds}s")]
    Timeout { identifier: String, seconds: u64 },

    #[error("Structure '{identifier}' is unavailable: {reason}")]
    Unavailable { identifier: String, reason: String },

    #[error("Cache I/O error for '{identifier}': {source}")]
    Cache {
        identifier: String,
        #[source]
        source: io::Error,
    },
}

/// Supplies a local structure file for an identifier.
///
/// Implementations must be idempotent: asking twice for the same identifier returns
/// the same path, and an identifier that is already available locally is never
/// fetched again. Implementations are shared by every concurrent worker, so they must
/// only write files keyed by the identifier they were asked for.
pub trait StructureSource: Sync {
    fn fetch(&self, identifier: &str) -> Result<PathBuf, DownloadError>;
}

/// A source backed by a directory of already-downloaded files named
/// `{identifier}.cif` or `{identifier}.pdb` (identifier lower-cased).
#[derive(Debug, Clone)]
pub struct LocalDirectorySource {
    root: PathBuf,
}

impl LocalDirectorySource {
    const EXTENSIONS: [&'static str; 4] = ["cif", "mmcif", "pdb", "ent"];

    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl StructureSource for LocalDirectorySource {
    fn fetch(&self, identifier: &str) -> Result<PathBuf, DownloadError> {
        validate_identifier(identifier)?;
        let stem = identifier.to_ascii_lowercase();
        Self::EXTENSIONS
            .iter()
            .map(|ext| self.root.join(format!("{stem}.{ext}")))
            .find(|path| path.is_file())
            .ok_or_else(|| DownloadError::Unavailable {
                identifier: identifier.to_string(),
                reason: format!("no cached structure file in {}", self.root.display()),
            })
    }
}

/// Rejects identifiers that could not be a structure accession code, which also keeps
/// cache file names from escaping the cache directory.
pub fn validate_identifier(identifier: &str) -> Result<(), DownloadError> {
    if identifier.is_empty() || !identifier.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(DownloadError::InvalidIdentifier(identifier.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn identifiers_must_be_alphanumeric() {
        assert!(validate_identifier("1CA2").is_ok());
        assert!(validate_identifier("pdb_00001ca2").is_err());
        assert!(validate_identifier("../etc").is_err());
        assert!(validate_identifier("").is_err());
    }

    #[test]
    fn local_source_finds_cached_file_by_lowercase_identifier() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("1ca2.cif");
        fs::write(&path, "data_1CA2\n").unwrap();

        let source = LocalDirectorySource::new(dir.path());
        assert_eq!(source.root(), dir.path());
        assert_eq!(source.fetch("1CA2").unwrap(), path);
        assert_eq!(source.fetch("1ca2").unwrap(), path);
    }

    #[test]
    fn local_source_falls_back_to_pdb_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("2abc.pdb");
        fs::write(&path, "END\n").unwrap();

        let source = LocalDirectorySource::new(dir.path());
        assert_eq!(source.fetch("2ABC").unwrap(), path);
    }

    #[test]
    fn local_source_reports_missing_structures_as_unavailable() {
        let dir = tempdir().unwrap();
        let source = LocalDirectorySource::new(dir.path());
        assert!(matches!(
            source.fetch("9ZZZ"),
            Err(DownloadError::Unavailable { .. })
        ));
        assert!(matches!(
            source.fetch("9/ZZ"),
            Err(DownloadError::InvalidIdentifier(_))
        ));
    }
}
