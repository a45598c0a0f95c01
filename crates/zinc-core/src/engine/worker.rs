use super::aggregate::{StructureResult, aggregate};
use super::config::ScanConfig;
use super::error::{ScanError, ScanStage};
use super::neighbors::NeighborSearch;
use super::source::StructureSource;
use crate::core::io::load_structure;
use tracing::{debug, instrument, warn};

/// A per-structure failure, tagged with the stage that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanFailure {
    pub identifier: String,
    pub stage: ScanStage,
    pub message: String,
}

/// How the scan of one structure ended.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanOutcome {
    Found(StructureResult),
    /// The structure loaded but no qualifying ligand sits near any zinc atom
    /// (including structures with no zinc at all).
    Empty { identifier: String },
    Failed(ScanFailure),
}

impl ScanOutcome {
    pub fn identifier(&self) -> &str {
        match self {
            ScanOutcome::Found(result) => &result.identifier,
            ScanOutcome::Empty { identifier } => identifier,
            ScanOutcome::Failed(failure) => &failure.identifier,
        }
    }
}

/// Scans one structure: fetch, load, locate zinc, search around each zinc atom, and
/// aggregate the hits.
///
/// Never fails. Any error is converted into [`ScanOutcome::Failed`] so that the caller
/// can keep processing other identifiers.
#[instrument(skip(source, config), fields(radius = config.radius))]
pub fn scan_structure<S>(identifier: &str, source: &S, config: &ScanConfig) -> ScanOutcome
where
    S: StructureSource + ?Sized,
{
    let identifier = identifier.to_ascii_uppercase();
    match try_scan(&identifier, source, config) {
        Ok(Some(result)) => {
            debug!(
                ligands = result.ligand_names.len(),
                min_distance = result.min_distance,
                "Structure has zinc ligands."
            );
            ScanOutcome::Found(result)
        }
        Ok(None) => {
            debug!("No qualifying ligand near zinc.");
            ScanOutcome::Empty { identifier }
        }
        Err(e) => {
            let stage = e.stage();
            warn!(%stage, error = %e, "Structure scan failed.");
            ScanOutcome::Failed(ScanFailure {
                identifier,
                stage,
                message: e.to_string(),
            })
        }
    }
}

fn try_scan<S>(
    identifier: &str,
    source: &S,
    config: &ScanConfig,
) -> Result<Option<StructureResult>, ScanError>
where
    S: StructureSource + ?Sized,
{
    let path = source.fetch(identifier)?;
    let model = load_structure(&path)?;
    debug!(
        path = %path.display(),
        atoms = model.atoms().len(),
        residues = model.residues().len(),
        "Loaded coordinate model."
    );

    let search = NeighborSearch::new(&model, config.candidates)?;
    let hits = search.around_all_zinc(config.radius);
    Ok(aggregate(identifier, &hits))
}
