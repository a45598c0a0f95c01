use std::num::NonZeroUsize;
use thiserror::Error;

/// Default neighbor search radius in Angstroms.
pub const DEFAULT_RADIUS_ANGSTROMS: f64 = 5.0;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Search radius must be a positive, finite number of Angstroms (got {0})")]
    InvalidRadius(f64),
    #[error("Worker concurrency must be at least 1 (got {0})")]
    InvalidConcurrency(usize),
}

/// Which residues may be reported as ligands, on top of the fixed water and zinc
/// exclusions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CandidatePolicy {
    /// Any residue other than water or a zinc ion.
    #[default]
    AllResidues,
    /// Only hetero (HETATM) groups other than water or a zinc ion.
    HeteroOnly,
}

/// Settings shared read-only by every scan worker.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    pub radius: f64,
    pub workers: usize,
    pub candidates: CandidatePolicy,
}

impl ScanConfig {
    /// Checks the invariants the scan relies on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the radius is not a positive finite number or if
    /// fewer than one worker is requested.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(ConfigError::InvalidRadius(self.radius));
        }
        if self.workers < 1 {
            return Err(ConfigError::InvalidConcurrency(self.workers));
        }
        Ok(())
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS_ANGSTROMS,
            workers: default_workers(),
            candidates: CandidatePolicy::default(),
        }
    }
}

/// Available hardware parallelism, or a single worker if it cannot be determined.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

#[derive(Default)]
pub struct ScanConfigBuilder {
    radius: Option<f64>,
    workers: Option<usize>,
    candidates: Option<CandidatePolicy>,
}

impl ScanConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }
    pub fn candidates(mut self, policy: CandidatePolicy) -> Self {
        self.candidates = Some(policy);
        self
    }

    pub fn build(self) -> Result<ScanConfig, ConfigError> {
        let config = ScanConfig {
            radius: self.radius.unwrap_or(DEFAULT_RADIUS_ANGSTROMS),
            workers: self.workers.unwrap_or_else(default_workers),
            candidates: self.candidates.unwrap_or_default(),
        };
        config.validate()?;
        Ok(config)
    }
}
