use crate::engine::aggregate::StructureResult;
use crate::engine::config::ScanConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter, ScanStatus};
use crate::engine::source::StructureSource;
use crate::engine::worker::{ScanFailure, ScanOutcome, scan_structure};
use rayon::prelude::*;
use std::fmt;
use std::sync::mpsc;
use std::thread;
use tracing::{info, instrument};

/// Every outcome of a scan, in deterministic order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanReport {
    /// Structures with at least one zinc ligand, by ascending minimum distance and
    /// then identifier.
    pub results: Vec<StructureResult>,
    /// Identifiers of structures without any qualifying ligand, sorted.
    pub empty: Vec<String>,
    /// Per-structure failures, sorted by identifier.
    pub failures: Vec<ScanFailure>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSummary {
    pub succeeded: usize,
    pub empty: usize,
    pub failed: usize,
}

impl ScanReport {
    pub fn summary(&self) -> ScanSummary {
        ScanSummary {
            succeeded: self.results.len(),
            empty: self.empty.len(),
            failed: self.failures.len(),
        }
    }

    fn record(&mut self, outcome: ScanOutcome) {
        match outcome {
            ScanOutcome::Found(result) => self.results.push(result),
            ScanOutcome::Empty { identifier } => self.empty.push(identifier),
            ScanOutcome::Failed(failure) => self.failures.push(failure),
        }
    }

    fn sort(&mut self) {
        self.results.sort_by(|a, b| {
            a.min_distance
                .total_cmp(&b.min_distance)
                .then_with(|| a.identifier.cmp(&b.identifier))
        });
        self.empty.sort();
        self.failures
            .sort_by(|a, b| a.identifier.cmp(&b.identifier).then(a.stage.cmp(&b.stage)));
    }
}

impl fmt::Display for ScanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} succeeded, {} empty, {} failed",
            self.succeeded, self.empty, self.failed
        )
    }
}

/// Scans every identifier on a pool of `config.workers` threads.
///
/// Each identifier is handled by exactly one [`scan_structure`] call, and at most
/// `config.workers` calls are in flight at any moment. Per-structure failures end up in
/// [`ScanReport::failures`]; they never stop the remaining identifiers.
///
/// # Errors
///
/// Returns [`EngineError::Configuration`] before anything is scanned if the
/// configuration is invalid, or [`EngineError::WorkerPool`] if the thread pool cannot
/// be created.
#[instrument(skip_all, name = "scan_workflow", fields(structures = identifiers.len()))]
pub fn run<S>(
    identifiers: &[String],
    source: &S,
    config: &ScanConfig,
    reporter: &ProgressReporter,
) -> Result<ScanReport, EngineError>
where
    S: StructureSource + ?Sized,
{
    config.validate()?;

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.workers)
        .thread_name(|i| format!("zincscan-worker-{i}"))
        .build()
        .map_err(|e| EngineError::WorkerPool(e.to_string()))?;

    info!(
        workers = config.workers,
        radius = config.radius,
        "Starting zinc ligand scan."
    );
    reporter.report(Progress::TaskStart {
        total_steps: identifiers.len() as u64,
    });

    let (tx, rx) = mpsc::channel();
    let mut report = ScanReport::default();

    thread::scope(|scope| {
        scope.spawn(move || {
            pool.install(|| {
                identifiers.par_iter().for_each_with(tx, |tx, identifier| {
                    // The receiver outlives every sender, so a send cannot fail.
                    let _ = tx.send(scan_structure(identifier, source, config));
                });
            });
        });

        for outcome in rx {
            let status = match &outcome {
                ScanOutcome::Found(_) => ScanStatus::Found,
                ScanOutcome::Empty { .. } => ScanStatus::Empty,
                ScanOutcome::Failed(_) => ScanStatus::Failed,
            };
            if let ScanOutcome::Failed(failure) = &outcome {
                reporter.report(Progress::Message(format!(
                    "{} failed at {} stage: {}",
                    failure.identifier, failure.stage, failure.message
                )));
            }
            reporter.report(Progress::StructureScanned {
                identifier: outcome.identifier().to_string(),
                status,
            });
            report.record(outcome);
        }
    });

    report.sort();
    reporter.report(Progress::TaskFinish);
    info!(summary = %report.summary(), "Scan finished.");

    Ok(report)
}
