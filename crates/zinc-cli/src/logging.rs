use crate::error::{CliError, Result};
use std::fs::File;
use std::path::Path;
use tracing::Subscriber;
use tracing_subscriber::{
    Layer,
    filter::{LevelFilter, Targets},
    fmt::{self, format::FmtSpan},
    prelude::*,
    registry::LookupSpan,
};

/// Crates whose events the log file records at least at DEBUG level.
const SCAN_TARGETS: [&str; 2] = ["zincscan", "zincscan_cli"];

fn level_for(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::OFF
    } else {
        match verbosity {
            0 => LevelFilter::WARN,
            1 => LevelFilter::INFO,
            2 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }
}

/// The log file keeps a per-structure trail whatever the console verbosity: one line
/// per closed `scan_structure` span with its identifier and timing, on the named
/// worker thread that ran it.
fn scan_log_layer<S>(file: File, verbosity: u8) -> impl Layer<S> + Send + Sync
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    let level = level_for(verbosity, false).max(LevelFilter::DEBUG);
    let targets = SCAN_TARGETS
        .iter()
        .fold(Targets::new().with_default(LevelFilter::WARN), |targets, target| {
            targets.with_target(*target, level)
        });

    fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_thread_names(true)
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_filter(targets)
}

pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<&Path>) -> Result<()> {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .compact()
        .with_filter(level_for(verbosity, quiet));

    let file_layer = log_file
        .map(|path| File::create(path).map_err(CliError::Io))
        .transpose()?
        .map(|file| scan_log_layer(file, verbosity));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::sync::Once;
    use tracing::{debug, error, info, trace, warn};

    static INIT: Once = Once::new();

    fn ensure_global_logger_is_set() {
        INIT.call_once(|| {
            setup_logging(3, false, None).expect("Failed to set up global logger for tests");
        });
    }

    #[test]
    fn verbosity_count_maps_to_levels() {
        assert_eq!(level_for(0, false), LevelFilter::WARN);
        assert_eq!(level_for(1, false), LevelFilter::INFO);
        assert_eq!(level_for(2, false), LevelFilter::DEBUG);
        assert_eq!(level_for(7, false), LevelFilter::TRACE);
        assert_eq!(level_for(2, true), LevelFilter::OFF);
    }

    #[test]
    #[serial]
    fn initialization_and_macros_work() {
        ensure_global_logger_is_set();

        error!("This is an error");
        warn!("This is a warning");
        info!(structure = "1CA2", "This is info");
        debug!("This is debug");
        trace!("This is trace");
    }

    #[test]
    #[serial]
    fn log_file_records_structure_spans_below_console_level() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("scan.log");

        let file = File::create(&log_path).unwrap();
        let subscriber = tracing_subscriber::registry().with(scan_log_layer(file, 0));

        tracing::subscriber::with_default(subscriber, || {
            let span = tracing::info_span!("scan_structure", identifier = "2XYZ");
            let _entered = span.enter();
            debug!(atoms = 1532, "Loaded coordinate model.");
            trace!("Searched around zinc atom.");
        });

        let content = std::fs::read_to_string(log_path).unwrap();
        assert!(content.contains("DEBUG"));
        assert!(content.contains("Loaded coordinate model."));
        assert!(content.contains("scan_structure{identifier=\"2XYZ\"}"));
        assert!(content.contains("close"));
        assert!(!content.contains("Searched around zinc atom."));
    }

    #[test]
    #[serial]
    fn unwritable_log_file_propagates_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = setup_logging(0, false, Some(temp_dir.path()));
        assert!(matches!(result, Err(CliError::Io(_))));
    }
}
