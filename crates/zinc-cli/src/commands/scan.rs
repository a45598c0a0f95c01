use crate::cli::ScanArgs;
use crate::config::{PartialAppConfig, ScanSettings};
use crate::error::{CliError, Result};
use crate::fetch::{RcsbFetcher, cached_identifiers};
use crate::report;
use crate::search::{RcsbSearchClient, dedup_identifiers, parse_identifier_list};
use crate::utils::progress::CliProgressHandler;
use tokio::runtime::Handle;
use tracing::{info, warn};
use zincscan::engine::progress::ProgressReporter;
use zincscan::engine::source::LocalDirectorySource;
use zincscan::workflows;

pub async fn run(args: ScanArgs) -> Result<()> {
    let partial_config = PartialAppConfig::load(args.config.as_deref())?;
    info!("Merging configuration from file and CLI arguments...");
    let settings = partial_config.merge_scan_args(&args)?;

    let identifiers = resolve_identifiers(&args, &settings).await?;
    if identifiers.is_empty() {
        warn!("No structure identifiers to scan.");
        println!("No structures to scan.");
        return Ok(());
    }

    println!(
        "Scanning {} structure(s) with {} worker(s) for ligands within {} Å of zinc...",
        identifiers.len(),
        settings.core.workers,
        settings.core.radius
    );

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    let report = if settings.offline {
        let source = LocalDirectorySource::new(&settings.download.cache_dir);
        info!(cache = %source.root().display(), "Offline mode: reading cached files only.");
        tokio::task::block_in_place(|| {
            workflows::scan::run(&identifiers, &source, &settings.core, &reporter)
        })?
    } else {
        let fetcher = RcsbFetcher::new(&settings.download, Handle::current())?;
        info!(cache = %fetcher.cache_dir().display(), "Using structure cache.");
        tokio::task::block_in_place(|| {
            workflows::scan::run(&identifiers, &fetcher, &settings.core, &reporter)
        })?
    };

    report::write_table(&report.results, &settings.output)?;
    println!("{}", report::render_summary(&report));
    println!(
        "{} structure(s) have at least one ligand within {} Å. Results written to {}",
        report.results.len(),
        settings.core.radius,
        settings.output.display()
    );

    Ok(())
}

/// Command-line identifiers plus the identifier file; when both are absent, the cache
/// contents (offline) or the RCSB search.
async fn resolve_identifiers(args: &ScanArgs, settings: &ScanSettings) -> Result<Vec<String>> {
    let mut identifiers = dedup_identifiers(&args.ids);
    if let Some(path) = &args.ids_file {
        let text = tokio::fs::read_to_string(path).await?;
        identifiers.extend(parse_identifier_list(&text));
        identifiers = dedup_identifiers(identifiers);
    }
    if !identifiers.is_empty() {
        return Ok(identifiers);
    }

    if settings.offline {
        return cached_identifiers(&settings.download.cache_dir).map_err(CliError::from);
    }

    println!("Fetching zinc-containing entry identifiers from RCSB...");
    let client = reqwest::Client::builder()
        .timeout(settings.download.timeout)
        .build()?;
    let identifiers = RcsbSearchClient::new(client)
        .zinc_entries(&settings.search)
        .await?;
    println!("→ {} entries contain zinc", identifiers.len());
    Ok(dedup_identifiers(identifiers))
}
