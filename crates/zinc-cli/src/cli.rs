use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "zincscan contributors",
    version,
    about = "zincscan - Survey deposited macromolecular structures for ligands sitting close to zinc ions.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan structures for ligands within a radius of any zinc atom and write a ranked table.
    Scan(ScanArgs),
    /// List the identifiers of zinc-containing entries from the RCSB search service.
    Search(SearchArgs),
    /// Inspect or clear the local structure file cache.
    Cache(CacheArgs),
}

/// Arguments for the `scan` subcommand.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Structure identifiers to scan (e.g., 1CA2). Without identifiers or --ids-file,
    /// every zinc-containing entry found by the RCSB search is scanned.
    #[arg(value_name = "ID")]
    pub ids: Vec<String>,

    /// Read identifiers from a file, one per line ('#' starts a comment).
    #[arg(long, value_name = "PATH")]
    pub ids_file: Option<PathBuf>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Neighbor search radius in Angstroms.
    #[arg(short, long, value_name = "FLOAT")]
    pub radius: Option<f64>,

    /// Number of structures scanned concurrently. Defaults to the number of logical cores.
    #[arg(short = 'j', long, value_name = "NUM")]
    pub workers: Option<usize>,

    /// Restrict the RCSB search to entries with a Homo sapiens source organism.
    #[arg(long)]
    pub human_only: bool,

    /// Only report hetero (HETATM) groups as ligands, never polymer residues.
    #[arg(long)]
    pub hetero_only: bool,

    /// Directory where downloaded structure files are cached.
    #[arg(long, value_name = "DIR")]
    pub cache: Option<PathBuf>,

    /// Timeout in seconds for each download request.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Number of times a failed download is retried.
    #[arg(long, value_name = "NUM")]
    pub retries: Option<u32>,

    /// Only scan structures already present in the cache; never access the network.
    #[arg(long)]
    pub offline: bool,

    /// Path of the result table: .xlsx spreadsheet, .tsv tab-separated, otherwise CSV.
    #[arg(short, long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S scan.radius=4.5
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE")]
    pub set_values: Vec<String>,
}

/// Arguments for the `search` subcommand.
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Restrict the search to entries with a Homo sapiens source organism.
    #[arg(long)]
    pub human_only: bool,

    /// Number of identifiers requested per search page.
    #[arg(long, value_name = "NUM")]
    pub page_size: Option<usize>,

    /// Write the identifiers to a file instead of standard output.
    #[arg(short, long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE")]
    pub set_values: Vec<String>,
}

/// Arguments for the `cache` subcommand.
#[derive(Args, Debug)]
pub struct CacheArgs {
    #[command(subcommand)]
    pub command: CacheCommands,

    /// Cache directory to operate on.
    #[arg(long, global = true, value_name = "DIR")]
    pub cache: Option<PathBuf>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available commands for cache management.
#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Show the absolute path to the structure cache directory.
    Path,
    /// Remove every cached structure file.
    Clear,
}
