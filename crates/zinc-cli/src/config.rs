mod defaults;

pub use defaults::DefaultsConfig;

use crate::cli::{ScanArgs, SearchArgs};
use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;
use zincscan::engine::config::{CandidatePolicy, ScanConfig, ScanConfigBuilder};

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialScanConfig {
    radius: Option<f64>,
    workers: Option<usize>,
    #[serde(rename = "hetero-only")]
    hetero_only: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialSearchConfig {
    #[serde(rename = "human-only")]
    human_only: Option<bool>,
    #[serde(rename = "page-size")]
    page_size: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialDownloadConfig {
    #[serde(rename = "cache-dir")]
    cache_dir: Option<PathBuf>,
    #[serde(rename = "timeout-secs")]
    timeout_secs: Option<u64>,
    retries: Option<u32>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct PartialOutputConfig {
    path: Option<PathBuf>,
}

/// Configuration as read from a TOML file, before CLI flags and defaults are applied.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialAppConfig {
    scan: Option<PartialScanConfig>,
    search: Option<PartialSearchConfig>,
    download: Option<PartialDownloadConfig>,
    output: Option<PartialOutputConfig>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchSettings {
    pub human_only: bool,
    pub page_size: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DownloadSettings {
    pub cache_dir: PathBuf,
    pub timeout: Duration,
    pub retries: u32,
}

/// Fully resolved settings of the `scan` command.
#[derive(Debug, Clone)]
pub struct ScanSettings {
    pub core: ScanConfig,
    pub search: SearchSettings,
    pub download: DownloadSettings,
    pub output: PathBuf,
    pub offline: bool,
}

impl PartialAppConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Reads `path` if given, otherwise starts from an empty configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::from_file)
    }

    /// Resolves the `scan` settings. Precedence, lowest to highest: defaults, the
    /// configuration file, command-line flags, then `--set` overrides.
    pub fn merge_scan_args(mut self, args: &ScanArgs) -> Result<ScanSettings> {
        self.overlay_scan_args(args);
        self.apply_set_values(&args.set_values)?;
        let defaults = DefaultsConfig::default();

        let scan = self.scan.take().unwrap_or_default();
        let candidates = if scan.hetero_only.unwrap_or(defaults.hetero_only) {
            CandidatePolicy::HeteroOnly
        } else {
            CandidatePolicy::AllResidues
        };

        let core = ScanConfigBuilder::new()
            .radius(scan.radius.unwrap_or(defaults.radius))
            .workers(scan.workers.unwrap_or(defaults.workers))
            .candidates(candidates)
            .build()
            .map_err(|e| CliError::Config(e.to_string()))?;

        let search = self.search_settings(&defaults)?;
        let download = self.download_settings(&defaults)?;
        let output = self
            .output
            .take()
            .and_then(|o| o.path)
            .unwrap_or(defaults.output);

        Ok(ScanSettings {
            core,
            search,
            download,
            output,
            offline: args.offline,
        })
    }

    pub fn merge_search_args(mut self, args: &SearchArgs) -> Result<SearchSettings> {
        let search = self.search.get_or_insert_with(Default::default);
        if args.human_only {
            search.human_only = Some(true);
        }
        if args.page_size.is_some() {
            search.page_size = args.page_size;
        }
        self.apply_set_values(&args.set_values)?;
        self.search_settings(&DefaultsConfig::default())
    }

    /// Resolves the cache directory: CLI flag, then `download.cache-dir`, then the default.
    pub fn cache_dir(&self, cli_value: Option<&Path>) -> PathBuf {
        cli_value
            .map(Path::to_path_buf)
            .or_else(|| self.download.as_ref().and_then(|d| d.cache_dir.clone()))
            .unwrap_or_else(|| DefaultsConfig::default().cache_dir)
    }

    /// Writes every flag given on the command line over the file values. Switches only
    /// ever turn a setting on.
    fn overlay_scan_args(&mut self, args: &ScanArgs) {
        let scan = self.scan.get_or_insert_with(Default::default);
        scan.radius = args.radius.or(scan.radius);
        scan.workers = args.workers.or(scan.workers);
        if args.hetero_only {
            scan.hetero_only = Some(true);
        }

        if args.human_only {
            self.search.get_or_insert_with(Default::default).human_only = Some(true);
        }

        let download = self.download.get_or_insert_with(Default::default);
        download.cache_dir = args.cache.clone().or(download.cache_dir.take());
        download.timeout_secs = args.timeout.or(download.timeout_secs);
        download.retries = args.retries.or(download.retries);

        let output = self.output.get_or_insert_with(Default::default);
        output.path = args.out.clone().or(output.path.take());
    }

    fn search_settings(&mut self, defaults: &DefaultsConfig) -> Result<SearchSettings> {
        let search = self.search.take().unwrap_or_default();
        let page_size = search.page_size.unwrap_or(defaults.page_size);
        if page_size == 0 {
            return Err(CliError::Config(
                "search.page-size must be at least 1".to_string(),
            ));
        }
        Ok(SearchSettings {
            human_only: search.human_only.unwrap_or(defaults.human_only),
            page_size,
        })
    }

    fn download_settings(&mut self, defaults: &DefaultsConfig) -> Result<DownloadSettings> {
        let cache_dir = self.cache_dir(None);
        let download = self.download.take().unwrap_or_default();
        let timeout_secs = download.timeout_secs.unwrap_or(defaults.timeout_secs);
        if timeout_secs == 0 {
            return Err(CliError::Config(
                "download.timeout-secs must be at least 1".to_string(),
            ));
        }
        Ok(DownloadSettings {
            cache_dir,
            timeout: Duration::from_secs(timeout_secs),
            retries: download.retries.unwrap_or(defaults.retries),
        })
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };

            match key {
                "scan.radius" => {
                    self.scan.get_or_insert_with(Default::default).radius =
                        Some(parse_value(key, value_str)?);
                }
                "scan.workers" => {
                    self.scan.get_or_insert_with(Default::default).workers =
                        Some(parse_value(key, value_str)?);
                }
                "scan.hetero-only" => {
                    self.scan.get_or_insert_with(Default::default).hetero_only =
                        Some(parse_value(key, value_str)?);
                }
                "search.human-only" => {
                    self.search.get_or_insert_with(Default::default).human_only =
                        Some(parse_value(key, value_str)?);
                }
                "search.page-size" => {
                    self.search.get_or_insert_with(Default::default).page_size =
                        Some(parse_value(key, value_str)?);
                }
                "download.cache-dir" => {
                    self.download.get_or_insert_with(Default::default).cache_dir =
                        Some(PathBuf::from(value_str));
                }
                "download.timeout-secs" => {
                    self.download.get_or_insert_with(Default::default).timeout_secs =
                        Some(parse_value(key, value_str)?);
                }
                "download.retries" => {
                    self.download.get_or_insert_with(Default::default).retries =
                        Some(parse_value(key, value_str)?);
                }
                "output.path" => {
                    self.output.get_or_insert_with(Default::default).path =
                        Some(PathBuf::from(value_str));
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        CliError::Config(format!(
            "Invalid {} value for {}: {}",
            std::any::type_name::<T>(),
            key,
            value
        ))
    })
}
