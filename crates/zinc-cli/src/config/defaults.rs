use std::path::PathBuf;
use zincscan::engine::config::{DEFAULT_RADIUS_ANGSTROMS, default_workers};

pub struct DefaultsConfig {
    pub radius: f64,
    pub workers: usize,
    pub hetero_only: bool,
    pub human_only: bool,
    pub page_size: usize,
    pub cache_dir: PathBuf,
    pub timeout_secs: u64,
    pub retries: u32,
    pub output: PathBuf,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS_ANGSTROMS,
            workers: default_workers(),
            hetero_only: false,
            human_only: false,
            page_size: 1_000,
            cache_dir: PathBuf::from("pdbs"),
            timeout_secs: 60,
            retries: 3,
            output: PathBuf::from("zinc_ligand_hits.xlsx"),
        }
    }
}
