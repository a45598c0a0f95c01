use crate::cli::{CacheArgs, CacheCommands};
use crate::config::PartialAppConfig;
use crate::error::Result;
use crate::fetch::clear_cache;
use tracing::info;

pub fn run(args: CacheArgs) -> Result<()> {
    let config = PartialAppConfig::load(args.config.as_deref())?;
    let cache_dir = config.cache_dir(args.cache.as_deref());

    match args.command {
        CacheCommands::Path => {
            println!("{}", std::path::absolute(&cache_dir)?.display());
        }
        CacheCommands::Clear => {
            info!(cache = %cache_dir.display(), "Clearing structure cache.");
            let removed = clear_cache(&cache_dir)?;
            println!(
                "Removed {} cached structure file(s) from {}",
                removed,
                cache_dir.display()
            );
        }
    }
    Ok(())
}
