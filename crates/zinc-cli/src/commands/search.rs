use crate::cli::SearchArgs;
use crate::config::PartialAppConfig;
use crate::error::Result;
use crate::search::RcsbSearchClient;
use tracing::info;

pub async fn run(args: SearchArgs) -> Result<()> {
    let settings = PartialAppConfig::load(args.config.as_deref())?.merge_search_args(&args)?;
    info!(
        human_only = settings.human_only,
        page_size = settings.page_size,
        "Querying RCSB for zinc-containing entries."
    );

    let identifiers = RcsbSearchClient::new(reqwest::Client::new())
        .zinc_entries(&settings)
        .await?;

    let mut listing = identifiers.join("\n");
    if !listing.is_empty() {
        listing.push('\n');
    }

    match &args.out {
        Some(path) => {
            tokio::fs::write(path, listing).await?;
            println!(
                "{} identifier(s) written to {}",
                identifiers.len(),
                path.display()
            );
        }
        None => print!("{listing}"),
    }
    Ok(())
}
