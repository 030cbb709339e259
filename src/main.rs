mod cli;
mod models;
mod pricing;
mod scrapers;
mod storage;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, ExtractArgs, MigrateArgs, RunArgs};
use models::ReferenceRate;
use pricing::RateProvider;
use scrapers::{build_client, ListingExtractor, ListingSelectors, Pacing, Paginator, YapoScraper};
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🏠 Arriendo Scout - Yapo rental prices");
    info!("======================================");

    let cli = Cli::parse();

    match cli.command.unwrap_or_else(|| Commands::Run(RunArgs::default())) {
        Commands::Run(args) => {
            extract(&args.extract).await?;
            migrate(&args.extract.output, &args.db)?;
        }
        Commands::Extract(args) => extract(&args).await?,
        Commands::Migrate(MigrateArgs { csv, db }) => migrate(&csv, &db)?,
    }

    info!("🎉 Done");
    Ok(())
}

/// Scrape every page, normalize prices and write the CSV
async fn extract(args: &ExtractArgs) -> Result<()> {
    let selectors = match &args.selectors {
        Some(path) => ListingSelectors::from_json_file(path)?,
        None => ListingSelectors::default(),
    };
    let extractor = ListingExtractor::new(selectors.compile()?, &args.url)?;
    let client = build_client()?;

    let rate = if args.skip_rate {
        info!("Skipping UF lookup, using default ${}", ReferenceRate::DEFAULT.value());
        ReferenceRate::DEFAULT
    } else {
        RateProvider::new(client.clone(), args.rate_url.as_str())
            .fetch_reference_rate()
            .await
    };

    let scraper = YapoScraper::new(client);
    let pacing = Pacing::from_millis(args.min_delay_ms, args.max_delay_ms);
    let outcome = Paginator::new(&scraper, &extractor, rate, pacing)
        .run(&args.url, args.max_pages)
        .await;

    let failed = outcome
        .records
        .iter()
        .filter(|r| r.currency_origin.is_failure())
        .count();
    let discounted = outcome.records.iter().filter(|r| r.has_discount()).count();
    let unlinked = outcome.records.iter().filter(|r| !r.has_link()).count();

    info!(
        "✅ Scraped {} listings from {}/{} pages ({} skipped)",
        outcome.records.len(),
        outcome.pages_fetched,
        outcome.total_pages,
        outcome.pages_skipped
    );
    if let Some(page) = outcome.stopped_early_at {
        info!("Ran out of listings at page {}", page);
    }
    info!("   {} with discount, {} without link", discounted, unlinked);
    if failed > 0 {
        warn!("{} listings have a price that could not be normalized", failed);
    }

    storage::export_csv(&outcome.records, &args.output)
}

/// Load the CSV into SQLite and print the cheapest listings as a self-check
fn migrate(csv_path: &Path, db_path: &Path) -> Result<()> {
    info!("🚀 Migrating {} into {}", csv_path.display(), db_path.display());
    storage::migrate_to_relational(csv_path, db_path)?;

    let conn = storage::sqlite::open(db_path)?;
    let cheapest = storage::cheapest_listings(&conn, 3).context("Validation query failed")?;

    info!("🔍 Top {} cheapest listings:", cheapest.len());
    for listing in &cheapest {
        let title: String = listing.title.chars().take(40).collect();
        info!(
            "💰 ${} ({}) - {}...",
            storage::format_clp(listing.price_clp),
            listing.currency_origin,
            title
        );
    }
    if cheapest.is_empty() {
        warn!("No listing priced above ${}", storage::format_clp(storage::sqlite::PRICE_SANITY_FLOOR));
    }

    Ok(())
}
