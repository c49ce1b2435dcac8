use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;

use skycast_core::{CacheBackend, Config};
use skycast_lookup::{LookupOutcome, LookupService};
use skycast_store::{CacheStore, HistoryStore, MemoryCache, SqliteCache};
use skycast_weather::WeatherApi;

mod cli;
mod format;

#[tokio::main]
async fn main() -> Result<()> {
    skycast_core::init()?;

    let args = cli::Args::parse();
    let config = Config::load()?;
    for warning in config.validate() {
        tracing::warn!("{warning}");
    }

    std::fs::create_dir_all(&config.data_dir)
        .with_context(|| format!("Failed to create data dir {}", config.data_dir.display()))?;
    let db_path = config.db_path();

    let ttl = Duration::from_secs(config.cache.ttl_secs);
    let cache: Box<dyn CacheStore> = match config.cache.backend {
        CacheBackend::Memory => Box::new(MemoryCache::new(ttl)),
        CacheBackend::Sqlite => Box::new(
            SqliteCache::open(&db_path, ttl).context("Failed to open cache database")?,
        ),
    };
    let history = HistoryStore::open(&db_path).context("Failed to open history database")?;
    let api = WeatherApi::with_endpoints(
        config.api.geocoding_url.as_str(),
        config.api.forecast_url.as_str(),
    )
    .context("Failed to build weather client")?;

    let service = LookupService::new(api, cache, history);

    if let Some(city) = &args.city {
        let outcome = service.lookup_by_city(city).await;
        report(&outcome);
    } else if let Some(coords) = &args.coords {
        // clap enforces exactly two values
        let (lat, lon) = (coords[0], coords[1]);
        let outcome = service.lookup_by_coords(lat, lon).await;
        report(&outcome);
    } else if args.history {
        let records = service
            .recent_history(args.limit)
            .context("Failed to read history")?;
        println!("{}", format::history(&records));
    } else if args.stats {
        let stats = service.statistics().context("Failed to read statistics")?;
        println!("{}", format::statistics(&stats));
    } else if args.clear_history {
        let deleted = service.clear_history().context("Failed to clear history")?;
        println!("Deleted {deleted} history records.");
    }

    Ok(())
}

fn report(outcome: &LookupOutcome) {
    println!("{}", format::weather(outcome));
    for warning in &outcome.warnings {
        eprintln!("warning: {warning}");
    }
}
