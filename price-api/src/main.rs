use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use mtg_price_api::state::AppState;
use mtg_price_tracker::{config, AsyncPriceTracker, PriceTracker};

#[derive(Parser, Debug)]
#[command(name = "mtg-price-api")]
#[command(about = "Price tracking for owned MTG cards", long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, env = "PRICE_API_BIND", default_value = "0.0.0.0:3000")]
    bind: String,

    /// DuckDB database file
    #[arg(long, env = "PRICE_API_DATABASE", default_value = "price-tracker.duckdb")]
    database: String,

    /// Scryfall API base URL
    #[arg(long, env = "SCRYFALL_API_BASE", default_value = config::SCRYFALL_API_BASE)]
    scryfall_base: String,

    /// Timeout for Scryfall requests, in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let builder = PriceTracker::builder()
        .database(&args.database)
        .api_base(&args.scryfall_base)
        .timeout(Duration::from_secs(args.timeout_secs));
    let tracker = AsyncPriceTracker::build(builder)
        .await
        .with_context(|| format!("failed to open price tracker at {}", args.database))?;
    tracing::info!(database = %args.database, "price tracker ready");

    let app = mtg_price_api::app(Arc::new(AppState { tracker }));

    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("failed to bind {}", args.bind))?;
    tracing::info!(addr = %args.bind, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
