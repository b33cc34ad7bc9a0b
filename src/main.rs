// src/main.rs
use clap::Parser;
use log::{info, warn};
use std::sync::Arc;
use stock_dashboard::{
    cache::{CacheStore, MemoryStore, ReadThroughCache, RedisStore, TtlPolicy, UnavailableStore},
    config::Config,
    dashboard::{Dashboard, Screen},
    http_utils::RequestThrottle,
    iex::IexClient,
    stocktwits::StockTwitsClient,
    utils::setup_logging,
};

/// Company overview, fundamentals, news and ownership for a ticker, cached in Redis.
#[derive(Debug, Parser)]
#[command(name = "stock-dashboard", version)]
struct Args {
    /// Ticker symbol
    #[arg(long, default_value = "AAPL")]
    symbol: String,

    /// Screen to render
    #[arg(long, value_enum, default_value_t = Screen::Overview)]
    view: Screen,

    /// Cache in process memory instead of Redis
    #[arg(long)]
    no_redis: bool,
}

async fn build_store(config: &Config, no_redis: bool) -> Arc<dyn CacheStore> {
    if no_redis {
        info!("Using in-memory cache store");
        return Arc::new(MemoryStore::new());
    }
    match RedisStore::connect(&config.redis_url, config.redis_timeout()).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            warn!("Redis unavailable ({}); continuing without cache", e);
            Arc::new(UnavailableStore::new(e.to_string()))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // --- Configuration & Initialization ---
    let config = Config::from_env();
    setup_logging(config.log_level)?;
    config.validate()?;
    config.log_settings();

    let throttle = Arc::new(RequestThrottle::new(
        config.http_max_concurrent,
        config.http_min_delay(),
    ));
    let source = Arc::new(IexClient::from_config(&config, throttle.clone())?);
    let feed = Arc::new(StockTwitsClient::from_config(&config, throttle)?);

    let store = build_store(&config, args.no_redis).await;
    let cache = ReadThroughCache::new(store);
    let dashboard = Dashboard::new(
        cache,
        source,
        feed,
        TtlPolicy::with_overrides(&config.cache_ttl_overrides),
    )
    .with_news_count(config.news_article_count);

    let page = dashboard.render(args.view, &args.symbol).await?;
    println!("{}", page);

    let metrics = dashboard.cache().metrics();
    info!(
        "Cache: {} hits, {} misses, {} degraded (hit rate {:.0}%)",
        metrics.hits,
        metrics.misses,
        metrics.degraded,
        metrics.hit_rate() * 100.0
    );
    Ok(())
}
