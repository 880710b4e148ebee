use std::sync::Arc;
use std::time::Duration;

use btc_prophet::api::router::create_router;
use btc_prophet::config::{AppConfig, LogFormat};
use btc_prophet::db::{self, PgBackend, Storage, StorageBackend};
use btc_prophet::game::GameEngine;
use btc_prophet::price::{PriceFeed, PriceSource};
use btc_prophet::AppState;

const PRICE_HTTP_TIMEOUT_SECS: u64 = 5;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    init_tracing(config.log_format);

    let metrics_handle = btc_prophet::metrics::init_metrics();
    let addr = format!("{}:{}", config.host, config.port);

    // --- Storage: Postgres primary when configured, memory otherwise ---
    let primary: Option<Arc<dyn StorageBackend>> = match &config.database_url {
        Some(url) => {
            let pool = db::init_pool(url, config.db_max_connections, config.db_acquire_timeout())?;
            if config.db_migrate {
                tracing::info!("Running database migrations...");
                db::run_migrations(&pool).await?;
            }
            tracing::info!("Primary store configured (Postgres)");
            Some(Arc::new(PgBackend::new(pool)) as Arc<dyn StorageBackend>)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory storage (state is lost on restart)");
            None
        }
    };
    let storage = Arc::new(Storage::new(primary));
    let engine = GameEngine::new(storage);

    // --- Price feed ---
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(PRICE_HTTP_TIMEOUT_SECS))
        .build()?;
    let prices: Arc<dyn PriceSource> = Arc::new(PriceFeed::new(
        http,
        config.price_api_url.clone(),
        config.price_cache_ttl(),
    ));
    tracing::info!(
        url = %config.price_api_url,
        cache_secs = config.price_cache_secs,
        "Price feed configured"
    );

    let state = AppState {
        engine,
        prices,
        metrics_handle,
    };
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
    }
}
