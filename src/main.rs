//! symws bridge server
//!
//! Serves catalog holdings and patron account operations over REST,
//! backed by SirsiDynix Symphony Web Services.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use symws_bridge::{
    api,
    config::{AppConfig, SessionBackend},
    services::{
        redis::RedisSessionStore,
        session::{MemorySessionStore, SessionStore},
        symws::{SymphonyService, SymwsClient},
        Services,
    },
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("symws_bridge={},tower_http=debug", config.logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting symws bridge v{}", env!("CARGO_PKG_VERSION"));

    let sessions: Arc<dyn SessionStore> = match config.session.backend {
        SessionBackend::Redis => {
            let store = RedisSessionStore::new(&config.redis.url, config.session.ttl_seconds).await?;
            tracing::info!("Sessions stored in Redis");
            Arc::new(store)
        }
        SessionBackend::Memory => {
            tracing::info!("Sessions stored in memory");
            Arc::new(MemorySessionStore::new())
        }
    };

    let symws: Arc<dyn SymphonyService> = Arc::new(SymwsClient::new(&config.symws)?);
    tracing::info!("Using Symphony Web Services at {}", config.symws.base_url());

    let services = Services::new(symws, sessions, config.behaviors.clone());

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    };

    let app = api::create_router(state);

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
