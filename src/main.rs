use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use fish_proxy::{
    AppState,
    config::{Config, StoreBackend},
    router::create_router,
    store::{KeyValueStore, MemoryStore, RedisStore, StoreSlot},
    upstream::FishWatchClient,
};
#[cfg(debug_assertions)]
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Configuration
    let config = Config::from_env().expect("Failed to load configuration");

    // Upstream species API client
    let upstream = FishWatchClient::new(&config.upstream_base_url, config.upstream_timeout())
        .expect("Failed to build HTTP client");

    // Filled once the store connection is up; /fish answers 503 until then
    let store = StoreSlot::new();
    let state = AppState::new(config.clone(), store.clone(), Arc::new(upstream));

    // Readiness gate, rate limiter and cache gate are wired in create_router
    let router = create_router(state);

    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(CorsLayer::permissive())
    };

    // Listen before the store connects
    let addr = SocketAddr::new(
        config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        config.server_port,
    );
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind");
    tracing::info!("App listening on {}", addr);

    let server = tokio::spawn(async move {
        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
    });

    // Connect the key-value store, then open the gate
    let backend: Arc<dyn KeyValueStore> = match config.store_backend {
        StoreBackend::Redis => match RedisStore::connect(&config.redis_url).await {
            Ok(redis) => Arc::new(redis),
            Err(e) => {
                tracing::error!("Failed to connect to Redis at {}: {}", config.redis_url, e);
                std::process::exit(1);
            }
        },
        StoreBackend::Memory => {
            tracing::warn!("Using in-process store; counters and cache are not shared");
            Arc::new(MemoryStore::new())
        }
    };
    store.install(backend);
    tracing::info!("Store connected, serving requests");

    server
        .await
        .expect("Server task panicked")
        .expect("Failed to start server");
}
