use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use anime_recs::{
    config::Config,
    db::{create_pool, create_redis_client, Cache, PgStore},
    routes::{create_router, AppState},
    services::{RecommendationScorer, RecommendationService, RecommendationSettings},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,anime_recs=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().context("failed to load configuration")?;

    let pool = create_pool(&config.database_url)
        .await
        .context("failed to connect to PostgreSQL")?;
    let store = Arc::new(PgStore::new(pool));
    store.migrate().await.context("failed to run migrations")?;

    let redis_client = create_redis_client(&config.redis_url)?;
    let (cache, cache_writer) = Cache::new(redis_client);

    let scorer = RecommendationScorer::new(config.scorer_config());
    let recommendations = RecommendationService::new(
        store.clone(),
        store.clone(),
        Arc::new(cache),
        scorer,
        RecommendationSettings::from(&config),
    );

    let state = AppState {
        catalog: store.clone(),
        favorites: store,
        recommendations,
    };
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        addr = %addr,
        limit = config.recommendation_limit,
        min_liked = config.min_liked_items,
        refresh_policy = ?config.refresh_policy,
        "Server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cache_writer.shutdown().await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => tracing::error!(error = %e, "Failed to install SIGTERM handler"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
