//! Leettrack backend server entrypoint.

use std::sync::Arc;
use std::time::Instant;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use leettrack_api::leetcode::{LeetCodeApi, LeetCodeGraphqlClient};
use leettrack_api::sync::{SyncEngine, SyncService};
use leettrack_api::{AppState, build_router};
use leettrack_config::AppConfig;
use leettrack_storage::{
    PgTaskRepository, PgUserRepository, TaskRepository, UserRepository, create_pool,
    run_migrations,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting leettrack backend server");

    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    run_migrations(&pool).await?;

    let user_repo: Arc<dyn UserRepository> = Arc::new(PgUserRepository::new(pool.clone()));
    let task_repo: Arc<dyn TaskRepository> = Arc::new(PgTaskRepository::new(pool.clone()));

    // One HTTP session shared by all sync activity for the process lifetime.
    let leetcode: Arc<dyn LeetCodeApi> =
        Arc::new(LeetCodeGraphqlClient::new(config.request_timeout())?);

    let engine = Arc::new(SyncEngine::new(leetcode.clone(), task_repo.clone()));
    let sync = Arc::new(SyncService::new(
        user_repo.clone(),
        engine,
        config.sync_interval(),
        config.sync_fetch_limit,
    ));

    if config.sync_enabled {
        sync.start().await;
    } else {
        tracing::info!("LeetCode auto-sync is disabled in settings");
    }

    let state = Arc::new(AppState {
        pool,
        user_repo,
        task_repo,
        leetcode,
        sync: sync.clone(),
        config: config.clone(),
        start_time: Instant::now(),
    });

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.bind_address).await?;
    tracing::info!(address = %config.bind_address, "Server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Let the in-flight tick finish its current owner before exiting.
    sync.stop().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %error, "Failed to listen for shutdown signal");
    }
}
