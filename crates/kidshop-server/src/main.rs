mod api;
mod auth;
mod middleware;
mod scheduler;

use std::sync::Arc;

use kidshop_courier::SteadfastClient;
use kidshop_media::CloudinaryClient;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    auth::AdminAuth,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(kidshop_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::info!(env = %config.env, bind_addr = %config.bind_addr, "starting kidshop server");

    let pool_config = kidshop_db::PoolConfig::from_app_config(&config);
    let pool = kidshop_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = kidshop_db::run_migrations(&pool).await?;
    tracing::info!(applied, "database migrations complete");

    let courier = SteadfastClient::new(config.http_timeout_secs)?;
    let media = config
        .cloudinary
        .clone()
        .map(|cloudinary| CloudinaryClient::new(cloudinary, config.http_timeout_secs))
        .transpose()?;
    if media.is_none() {
        tracing::warn!("CLOUDINARY_* not set; image uploads will fail");
    }

    let _scheduler =
        scheduler::build_scheduler(pool.clone(), Arc::clone(&config), courier.clone()).await?;

    let state = AppState {
        pool: pool.clone(),
        auth: AdminAuth::from_config(&config),
        config: Arc::clone(&config),
        courier,
        media,
    };
    let app = build_app(state, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    tracing::info!("database pool closed");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received, draining connections");
}
