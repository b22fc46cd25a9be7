//! HTTP server initialization and runtime setup.
//!
//! Handles storage setup, migrations, and the Axum server lifecycle.

use crate::application::services::RetryPolicy;
use crate::config::{Config, StorageBackend};
use crate::domain::repositories::{TableOrderRepository, TableRepository};
use crate::domain::{RandomIdGenerator, SystemClock};
use crate::infrastructure::persistence::{
    InMemoryTableOrderRepository, InMemoryTableRepository, PgTableOrderRepository,
    PgTableRepository,
};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

type Repositories = (Arc<dyn TableOrderRepository>, Arc<dyn TableRepository>);

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - Storage (PostgreSQL pool with migrations, or in-memory)
/// - Order and table services
/// - Axum HTTP server with graceful shutdown on Ctrl+C / SIGTERM
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let (orders, tables) = match config.storage_backend {
        StorageBackend::Postgres => postgres_repositories(&config).await?,
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, data is lost on restart");
            memory_repositories()
        }
    };

    let retry = RetryPolicy {
        max_retries: config.order_update_retries,
        base_delay_ms: config.order_retry_base_ms,
    };

    let state = AppState::new(
        orders,
        tables,
        Arc::new(SystemClock),
        Arc::new(RandomIdGenerator),
        retry,
    );

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Connects to PostgreSQL using the configured pool settings.
pub async fn connect_pool(config: &Config) -> Result<PgPool> {
    let url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL is required for the postgres storage backend")?;

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(url)
        .await
        .context("Failed to connect to database")?;

    Ok(pool)
}

async fn postgres_repositories(config: &Config) -> Result<Repositories> {
    let pool = connect_pool(config).await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to migrate")?;
    tracing::info!("Migrations applied");

    let pool = Arc::new(pool);
    let orders: Arc<dyn TableOrderRepository> = Arc::new(PgTableOrderRepository::new(pool.clone()));
    let tables: Arc<dyn TableRepository> = Arc::new(PgTableRepository::new(pool));
    Ok((orders, tables))
}

fn memory_repositories() -> Repositories {
    (
        Arc::new(InMemoryTableOrderRepository::new()),
        Arc::new(InMemoryTableRepository::new()),
    )
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Unable to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Unable to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
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
