//! # Coursetrack API Server
//!
//! Serves the GraphQL API at `POST /graphql` and a liveness check at
//! `GET /health`.
//!
//! ## Backends
//!
//! - `STORAGE_BACKEND=postgres` (default): PostgreSQL for users, courses and
//!   tasks; Redis for sessions. Migrations run on startup.
//! - `STORAGE_BACKEND=memory`: everything in process, lost on restart.
//!
//! ## Usage
//!
//! ```bash
//! STORAGE_BACKEND=memory SESSION_SECRET=$(openssl rand -hex 32) \
//!     cargo run -p coursetrack-api
//! ```

use std::sync::Arc;

use anyhow::Context;
use coursetrack_api::app::{build_router, AppState};
use coursetrack_api::config::{Config, StorageBackend};
use coursetrack_shared::auth::session::{MemorySessionStore, RedisSessionStore, SessionStore};
use coursetrack_shared::db::migrations::{ensure_database_exists, run_migrations};
use coursetrack_shared::db::pool::{close_pool, create_pool, DatabaseConfig};
use coursetrack_shared::redis::client::sanitize_url;
use coursetrack_shared::redis::RedisClient;
use coursetrack_shared::store::{MemoryStore, PgStore, Store};
use sqlx::PgPool;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "coursetrack_api=debug,coursetrack_shared=info,tower_http=debug";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

struct Backends {
    store: Arc<dyn Store>,
    sessions: Arc<dyn SessionStore>,
    /// Kept for a clean close on shutdown
    pool: Option<PgPool>,
}

async fn connect_backends(config: &Config) -> anyhow::Result<Backends> {
    match config.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; all data is lost on restart");
            Ok(Backends {
                store: Arc::new(MemoryStore::new()),
                sessions: Arc::new(MemorySessionStore::new()),
                pool: None,
            })
        }
        StorageBackend::Postgres => {
            let database_url = config
                .storage
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres backend")?;

            ensure_database_exists(database_url)
                .await
                .context("Failed to create database")?;

            let mut db_config = DatabaseConfig::new(database_url);
            db_config.max_connections = config.storage.max_connections;
            let pool = create_pool(db_config)
                .await
                .context("Failed to connect to PostgreSQL")?;

            run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;

            let redis_config = config
                .storage
                .redis()
                .context("REDIS_URL is required for the postgres backend")?;
            tracing::info!(url = %sanitize_url(&redis_config.url), "Connecting to Redis");
            let redis = RedisClient::new(redis_config)
                .await
                .context("Failed to connect to Redis")?;

            Ok(Backends {
                store: Arc::new(PgStore::new(pool.clone())),
                sessions: Arc::new(RedisSessionStore::new(redis)),
                pool: Some(pool),
            })
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl+C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to listen for SIGTERM");
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

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!(
        "Coursetrack API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::debug!(?config, "Configuration loaded");

    let backends = connect_backends(&config).await?;
    backends
        .store
        .ping()
        .await
        .context("Storage health check failed")?;
    tracing::info!(backend = backends.store.backend(), "Storage ready");

    let address = config.bind_address();
    let state = AppState::new(config, backends.store, backends.sessions)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    tracing::info!("Server listening on http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pool) = backends.pool {
        close_pool(pool).await;
    }

    tracing::info!("Server stopped");
    Ok(())
}
