/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use coursetrack_api::{app::{build_router, AppState}, config::Config};
/// use coursetrack_shared::auth::session::MemorySessionStore;
/// use coursetrack_shared::store::MemoryStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::for_memory("0123456789abcdef0123456789abcdef");
/// let state = AppState::new(
///     config,
///     Arc::new(MemoryStore::new()),
///     Arc::new(MemorySessionStore::new()),
/// )?;
/// let app = build_router(state);
///
/// let listener = tokio::net::TcpListener::bind("127.0.0.1:4000").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use coursetrack_shared::auth::session::{SessionError, SessionManager, SessionStore};
use coursetrack_shared::store::Store;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::Config;
use crate::cookies::CookieSettings;
use crate::graphql::{build_schema, AppSchema};
use crate::middleware::security::SecurityHeadersLayer;
use crate::routes;

/// Shared application state
///
/// Cloned into every handler; all fields are cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,

    pub sessions: SessionManager,

    pub cookies: CookieSettings,

    pub schema: AppSchema,

    pub config: Arc<Config>,
}

impl AppState {
    /// # Errors
    ///
    /// `SessionError::InvalidSecret` if the configured secret is too short
    pub fn new(
        config: Config,
        store: Arc<dyn Store>,
        session_store: Arc<dyn SessionStore>,
    ) -> Result<Self, SessionError> {
        let sessions = SessionManager::new(
            session_store,
            config.session.secret.as_bytes(),
            config.session.ttl(),
        )?;

        Ok(Self {
            store,
            sessions,
            cookies: CookieSettings::from_config(&config),
            schema: build_schema(),
            config: Arc::new(config),
        })
    }
}

/// Builds the complete router
///
/// ```text
/// /
/// ├── GET  /health
/// └── POST /graphql
/// ```
///
/// # Middleware Stack
///
/// Outermost first: security headers, CORS, request tracing.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.api.cors_origins);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/graphql", post(routes::graphql::graphql_handler))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// CORS with credentials, so the browser sends the session cookie
///
/// Credentialed requests cannot use a literal `*` origin; `*` in the config
/// mirrors the request origin instead.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|origin| origin == "*") {
        AllowOrigin::mirror_request()
    } else {
        let origins: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}
