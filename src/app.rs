use std::sync::Arc;

use axum::{
    http::HeaderValue,
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use crate::config::{ApiConfig, AppConfig};
use crate::gateway::Gateway;
use crate::handlers::{self, AppState};
use crate::middleware::protect;

/// Install the global tracing subscriber. `RUST_LOG` wins over the default.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tenant_gateway=info,tower_http=info"));

    // Ignore a second init (tests, embedding)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Full application: downstream routes behind the gateway, then CORS and
/// request tracing outside it.
pub fn app(gateway: Arc<Gateway>, state: AppState, api: &ApiConfig) -> Router {
    let router = protect(routes(), gateway).with_state(state);

    let router = if api.enable_cors {
        router.layer(cors_layer(api))
    } else {
        router
    };

    if api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Downstream routes, grouped by the class the gateway assigns them.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Public
        .route("/", get(handlers::public::root))
        .route("/health", get(handlers::public::health))
        // Any authenticated principal
        .route("/api/auth/me", get(handlers::protected::whoami))
        .route("/api/profile", get(handlers::protected::whoami))
        // Tenant scoped
        .route(
            "/api/meetings",
            get(handlers::protected::meetings_list).post(handlers::protected::meeting_create),
        )
        .route("/api/meetings/:id", get(handlers::protected::meeting_get))
        // Platform administration
        .route("/api/super-admin/overview", get(handlers::elevated::overview))
        .fallback(handlers::public::not_found)
}

fn cors_layer(api: &ApiConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = api
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods(tower_http::cors::AllowMethods::mirror_request())
        .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
}

/// Validate config, build the app, and serve until Ctrl-C.
pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    config.validate()?;

    let gateway = Gateway::from_config(&config.security)?;
    tracing::info!(
        environment = ?config.environment,
        verify_tokens = gateway.decoder().verifies_signatures(),
        cookie = gateway.cookie_name(),
        "starting tenant gateway"
    );

    let app = app(Arc::new(gateway), AppState::new(), &config.api);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
