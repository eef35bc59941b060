use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::auth::AuthService;
use crate::config::ServerConfig;
use crate::errors::Error;

use super::routes::{build_router, ApiState};

/// Bind and run the HTTP API server until ctrl-c.
pub async fn start_api_server(
    config: ServerConfig,
    state: ApiState,
    auth_service: Arc<AuthService>,
) -> crate::Result<()> {
    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .map_err(|e| Error::config(format!("Invalid API address: {}", e)))?;

    let mut router: Router = build_router(state, auth_service);

    if config.enable_cors {
        router = router.layer(cors_layer(&config.cors_origins));
    }
    router = router.layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| Error::Io { source: e, context: "Failed to bind API server".to_string() })?;

    info!(address = %addr, "Starting HTTP API server");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "API server shutdown listener failed");
            }
        })
        .await
        .map_err(|e| Error::Io { source: e, context: "API server error".to_string() })?;

    info!("API server shutdown completed");
    Ok(())
}

/// Create the CORS layer. A wildcard (or empty) origin list allows any
/// origin without credentials; explicit origins allow credentials.
fn cors_layer(origins: &[String]) -> CorsLayer {
    use axum::http::{header, Method};

    let allowed_headers = [header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT];
    let exposed_headers =
        [header::CONTENT_LENGTH, header::CONTENT_TYPE, header::CONTENT_DISPOSITION];
    let allowed_methods =
        [Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE, Method::OPTIONS];

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_methods(Any)
            .allow_headers(Any)
            .expose_headers(Any)
            .allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_methods(allowed_methods)
            .allow_headers(allowed_headers)
            .expose_headers(exposed_headers)
            .allow_credentials(true)
            .allow_origin(origins)
    }
}
