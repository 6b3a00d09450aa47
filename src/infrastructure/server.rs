// Server module - router assembly and the listening loop
// Used by main.rs and the integration tests

use axum::Router;
use axum::http::HeaderValue;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::infrastructure::AppState;
use crate::infrastructure::storage::PUBLIC_PREFIX;

/// Build the full application: `/api` routes, stored covers under `/uploads`,
/// CORS and request tracing
pub fn build_router(state: AppState) -> Router {
    let uploads = ServeDir::new(state.covers.dir());
    let cors = cors_layer(&state.config.cors_allowed_origins);

    Router::new()
        .nest("/api", api::api_router(state))
        .nest_service(PUBLIC_PREFIX, uploads)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Allow any origin when none are configured
fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let mut allowed = Vec::new();
    for origin in origins {
        match origin.parse::<HeaderValue>() {
            Ok(v) => allowed.push(v),
            Err(e) => tracing::error!("Failed to parse CORS origin '{}': {}", origin, e),
        }
    }
    cors.allow_origin(allowed)
}

/// Bind `0.0.0.0:<port>` and serve until the process exits
pub async fn start_server(state: AppState) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.port));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Shelfmate server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
}
