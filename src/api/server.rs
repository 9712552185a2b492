//! HTTP server implementation

use std::sync::Arc;

use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::handlers::AppState;
use crate::api::routes;
use crate::config::AppConfig;
use crate::health::HealthChecker;
use crate::rag::RagSystem;
use crate::rate_limit::RateLimiter;
use crate::session::SessionManager;
use crate::Result;

/// Start the API server
pub async fn serve_api(
    config: &AppConfig,
    host: String,
    port: u16,
    enable_cors: bool,
) -> Result<()> {
    info!("Starting credirag API server...");

    // Initialize services
    let rag = Arc::new(RagSystem::new(config).await?);
    let health = Arc::new(HealthChecker::new(rag.clone()));

    let sessions = Arc::new(SessionManager::new(config.session_ttl()));
    sessions.spawn_sweeper(config.session_sweep_interval());

    let rate_limiter = Arc::new(RateLimiter::new(
        config.rate_limit_max_requests(),
        config.rate_limit_window(),
    ));
    rate_limiter.spawn_sweeper(config.rate_limit_window());

    let state = AppState {
        rag,
        sessions,
        rate_limiter,
        health,
    };

    let mut app = Router::new()
        .nest("/api", routes::api_routes(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    if enable_cors {
        info!("CORS enabled");
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("API server listening on http://{}", addr);
    info!("Available endpoints:");
    info!("  POST /api/ask     - Ask a question about the complaint corpus");
    info!("  GET  /api/health  - Health check with component detail");
    info!("  GET  /api/ready   - Readiness probe");
    info!("  GET  /api/live    - Liveness probe");

    axum::serve(listener, app).await?;

    Ok(())
}
