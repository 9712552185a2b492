//! API request handlers

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use tracing::error;
use tracing::info;

use crate::api::types::ApiResponse;
use crate::api::types::AskRequest;
use crate::api::types::AskResponse;
use crate::api::types::ProbeResponse;
use crate::api::types::SourceResponse;
use crate::errors::CrediRagError;
use crate::health::HealthChecker;
use crate::health::HealthStatus;
use crate::rag::RagSystem;
use crate::rate_limit::RateLimiter;
use crate::session::SessionManager;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub rag: Arc<RagSystem>,
    pub sessions: Arc<SessionManager>,
    pub rate_limiter: Arc<RateLimiter>,
    pub health: Arc<HealthChecker>,
}

/// Ask a question (POST /api/ask)
pub async fn ask(
    State(state): State<AppState>,
    Json(req): Json<AskRequest>,
) -> (StatusCode, Json<ApiResponse<AskResponse>>) {
    info!("POST /api/ask: {}", req.question);

    // Admission before any session or retrieval work
    let client_id = req.session_id.as_deref().unwrap_or("anonymous");
    if !state.rate_limiter.is_allowed(client_id) {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ApiResponse::error(
                "Rate limit exceeded. Please wait a moment before asking again.",
            )),
        );
    }

    let session = state.sessions.get_or_create(req.session_id.as_deref());

    match state.rag.answer_question(&req.question).await {
        Ok(result) => {
            state
                .sessions
                .record_exchange(&session.session_id, &result.question, &result.answer);

            let response = AskResponse {
                sources: result.sources.iter().map(SourceResponse::from).collect(),
                answer: result.answer,
                session_id: session.session_id,
            };
            (StatusCode::OK, Json(ApiResponse::success(response)))
        }
        Err(CrediRagError::Validation(message)) => {
            (StatusCode::BAD_REQUEST, Json(ApiResponse::error(message)))
        }
        Err(e @ CrediRagError::PipelineTimeout(_)) => (
            StatusCode::GATEWAY_TIMEOUT,
            Json(ApiResponse::error(e.to_string())),
        ),
        Err(e) => {
            // Internal detail stays in the logs, never in the response
            error!("Error processing question: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error(
                    "An internal error occurred. Please try again.",
                )),
            )
        }
    }
}

/// Health check (GET /api/health)
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthStatus>> {
    Json(ApiResponse::success(state.health.status().await))
}

/// Readiness probe (GET /api/ready)
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<ProbeResponse>) {
    if state.health.readiness().await {
        (
            StatusCode::OK,
            Json(ProbeResponse {
                status: "ready".to_string(),
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ProbeResponse {
                status: "not ready".to_string(),
            }),
        )
    }
}

/// Liveness probe (GET /api/live)
pub async fn liveness() -> Json<ProbeResponse> {
    Json(ProbeResponse {
        status: "alive".to_string(),
    })
}
