//! HTTP boundary
//!
//! `POST /api/agent` takes `{"userInput": ...}` and answers
//! `{"agentResponse": ...}`. Errors are JSON `{"error": ...}` with 400, 405 or
//! 500. `GET /health` reports the active provider and profile.

use axum::{
    body::Bytes,
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::any::Any;
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::error::RelayError;
use crate::gateway::MISSING_CREDENTIAL_REPLY;
use crate::logging;
use crate::orchestrator::Orchestrator;

#[derive(Debug, Deserialize)]
struct AgentRequest {
    #[serde(rename = "userInput", default)]
    user_input: Option<Value>,
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn panic_response(_err: Box<dyn Any + Send + 'static>) -> Response {
    logging::log_error(None, "Handler panicked; answering 500");
    error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
}

pub fn router(orchestrator: Arc<Orchestrator>) -> Router {
    Router::new()
        .route("/health", get(health))
        // any() so non-POST methods get a JSON 405 rather than axum's empty one
        .route("/api/agent", any(handle_agent))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(orchestrator)
}

async fn health(State(orchestrator): State<Arc<Orchestrator>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "provider": orchestrator.gateway().provider().name(),
        "profile": orchestrator.profile_id(),
    }))
}

async fn handle_agent(
    State(orchestrator): State<Arc<Orchestrator>>,
    method: Method,
    body: Bytes,
) -> Response {
    if method != Method::POST {
        return error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed; use POST");
    }

    if !orchestrator.gateway().has_credential() {
        logging::log_error(None, "Rejecting request: no provider API key configured");
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, MISSING_CREDENTIAL_REPLY);
    }

    let request: AgentRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            return error_response(StatusCode::BAD_REQUEST, &format!("Invalid JSON body: {}", e))
        }
    };

    let user_input = match request.user_input {
        Some(Value::String(s)) if !s.trim().is_empty() => s,
        _ => return error_response(StatusCode::BAD_REQUEST, "userInput is required"),
    };

    let reply = orchestrator.process_interaction(&user_input).await;
    Json(json!({ "agentResponse": reply })).into_response()
}

/// Bind and serve until the process is stopped
pub async fn serve(orchestrator: Arc<Orchestrator>, bind: &str) -> Result<(), RelayError> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    logging::log_conversation(None, &format!(
        "Listening on http://{}/api/agent (profile '{}', provider {})",
        listener.local_addr()?,
        orchestrator.profile_id(),
        orchestrator.gateway().provider().name()
    ));

    axum::serve(listener, router(orchestrator)).await?;
    Ok(())
}
