//! HTTP request handlers

use super::types::{
    ChatRequest, ChatResponse, ErrorResponse, HealthResponse, OrchestrateRequest, StartRequest,
};
use super::AppState;
use crate::llm::LlmRequest;
use crate::state_machine::{ConversationState, Turn, DEFAULT_USER_NAME};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use std::time::Duration;
use tower_http::services::{ServeDir, ServeFile};

const CHAT_TIMEOUT: Duration = Duration::from_secs(60);
const CHAT_SYSTEM_PROMPT: &str = "Reply with ONE short sentence only.";
const CHAT_MAX_TOKENS: u32 = 80;
const CHAT_TEMPERATURE: f32 = 0.7;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    let static_dir = state.static_dir.clone();

    let router = Router::new()
        .route("/orchestrate", post(orchestrate))
        .route("/start", post(start))
        .route("/chat", post(chat))
        .route("/health", get(health))
        .route("/version", get(get_version))
        .with_state(state);

    // Everything else is the single-page client
    match static_dir {
        Some(dir) => {
            let index = ServeFile::new(dir.join("index.html"));
            router.fallback_service(ServeDir::new(dir).fallback(index))
        }
        None => router,
    }
}

fn user_name_or_default(name: Option<String>) -> String {
    name.map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| DEFAULT_USER_NAME.to_string())
}

// ============================================================
// Conversation
// ============================================================

/// One turn. Any JSON body yields a turn; bad fields fall back to defaults.
async fn orchestrate(State(state): State<AppState>, Json(body): Json<Value>) -> Json<Turn> {
    let req = OrchestrateRequest::from_value(&body);
    let conversation = ConversationState::restore(req.conversation_state);
    let user_name = user_name_or_default(req.user_name);

    let turn = state
        .orchestrator
        .step(&conversation, &req.user_message, &user_name)
        .await;
    Json(turn)
}

/// Opening lines for a fresh session
async fn start(State(state): State<AppState>, body: Option<Json<StartRequest>>) -> Json<Turn> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    let user_name = user_name_or_default(req.user_name);
    Json(state.orchestrator.opening(&user_name))
}

// ============================================================
// Free-form chat
// ============================================================

async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let llm = state
        .llm
        .clone()
        .ok_or_else(|| AppError::Unavailable("Missing OPENAI_API_KEY".to_string()))?;

    let message = req
        .message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing message".to_string()))?;

    let request = LlmRequest::with_system(CHAT_SYSTEM_PROMPT)
        .user(message)
        .max_tokens(CHAT_MAX_TOKENS)
        .temperature(CHAT_TEMPERATURE);

    let response = tokio::time::timeout(CHAT_TIMEOUT, llm.complete(&request))
        .await
        .map_err(|_| AppError::Internal("Chat request timed out".to_string()))?
        .map_err(|e| AppError::Internal(e.message))?;

    let reply = match response.text.trim() {
        "" => "...".to_string(),
        text => text.to_string(),
    };
    Ok(Json(ChatResponse { reply }))
}

// ============================================================
// Status
// ============================================================

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        polish: state.orchestrator.polishes(),
        chat: state.llm.is_some(),
    })
}

async fn get_version() -> &'static str {
    concat!("huddle ", env!("CARGO_PKG_VERSION"))
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    Internal(String),
    Unavailable(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
