use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::api::AppState;
use crate::error::SessionError;

/// Body of a create-session call.
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    /// Raw token; hashed before storage
    pub token: String,
    /// Subject
    pub username: String,
}

/// Body of an end-session call.
#[derive(Debug, Deserialize)]
pub struct EndSessionRequest {
    /// Raw token; hashed before lookup
    pub token: String,
}

/// Answer to a create-session call.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    /// Id of the stored session
    pub session_id: i64,
    /// Human-readable outcome
    pub message: &'static str,
}

/// `POST {base}/auth-sessions`
pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<Json<SessionResponse>, SessionError> {
    let record = state.sessions.create(&request.token, &request.username).await?;
    Ok(Json(SessionResponse {
        session_id: record.id,
        message: "Session created",
    }))
}

/// `PUT {base}/auth-sessions/end`
pub async fn end_session(
    State(state): State<AppState>,
    Json(request): Json<EndSessionRequest>,
) -> Result<StatusCode, SessionError> {
    state.sessions.end(&request.token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Liveness probe.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "UP" }))
}
