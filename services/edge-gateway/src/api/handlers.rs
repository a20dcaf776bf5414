use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::api::AppState;
use crate::error::EdgeError;
use crate::jwt::Verification;
use crate::middleware::bearer_token;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Subject to issue a token for
    pub username: String,
}

/// `POST /auth/login`: issue a token and answer with it as plain text.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<String, EdgeError> {
    let token = state.store.issue(&request.username).await?;
    tracing::info!(username = %request.username, "Login");

    state.audit.login(token.clone(), request.username);
    Ok(token)
}

/// `POST /auth/logout`: revoke the caller's live token.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, EdgeError> {
    let token = bearer_token(&headers).map_err(|_| EdgeError::BearerMissing)?;

    let subject = match state.verifier.verify(token) {
        Verification::Valid { subject } => subject,
        other => return Err(EdgeError::TokenRejected(other)),
    };

    state.store.revoke(&subject).await?;
    tracing::info!(username = %subject, "Logout");

    state.audit.logout(token.to_string());
    Ok(StatusCode::NO_CONTENT)
}

/// Liveness probe.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "UP" }))
}
