//! HTTP Handlers

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use bridge_core::{LicenseBundle, Order, Product};
use bridge_gateway::{BridgeError, RepackLicenses, SessionId, acquire_exclusive};

use crate::state::{AppState, SharedSession};

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub sessions: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    /// Offending order field, for schema errors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OrderRequest {
    pub reference_id: String,
    pub products: Vec<Product>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
pub struct FinalizeBody {
    #[serde(default)]
    pub details: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FinalizeResponse {
    pub finalized: bool,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);
pub type ApiResult<T> = Result<Json<T>, ApiError>;

fn bridge_error(err: &BridgeError) -> ApiError {
    let status = match err {
        BridgeError::Schema(_) => StatusCode::UNPROCESSABLE_ENTITY,
        BridgeError::Backend(_) => StatusCode::BAD_GATEWAY,
        BridgeError::SessionBusy => StatusCode::CONFLICT,
        BridgeError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    tracing::warn!(error = %err, status = %status, "Request failed");

    (
        status,
        Json(ErrorResponse {
            error: err.user_message(),
            code: err.code().into(),
            field: match err {
                BridgeError::Schema(schema) => schema.field().map(Into::into),
                _ => None,
            },
        }),
    )
}

fn session_not_found(id: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("Session {id} not found"),
            code: "SESSION_NOT_FOUND".into(),
            field: None,
        }),
    )
}

fn session_limit(capacity: usize) -> ApiError {
    tracing::warn!(capacity, "Session limit reached");
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse {
            error: format!("Session limit of {capacity} reached, end a session and retry"),
            code: "SESSION_LIMIT".into(),
            field: None,
        }),
    )
}

/// Unwrap a JSON body, turning axum's plain-text rejection into an `ErrorResponse`
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        let status = rejection.status();
        tracing::warn!(error = %rejection.body_text(), status = %status, "Rejected request body");
        (
            status,
            Json(ErrorResponse {
                error: rejection.body_text(),
                code: "INVALID_REQUEST".into(),
                field: None,
            }),
        )
    })
}

fn find_session(state: &AppState, id: &str) -> Result<SharedSession, ApiError> {
    state
        .sessions
        .get(&SessionId::from_string(id))
        .ok_or_else(|| session_not_found(id))
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        sessions: state.sessions.len(),
    })
}

/// Build a provider order without submitting it
pub async fn build_order(
    State(state): State<AppState>,
    payload: Result<Json<OrderRequest>, JsonRejection>,
) -> ApiResult<Order> {
    let payload = json_body(payload)?;
    Ok(Json(state.builder.build(payload.reference_id, payload.products)))
}

/// Start a license session
pub async fn create_session(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let id = state
        .sessions
        .create()
        .ok_or_else(|| session_limit(state.sessions.capacity()))?;
    tracing::info!(session_id = %id, "Created license session");

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            session_id: id.to_string(),
        }),
    ))
}

/// End a license session
pub async fn end_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    if !state.sessions.remove(&SessionId::from_string(&id)) {
        return Err(session_not_found(&id));
    }
    tracing::info!(session_id = %id, "Ended license session");
    Ok(StatusCode::NO_CONTENT)
}

/// Direct mode: build, submit and hold the issued licenses
pub async fn acquire_licenses(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<OrderRequest>, JsonRejection>,
) -> ApiResult<LicenseBundle> {
    let payload = json_body(payload)?;
    let session = find_session(&state, &id)?;
    let order = state.builder.build(payload.reference_id, payload.products);

    acquire_exclusive(&session, &state.gateway, &order, &state.config.submit_url)
        .await
        .map(Json)
        .map_err(|e| bridge_error(&e))
}

/// Direct mode: hand the held licenses and payment details to the backend
pub async fn finalize_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<FinalizeBody>, JsonRejection>,
) -> ApiResult<FinalizeResponse> {
    let payload = json_body(payload)?;
    let session = find_session(&state, &id)?;
    let guard = session
        .try_lock()
        .map_err(|_| bridge_error(&BridgeError::SessionBusy))?;

    guard
        .finalize(&state.gateway, &payload.details, &state.config.finalize_url)
        .await
        .map_err(|e| bridge_error(&e))?;

    Ok(Json(FinalizeResponse { finalized: true }))
}

/// Webhook mode: build, submit and repack the returned order
pub async fn repack_order(
    State(state): State<AppState>,
    payload: Result<Json<OrderRequest>, JsonRejection>,
) -> ApiResult<Order> {
    let payload = json_body(payload)?;
    let order = state.builder.build(payload.reference_id, payload.products);

    state
        .gateway
        .submit(&order, &state.config.submit_url, RepackLicenses)
        .await
        .map(Json)
        .map_err(|e| bridge_error(&e))
}
