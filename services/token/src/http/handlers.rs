use super::AppState;
use super::error::{ApiError, MSG_ISSUANCE_FAILED, MSG_MALFORMED_BODY, MSG_NO_GUID};
use super::extract::{AuthenticatedSession, ClientFingerprint, access_token};
use crate::error::TokenError;
use crate::metrics;
use crate::refresh::encode_for_transport;
use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode, header},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::error::Category;
use std::sync::Arc;
use tracing::{debug, error, info};

#[derive(Debug, Deserialize)]
pub struct IssueParams {
    pub guid: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// base64 of the hex refresh secret
    pub refresh_token: String,
}

#[derive(Deserialize)]
pub struct RefreshBody {
    pub access_token: String,
    /// hex refresh secret
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WhoamiResponse {
    pub guid: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub ok: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// GET /tokens?guid=X
pub async fn issue_tokens(
    State(state): State<Arc<AppState>>,
    ClientFingerprint(fingerprint): ClientFingerprint,
    Query(params): Query<IssueParams>,
) -> Result<Json<TokenResponse>, ApiError> {
    let guid = params
        .guid
        .filter(|g| !g.is_empty())
        .ok_or(ApiError::new(StatusCode::BAD_REQUEST, MSG_NO_GUID))?;

    let pair = state
        .engine
        .issue(&guid, &fingerprint.user_agent, &fingerprint.address)
        .await
        .map_err(|e| match e {
            TokenError::IssuanceFailed(_) => {
                error!(subject = %guid, error = %e, "Token issuance failed");
                ApiError::new(StatusCode::UNAUTHORIZED, MSG_ISSUANCE_FAILED)
            }
            other => ApiError::from(other),
        })?;

    Ok(Json(TokenResponse {
        access_token: pair.access_token,
        refresh_token: encode_for_transport(&pair.refresh_token),
    }))
}

/// POST /uuid
pub async fn whoami(AuthenticatedSession(session): AuthenticatedSession) -> Json<WhoamiResponse> {
    Json(WhoamiResponse {
        guid: session.subject,
    })
}

/// POST /refresh
pub async fn refresh_tokens(
    State(state): State<Arc<AppState>>,
    ClientFingerprint(fingerprint): ClientFingerprint,
    body: Bytes,
) -> Result<Json<TokenResponse>, ApiError> {
    let body: RefreshBody = serde_json::from_slice(&body).map_err(|e| {
        debug!(error = %e, "Rejected refresh body");
        match e.classify() {
            Category::Data => ApiError::new(StatusCode::UNPROCESSABLE_ENTITY, MSG_MALFORMED_BODY),
            Category::Syntax | Category::Eof | Category::Io => {
                ApiError::new(StatusCode::BAD_REQUEST, MSG_MALFORMED_BODY)
            }
        }
    })?;

    let pair = state
        .engine
        .refresh(
            &body.access_token,
            &body.refresh_token,
            &fingerprint.user_agent,
            &fingerprint.address,
        )
        .await?;

    Ok(Json(TokenResponse {
        access_token: pair.access_token,
        refresh_token: encode_for_transport(&pair.refresh_token),
    }))
}

/// POST /logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<LogoutResponse>, ApiError> {
    let token = access_token(&headers).ok_or_else(ApiError::unauthorized)?;
    let session = state.engine.logout(token).await?;
    info!(subject = %session.subject, "Logged out");
    Ok(Json(LogoutResponse { ok: true }))
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// GET /metrics
pub async fn metrics_text() -> Result<impl IntoResponse, ApiError> {
    let body = metrics::render()?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    ))
}
