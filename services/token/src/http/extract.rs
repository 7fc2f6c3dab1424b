//! Request extractors: client fingerprint and authenticated session.

use super::AppState;
use super::error::ApiError;
use crate::storage::{Fingerprint, SessionRecord};
use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::HeaderMap;
use axum::http::header::{AUTHORIZATION, USER_AGENT};
use axum::http::request::Parts;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::error;

/// User agent and network address of the caller.
#[derive(Debug, Clone)]
pub struct ClientFingerprint(pub Fingerprint);

impl FromRequestParts<Arc<AppState>> for ClientFingerprint {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user_agent = parts
            .headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let forwarded = if state.trust_proxy_headers {
            forwarded_address(&parts.headers)
        } else {
            None
        };

        let address = match forwarded {
            Some(address) => address,
            None => {
                let ConnectInfo(peer) = ConnectInfo::<SocketAddr>::from_request_parts(parts, state)
                    .await
                    .map_err(|e| {
                        error!(error = %e, "Peer address unavailable");
                        ApiError::internal()
                    })?;
                peer.ip().to_string()
            }
        };

        Ok(Self(Fingerprint::new(user_agent, address)))
    }
}

/// First `X-Forwarded-For` hop, then `X-Real-IP`.
fn forwarded_address(headers: &HeaderMap) -> Option<String> {
    let first_hop = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    };

    first_hop.or_else(real_ip).map(str::to_string)
}

/// Raw access token from the `Authorization` header. A `Bearer ` prefix is
/// accepted but not required.
pub fn access_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim_start();
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    (!token.is_empty()).then_some(token)
}

/// Session behind a valid access token.
///
/// Rejects with `401 Unauthorized` when the header is missing, the token is
/// invalid, or its session no longer exists.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession(pub SessionRecord);

impl FromRequestParts<Arc<AppState>> for AuthenticatedSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = access_token(&parts.headers).ok_or_else(ApiError::unauthorized)?;
        let record = state.engine.authenticate(token).await?;
        Ok(Self(record))
    }
}
