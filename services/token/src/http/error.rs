//! Mapping of engine failures onto HTTP responses.

use crate::error::TokenError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;

pub const MSG_NO_GUID: &str = "No guid provided";
pub const MSG_UNAUTHORIZED: &str = "Unauthorized";
pub const MSG_FORBIDDEN: &str = "Forbidden";
pub const MSG_INVALID_TOKEN: &str = "Invalid token";
pub const MSG_MALFORMED_BODY: &str = "Malformed body";
pub const MSG_ISSUANCE_FAILED: &str = "Unable to generate a token";
pub const MSG_INTERNAL: &str = "Internal server error";

/// Error response JSON.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Status plus a fixed client-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: &'static str,
}

impl ApiError {
    pub const fn new(status: StatusCode, message: &'static str) -> Self {
        Self { status, message }
    }

    pub const fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, MSG_UNAUTHORIZED)
    }

    pub const fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, MSG_INTERNAL)
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match &err {
            TokenError::BadRequest(_) => Self::new(StatusCode::BAD_REQUEST, MSG_INVALID_TOKEN),
            TokenError::InvalidToken(_) | TokenError::Unauthorized => Self::unauthorized(),
            TokenError::Forbidden => Self::new(StatusCode::FORBIDDEN, MSG_FORBIDDEN),
            TokenError::IssuanceFailed(_) => {
                error!(code = err.code(), error = %err, "Token issuance failed");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, MSG_ISSUANCE_FAILED)
            }
            TokenError::Store(_) | TokenError::Config(_) | TokenError::Internal(_) => {
                error!(code = err.code(), error = %err, "Request failed");
                Self::internal()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.message.to_string(),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StoreError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (TokenError::bad_request("odd length"), StatusCode::BAD_REQUEST),
            (TokenError::invalid_token("expired"), StatusCode::UNAUTHORIZED),
            (TokenError::Unauthorized, StatusCode::UNAUTHORIZED),
            (TokenError::Forbidden, StatusCode::FORBIDDEN),
            (TokenError::issuance("signing"), StatusCode::INTERNAL_SERVER_ERROR),
            (
                TokenError::Store(StoreError::Backend("down".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn test_messages_do_not_leak_details() {
        let api = ApiError::from(TokenError::Store(StoreError::Backend(
            "redis://secret-host:6379 refused".into(),
        )));
        assert_eq!(api.message, MSG_INTERNAL);
    }
}
