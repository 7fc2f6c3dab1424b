use crate::storage::SessionId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Claims carried by an access token.
///
/// The JSON names (`guid`, `token`) are the established wire format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessClaims {
    #[serde(rename = "guid")]
    pub subject: String,
    #[serde(rename = "token")]
    pub session_id: SessionId,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
}

impl AccessClaims {
    pub fn new(subject: impl Into<String>, session_id: SessionId, ttl: Duration) -> Self {
        let now = chrono::Utc::now().timestamp();
        let ttl_seconds = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        Self {
            subject: subject.into(),
            session_id,
            exp: now.saturating_add(ttl_seconds),
            iat: now,
        }
    }

    /// A token whose expiry equals the current second is already dead.
    pub const fn is_expired_at(&self, timestamp: i64) -> bool {
        self.exp <= timestamp
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(chrono::Utc::now().timestamp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_creation() {
        let claims = AccessClaims::new("user-123", 17, Duration::from_secs(86_400));

        assert_eq!(claims.subject, "user-123");
        assert_eq!(claims.session_id, 17);
        assert_eq!(claims.exp - claims.iat, 86_400);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_expiry_boundary() {
        let claims = AccessClaims {
            subject: "u".to_string(),
            session_id: 1,
            exp: 1_000,
            iat: 0,
        };

        assert!(!claims.is_expired_at(999));
        assert!(claims.is_expired_at(1_000));
        assert!(claims.is_expired_at(1_001));
    }

    #[test]
    fn test_wire_names() {
        let claims = AccessClaims {
            subject: "u1".to_string(),
            session_id: 5,
            exp: 10,
            iat: 1,
        };
        let json = serde_json::to_value(&claims).unwrap();

        assert_eq!(json["guid"], "u1");
        assert_eq!(json["token"], 5);
        assert_eq!(json["exp"], 10);
    }

    #[test]
    fn test_missing_iat_defaults() {
        let claims: AccessClaims =
            serde_json::from_str(r#"{"guid":"u1","token":3,"exp":99}"#).unwrap();
        assert_eq!(claims.iat, 0);
        assert_eq!(claims.session_id, 3);
    }
}
