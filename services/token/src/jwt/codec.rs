//! Access token encoding and verification.

use crate::config::SigningSecret;
use crate::error::TokenError;
use crate::jwt::claims::AccessClaims;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use std::time::Duration;

/// Signs and verifies access tokens.
pub trait AccessTokenCodec: Send + Sync {
    /// Produce a signed token carrying `claims`.
    fn encode(&self, claims: &AccessClaims) -> Result<String, TokenError>;

    /// Verify signature, algorithm and expiry, and return the claims.
    fn decode(&self, token: &str) -> Result<AccessClaims, TokenError>;

    /// Validity window of freshly minted tokens.
    fn ttl(&self) -> Duration;
}

/// HMAC-SHA512 JWT codec.
pub struct JwtCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtCodec {
    pub const ALGORITHM: Algorithm = Algorithm::HS512;

    pub fn new(secret: &SigningSecret, ttl: Duration) -> Self {
        let mut validation = Validation::new(Self::ALGORITHM);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }
}

impl AccessTokenCodec for JwtCodec {
    fn encode(&self, claims: &AccessClaims) -> Result<String, TokenError> {
        encode(&Header::new(Self::ALGORITHM), claims, &self.encoding_key)
            .map_err(|e| TokenError::issuance(format!("JWT encoding error: {e}")))
    }

    fn decode(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let token_data = decode::<AccessClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| TokenError::invalid_token(e.to_string()))?;

        let claims = token_data.claims;
        if claims.is_expired() {
            return Err(TokenError::invalid_token("token expired"));
        }
        Ok(claims)
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }
}
