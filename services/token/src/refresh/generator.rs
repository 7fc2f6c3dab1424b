use crate::error::TokenError;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use rand::RngCore;
use rand::rngs::OsRng;
use std::fmt;
use zeroize::Zeroizing;

/// Entropy of a refresh secret, in bytes.
pub const SECRET_LEN: usize = 64;

/// Opaque refresh-token secret.
///
/// The raw string form handed to callers is the lower-case hex of the
/// secret bytes; only the bytes are ever hashed.
pub struct RefreshSecret(Zeroizing<Vec<u8>>);

impl RefreshSecret {
    pub fn generate() -> Self {
        let mut bytes = Zeroizing::new(vec![0u8; SECRET_LEN]);
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Decode the hex form presented by a client.
    pub fn from_hex(encoded: &str) -> Result<Self, TokenError> {
        hex::decode(encoded)
            .map(|bytes| Self(Zeroizing::new(bytes)))
            .map_err(|_| TokenError::bad_request("refresh token is not valid hex"))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0.as_slice())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for RefreshSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RefreshSecret(<redacted>)")
    }
}

/// Base64 wrapping used when a refresh token is sent in a response body.
pub fn encode_for_transport(raw: &str) -> String {
    STANDARD.encode(raw.as_bytes())
}

/// Inverse of [`encode_for_transport`].
pub fn decode_from_transport(wire: &str) -> Result<String, TokenError> {
    let bytes = STANDARD
        .decode(wire)
        .map_err(|_| TokenError::bad_request("refresh token is not valid base64"))?;
    String::from_utf8(bytes).map_err(|_| TokenError::bad_request("refresh token is not UTF-8"))
}
