//! One-way hashing of refresh secrets.
//!
//! bcrypt is deliberately slow, so both directions run on tokio's blocking
//! pool. `bcrypt::verify` recomputes the digest with the stored salt and
//! compares it in constant time.

use crate::error::TokenError;
use crate::refresh::generator::RefreshSecret;
use tracing::warn;
use zeroize::Zeroizing;

/// bcrypt hasher with a fixed cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecretHasher {
    cost: u32,
}

impl SecretHasher {
    pub const MIN_COST: u32 = 4;
    pub const MAX_COST: u32 = 31;
    pub const DEFAULT_COST: u32 = 10;

    pub fn new(cost: u32) -> Result<Self, TokenError> {
        Self::check_cost(cost)?;
        Ok(Self { cost })
    }

    pub fn check_cost(cost: u32) -> Result<(), TokenError> {
        if (Self::MIN_COST..=Self::MAX_COST).contains(&cost) {
            Ok(())
        } else {
            Err(TokenError::config(format!(
                "BCRYPT_COST must be within {}..={}, got {cost}",
                Self::MIN_COST,
                Self::MAX_COST
            )))
        }
    }

    pub const fn cost(&self) -> u32 {
        self.cost
    }

    pub async fn hash(&self, secret: &RefreshSecret) -> Result<String, TokenError> {
        let bytes = Zeroizing::new(secret.as_bytes().to_vec());
        let cost = self.cost;

        tokio::task::spawn_blocking(move || bcrypt::hash(bytes.as_slice(), cost))
            .await
            .map_err(|e| TokenError::internal(format!("hash task failed: {e}")))?
            .map_err(|e| TokenError::issuance(format!("hashing failed: {e}")))
    }

    /// `false` on mismatch and on a stored hash that cannot be parsed.
    pub async fn verify(&self, candidate: &[u8], stored_hash: &str) -> bool {
        let candidate = Zeroizing::new(candidate.to_vec());
        let stored_hash = stored_hash.to_string();

        match tokio::task::spawn_blocking(move || bcrypt::verify(candidate.as_slice(), &stored_hash))
            .await
        {
            Ok(Ok(matches)) => matches,
            Ok(Err(e)) => {
                warn!(error = %e, "Stored refresh hash is unreadable");
                false
            }
            Err(e) => {
                warn!(error = %e, "Hash verification task failed");
                false
            }
        }
    }
}

impl Default for SecretHasher {
    fn default() -> Self {
        Self {
            cost: Self::DEFAULT_COST,
        }
    }
}
