//! Property-based tests for the access token codec.
//!
//! Claims survive signing: subject, session id and expiry come back intact.
//! Tamper evidence: altering any signed segment is rejected.
//! Expiry: a token never validates once its expiry has passed.

use proptest::prelude::*;
use session_token::config::SigningSecret;
use session_token::jwt::{AccessClaims, AccessTokenCodec, JwtCodec};
use std::time::Duration;

const SECRET: &[u8] = b"test-secret-key-for-property-testing-32b";

fn codec() -> JwtCodec {
    JwtCodec::new(&SigningSecret::new(SECRET).unwrap(), Duration::from_secs(3600))
}

/// Generate arbitrary subject strings.
fn arb_subject() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_-]{1,128}"
}

/// Generate arbitrary TTL (1 minute to 24 hours).
fn arb_ttl() -> impl Strategy<Value = u64> {
    60u64..86_400u64
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_claims_survive_signing(
        subject in arb_subject(),
        session_id in 1i64..i64::MAX,
        ttl in arb_ttl(),
    ) {
        let codec = codec();
        let claims = AccessClaims::new(subject, session_id, Duration::from_secs(ttl));

        let token = codec.encode(&claims).unwrap();
        let decoded = codec.decode(&token).unwrap();

        prop_assert_eq!(decoded, claims);
    }

    #[test]
    fn prop_tampered_token_rejected(
        subject in arb_subject(),
        segment in 0usize..3,
        position in any::<prop::sample::Index>(),
    ) {
        let codec = codec();
        let token = codec
            .encode(&AccessClaims::new(subject, 1, Duration::from_secs(600)))
            .unwrap();

        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        let target = &mut parts[segment];
        let index = position.index(target.len());
        let original = target.as_bytes()[index];
        let replacement = if original == b'A' { 'B' } else { 'A' };
        target.replace_range(index..=index, &replacement.to_string());
        let tampered = parts.join(".");

        prop_assert!(codec.decode(&tampered).is_err());
    }

    #[test]
    fn prop_expired_never_validates(subject in arb_subject(), age in 0i64..86_400) {
        let codec = codec();
        let mut claims = AccessClaims::new(subject, 1, Duration::from_secs(60));
        claims.exp = chrono::Utc::now().timestamp() - age;

        let token = codec.encode(&claims).unwrap();

        prop_assert!(codec.decode(&token).is_err());
    }
}
