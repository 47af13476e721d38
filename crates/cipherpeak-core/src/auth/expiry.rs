//! Access-token expiry decoding.
//!
//! The backend issues JWT access tokens; the only claim this client reads is
//! `exp`. The signature is never verified here - the token is opaque except
//! for its expiry instant, and the backend stays the authority on whether a
//! token is actually accepted.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct Claims {
    exp: i64,
}

/// Decode the expiry instant embedded in an access token.
///
/// Returns `None` for anything that does not carry a readable `exp` claim:
/// wrong segment count, invalid base64, invalid JSON, out-of-range instant.
pub fn expiry_of(token: &str) -> Option<DateTime<Utc>> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.as_bytes()).ok()?;
    let claims: Claims = serde_json::from_slice(&bytes).ok()?;
    DateTime::from_timestamp(claims.exp, 0)
}

/// Whether `token` is unusable at `now`.
///
/// The boundary is exact: a token expiring at instant T is valid before T
/// and expired at T. There is no leeway window. Tokens that cannot be
/// decoded count as expired, so a corrupt token triggers a refresh instead
/// of failing the request pipeline.
pub fn is_expired(token: &str, now: DateTime<Utc>) -> bool {
    match expiry_of(token) {
        Some(expires_at) => now >= expires_at,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn token_with_exp(exp: i64) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{},"user_id":7}}"#, exp));
        format!("{}.{}.signature", header, payload)
    }

    #[test]
    fn test_expiry_of_reads_exp_claim() {
        let token = token_with_exp(1_700_000_000);
        let expected = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        assert_eq!(expiry_of(&token), Some(expected));
    }

    #[test]
    fn test_expiry_boundary_is_exact() {
        let exp = 1_700_000_000;
        let token = token_with_exp(exp);

        let before = Utc.timestamp_opt(exp - 1, 0).unwrap();
        let at = Utc.timestamp_opt(exp, 0).unwrap();
        let after = Utc.timestamp_opt(exp + 1, 0).unwrap();

        assert!(!is_expired(&token, before));
        assert!(is_expired(&token, at));
        assert!(is_expired(&token, after));
    }

    #[test]
    fn test_malformed_tokens_are_expired() {
        let now = Utc::now();

        // No payload segment
        assert!(is_expired("", now));
        assert!(is_expired("justonesegment", now));

        // Payload is not base64
        assert!(is_expired("header.!!!not-base64!!!.sig", now));

        // Payload is base64 but not JSON
        let garbage = URL_SAFE_NO_PAD.encode(b"not json at all");
        assert!(is_expired(&format!("h.{}.s", garbage), now));

        // Payload is JSON but has no exp claim
        let no_exp = URL_SAFE_NO_PAD.encode(br#"{"user_id": 7}"#);
        assert!(is_expired(&format!("h.{}.s", no_exp), now));
    }

    #[test]
    fn test_malformed_tokens_have_no_expiry() {
        assert_eq!(expiry_of("not-a-jwt"), None);
        assert_eq!(expiry_of("a.b.c"), None);
    }
}
