//! Token Service
//!
//! Issues and verifies signed, time-limited bearer tokens.
//!
//! ## Format
//! `base64url(header) "." base64url(claims) "." base64url(HMAC-SHA256)`,
//! where the header is always `{"alg":"HS256","typ":"JWT"}` and the MAC is
//! computed over the first two segments exactly as transmitted.
//!
//! ## Verification order
//! 1. Three segments, signature segment decodes → else `Malformed`
//! 2. MAC over `header.claims` matches (constant time) → else `BadSignature`
//! 3. Header and claims decode, `iat` not beyond the skew window → else `Malformed`
//! 4. `now < exp` → else `Expired`
//!
//! The signature is checked before anything in the signed text is parsed, so
//! any change to the signed bytes reports `BadSignature`.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use platform::crypto::{from_base64url, hmac_sha256, to_base64url, verify_hmac_sha256};

use crate::application::clock::Clock;
use crate::application::config::{MAX_CLOCK_SKEW, SigningSecret};
use crate::domain::entity::{identity::Identity, token_claims::TokenClaims};
use crate::error::{AuthError, AuthResult};

const HEADER: &str = r#"{"alg":"HS256","typ":"JWT"}"#;

/// Signed token text. Debug output never shows the token.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Token").field(&"[REDACTED]").finish()
    }
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: Token,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

pub struct TokenService {
    secret: Arc<SigningSecret>,
    clock: Arc<dyn Clock>,
    clock_skew_secs: i64,
}

impl TokenService {
    /// `clock_skew` is capped at one minute
    pub fn new(secret: Arc<SigningSecret>, clock: Arc<dyn Clock>, clock_skew: Duration) -> Self {
        let clock_skew = clock_skew.min(MAX_CLOCK_SKEW);
        Self {
            secret,
            clock,
            clock_skew_secs: clock_skew.as_secs() as i64,
        }
    }

    /// Sign `{sub, role, club, iat, exp}` for `identity`.
    ///
    /// `iat` is the issue second (truncated); `exp` is the end of the
    /// lifetime rounded up to the next whole second, so a token never lives
    /// shorter than `ttl`.
    pub fn issue(&self, identity: &Identity, ttl: Duration) -> AuthResult<IssuedToken> {
        if ttl.is_zero() {
            return Err(AuthError::Internal(
                "token lifetime must be positive".to_string(),
            ));
        }
        let ttl_ms = i64::try_from(ttl.as_millis())
            .map_err(|_| AuthError::Internal("token lifetime out of range".to_string()))?;

        let now = self.clock.now();
        let iat = now.timestamp();
        let end_ms = now.timestamp_millis().saturating_add(ttl_ms);
        let exp = end_ms.div_euclid(1000) + i64::from(end_ms.rem_euclid(1000) != 0);

        let claims = TokenClaims::for_identity(identity, iat, exp);
        let payload =
            serde_json::to_vec(&claims).map_err(|e| AuthError::Internal(e.to_string()))?;

        let signing_input = format!("{}.{}", to_base64url(HEADER.as_bytes()), to_base64url(&payload));
        let signature = hmac_sha256(self.secret.as_bytes(), signing_input.as_bytes());
        let token = format!("{signing_input}.{}", to_base64url(&signature));

        let issued_at = DateTime::from_timestamp(iat, 0)
            .ok_or_else(|| AuthError::Internal("token issue time out of range".to_string()))?;
        let expires_at = DateTime::from_timestamp(exp, 0)
            .ok_or_else(|| AuthError::Internal("token expiry out of range".to_string()))?;

        Ok(IssuedToken {
            token: Token(token),
            issued_at,
            expires_at,
        })
    }

    /// Check a presented token and return the identity it carries.
    ///
    /// Pure: no store lookups, so a deleted account's token stays valid until
    /// it expires.
    pub fn verify(&self, token: &str) -> AuthResult<Identity> {
        let mut segments = token.split('.');
        let (Some(header), Some(claims), Some(signature), None) = (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) else {
            return Err(AuthError::Malformed);
        };

        let signature = from_base64url(signature).map_err(|_| AuthError::Malformed)?;
        let signing_input = &token[..header.len() + 1 + claims.len()];
        if !verify_hmac_sha256(self.secret.as_bytes(), signing_input.as_bytes(), &signature) {
            return Err(AuthError::BadSignature);
        }

        let header = from_base64url(header).map_err(|_| AuthError::Malformed)?;
        if header != HEADER.as_bytes() {
            return Err(AuthError::Malformed);
        }

        let claims: TokenClaims = from_base64url(claims)
            .ok()
            .and_then(|bytes| serde_json::from_slice(&bytes).ok())
            .ok_or(AuthError::Malformed)?;

        let now = self.clock.now().timestamp();
        if claims.iat > now.saturating_add(self.clock_skew_secs) {
            return Err(AuthError::Malformed);
        }
        if now >= claims.exp {
            return Err(AuthError::Expired);
        }

        claims.into_identity().ok_or(AuthError::Malformed)
    }
}
