use std::time::Duration;

use anyhow::Context;
use axum::extract::FromRef;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use super::claims::Claims;
use crate::{config::JwtConfig, state::AppState};

const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,
    #[error("Invalid token")]
    Invalid,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            _ => Self::Invalid,
        }
    }
}

/// Signing and verification keys derived from the shared secret.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let JwtConfig {
            secret,
            ttl_minutes,
        } = &state.config.jwt;
        let ttl_secs = u64::try_from(*ttl_minutes).unwrap_or(0).saturating_mul(60);
        Self::new(secret, Duration::from_secs(ttl_secs))
    }
}

impl JwtKeys {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Issues a token for `username` that expires `ttl` from now.
    pub fn issue(&self, username: &str) -> anyhow::Result<String> {
        let ttl = TimeDuration::seconds(i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX));
        let exp = OffsetDateTime::now_utc()
            .checked_add(ttl)
            .context("token expiry out of range")?;
        let claims = Claims {
            sub: username.to_string(),
            exp: usize::try_from(exp.unix_timestamp()).context("token expiry before epoch")?,
        };
        let token = self.sign(&claims)?;
        debug!(username, exp = claims.exp, "jwt signed");
        Ok(token)
    }

    fn sign(&self, claims: &Claims) -> anyhow::Result<String> {
        Ok(encode(&Header::new(ALGORITHM), claims, &self.encoding)?)
    }

    /// Checks signature, algorithm and expiry, returning the token's subject.
    pub fn validate(&self, token: &str) -> Result<String, TokenError> {
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(username = %data.claims.sub, "jwt verified");
        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(secret: &str) -> JwtKeys {
        JwtKeys::new(secret, Duration::from_secs(60 * 60))
    }

    fn unix_now() -> i64 {
        OffsetDateTime::now_utc().unix_timestamp()
    }

    #[test]
    fn issued_token_validates_to_username() {
        let keys = keys("dev-secret");
        let token = keys.issue("admin").expect("issue");
        assert_eq!(keys.validate(&token), Ok("admin".to_string()));
    }

    #[test]
    fn expiry_is_one_ttl_after_issue() {
        let keys = keys("dev-secret");
        let token = keys.issue("admin").expect("issue");
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        let data = decode::<Claims>(&token, &keys.decoding, &validation).expect("decode");
        let delta = data.claims.exp as i64 - unix_now();
        assert!((3590..=3600).contains(&delta), "unexpected ttl: {delta}");
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let keys = keys("dev-secret");
        let token = keys
            .sign(&Claims {
                sub: "admin".into(),
                exp: (unix_now() - 5) as usize,
            })
            .expect("sign");
        assert_eq!(keys.validate(&token), Err(TokenError::Expired));
    }

    #[test]
    fn token_from_another_secret_is_invalid() {
        let token = keys("other-secret").issue("admin").expect("issue");
        assert_eq!(keys("dev-secret").validate(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn garbage_and_wrong_algorithm_are_invalid() {
        let keys = keys("dev-secret");
        assert_eq!(keys.validate("not.a.jwt"), Err(TokenError::Invalid));

        let claims = Claims {
            sub: "admin".into(),
            exp: (unix_now() + 600) as usize,
        };
        let hs512 = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"dev-secret"),
        )
        .expect("sign");
        assert_eq!(keys.validate(&hs512), Err(TokenError::Invalid));
    }

    #[test]
    fn oversized_ttl_fails_to_issue_instead_of_overflowing() {
        let mut state = AppState::fake();
        std::sync::Arc::make_mut(&mut state.config).jwt.ttl_minutes = i64::MAX;
        let keys = JwtKeys::from_ref(&state);
        assert!(keys.issue("admin").is_err());
    }

    #[test]
    fn negative_ttl_issues_an_already_expired_token() {
        let mut state = AppState::fake();
        std::sync::Arc::make_mut(&mut state.config).jwt.ttl_minutes = -10;
        let keys = JwtKeys::from_ref(&state);
        let token = keys.issue("admin").expect("issue");
        std::thread::sleep(Duration::from_millis(1100));
        assert_eq!(keys.validate(&token), Err(TokenError::Expired));
    }

    #[test]
    fn keys_from_state_use_configured_secret() {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        let token = keys.issue("admin").expect("issue");
        let same = JwtKeys::new(&state.config.jwt.secret, Duration::from_secs(60));
        assert_eq!(same.validate(&token), Ok("admin".to_string()));
    }
}
