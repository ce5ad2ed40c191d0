use chrono::{serde::ts_seconds, DateTime, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation};
use rocket::{
    http::{Cookie, CookieJar, SameSite},
    time::Duration,
};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::mongodb::Id;

pub const AUTH_TOKEN_COOKIE: &str = "token";

/// An authentication token representing a specific user.
///
/// The user's role is deliberately absent: anything that depends on it
/// must re-read the user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    pub id: Id,
}

impl AuthToken {
    /// Create a new [`AuthToken`] for the given user ID.
    pub fn new(id: Id) -> Self {
        Self { id }
    }

    /// Sign this token, valid for the configured lifetime from now.
    pub fn encode(self, config: &Config) -> Result<String> {
        let issued_at = Utc::now();
        let claims = Claims {
            token: self,
            issued_at,
            expire_at: issued_at + config.auth_ttl(),
        };

        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret()),
        )
        .map_err(|e| Error::Internal(format!("Failed to sign session token: {e}")))
    }

    /// Verify the signature and expiry of an encoded token.
    pub fn decode(encoded: &str, config: &Config) -> Result<Self> {
        let token = jsonwebtoken::decode(
            encoded,
            &DecodingKey::from_secret(config.jwt_secret()),
            &Validation::default(),
        )
        .map(|claims: TokenData<Claims>| claims.claims.token)?;
        Ok(token)
    }

    /// Serialize this token into a session cookie.
    pub fn into_cookie(self, config: &Config) -> Result<Cookie<'static>> {
        let token = self.encode(config)?;

        Ok(Cookie::build(AUTH_TOKEN_COOKIE, token)
            .path("/")
            .max_age(Duration::seconds(config.auth_ttl().num_seconds()))
            .http_only(true)
            .same_site(SameSite::Strict)
            .finish())
    }

    /// Deserialize a token from a cookie.
    pub fn from_cookie(cookie: &Cookie<'_>, config: &Config) -> Result<Self> {
        Self::decode(cookie.value(), config)
    }

    /// Make this token the caller's active session.
    pub fn start_session(self, cookies: &CookieJar<'_>, config: &Config) -> Result<()> {
        cookies.add(self.into_cookie(config)?);
        Ok(())
    }

    /// End the caller's session, if any, by expiring the cookie.
    pub fn end_session(cookies: &CookieJar<'_>) {
        cookies.remove(Cookie::named(AUTH_TOKEN_COOKIE));
    }
}

/// Token claims: the token itself plus issue and expiry datetimes.
#[derive(Serialize, Deserialize)]
struct Claims {
    #[serde(flatten)]
    token: AuthToken,
    #[serde(rename = "iat", with = "ts_seconds")]
    issued_at: DateTime<Utc>,
    #[serde(rename = "exp", with = "ts_seconds")]
    expire_at: DateTime<Utc>,
}
