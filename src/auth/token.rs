use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, EXPIRED_TOKEN};
use crate::models::{Role, User};

/// `iss` claim of every token this service signs.
pub const ISSUER: &str = "laundry-tracker";

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "auth_token";

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    pub iss: String,
}

impl Claims {
    pub fn is_expired(&self) -> bool {
        self.exp <= Utc::now().timestamp()
    }
}

/// Outcome of [`TokenManager::refresh`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refreshed {
    pub token: String,
    /// `false` when the presented token was still valid and is returned unchanged.
    pub renewed: bool,
}

/// Signs, verifies and refreshes HS256 session tokens, and builds the matching cookies.
#[derive(Clone)]
pub struct TokenManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    refresh_window: Duration,
    cookie_secure: bool,
}

impl fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("TokenManager")
            .field("ttl", &self.ttl)
            .field("refresh_window", &self.refresh_window)
            .field("cookie_secure", &self.cookie_secure)
            .finish_non_exhaustive()
    }
}

impl TokenManager {
    pub fn new(secret: &str, ttl: Duration, refresh_window: Duration, cookie_secure: bool) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
            refresh_window,
            cookie_secure,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.jwt_secret,
            config.jwt_ttl,
            config.jwt_refresh_window,
            config.cookie_secure,
        )
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token for `user`, valid for the configured ttl.
    pub fn issue(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now().timestamp();
        self.sign(&Claims {
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
            iat: now,
            exp: now + self.ttl.num_seconds(),
            iss: ISSUER.to_string(),
        })
    }

    /// Checks signature, algorithm, issuer and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation(true))?.claims;
        Ok(claims)
    }

    /// Returns a usable token for the holder of `token`.
    ///
    /// The signature must be valid. An unexpired token comes back unchanged; an expired one
    /// is re-issued if it expired less than the refresh window ago.
    pub fn refresh(&self, token: &str) -> Result<Refreshed, AppError> {
        let claims = decode::<Claims>(token, &self.decoding, &self.validation(false))?.claims;
        let now = Utc::now().timestamp();

        if claims.exp > now {
            return Ok(Refreshed {
                token: token.to_string(),
                renewed: false,
            });
        }
        if now - claims.exp > self.refresh_window.num_seconds() {
            return Err(AppError::Unauthorized(EXPIRED_TOKEN.into()));
        }

        let token = self.sign(&Claims {
            iat: now,
            exp: now + self.ttl.num_seconds(),
            ..claims
        })?;
        Ok(Refreshed {
            token,
            renewed: true,
        })
    }

    /// HttpOnly, SameSite=Strict cookie holding `token` for the token's lifetime.
    pub fn session_cookie(&self, token: &str) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE, token.to_owned())
            .path("/")
            .http_only(true)
            .secure(self.cookie_secure)
            .same_site(SameSite::Strict)
            .max_age(CookieDuration::seconds(self.ttl.num_seconds()))
            .finish()
    }

    /// Cookie instructing the browser to drop the session.
    pub fn removal_cookie(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build(SESSION_COOKIE, "")
            .path("/")
            .http_only(true)
            .secure(self.cookie_secure)
            .same_site(SameSite::Strict)
            .finish();
        cookie.make_removal();
        cookie
    }

    fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    fn validation(&self, check_expiry: bool) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.leeway = 0;
        validation.validate_exp = check_expiry;
        validation
    }
}
