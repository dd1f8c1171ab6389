use actix_web::cookie::time::{Duration as CookieDuration, OffsetDateTime};
use actix_web::cookie::{Cookie, CookieBuilder, SameSite};
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};
use tracing::debug;

use crate::db::UserProfile;
use crate::error::AppError;
use crate::AppState;

pub const SESSION_COOKIE_NAME: &str = "session";
pub const SESSION_LIFETIME_DAYS: i64 = 7;

const SECRET_LEN: usize = 64;

/// What a session remembers about its user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionData {
    pub user_id: i64,
    pub username: String,
}

impl From<&UserProfile> for SessionData {
    fn from(user: &UserProfile) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    user_id: i64,
    username: String,
    iat: i64,
    exp: i64,
}

/// Issues and reads session cookies.
///
/// The cookie value is an HS256 token signed with a key that only this
/// process knows, so sessions end when the process restarts.
pub struct SessionStore {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl SessionStore {
    pub fn new() -> Self {
        let mut secret = [0u8; SECRET_LEN];
        rand::thread_rng().fill_bytes(&mut secret);
        Self::with_secret(&secret)
    }

    pub fn with_secret(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            lifetime: Duration::days(SESSION_LIFETIME_DAYS),
        }
    }

    /// Builds a fresh session cookie. Every issuance restarts the lifetime.
    pub fn issue(&self, data: &SessionData) -> crate::Result<Cookie<'static>> {
        let now = Utc::now();
        let claims = SessionClaims {
            user_id: data.user_id,
            username: data.username.clone(),
            iat: now.timestamp(),
            exp: (now + self.lifetime).timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        let lifetime = CookieDuration::seconds(self.lifetime.num_seconds());

        Ok(Self::cookie(token)
            .max_age(lifetime)
            .expires(OffsetDateTime::now_utc() + lifetime)
            .finish())
    }

    /// Returns the session carried by `token`, or `None` if it is forged,
    /// malformed or expired.
    pub fn decode(&self, token: &str) -> Option<SessionData> {
        match decode::<SessionClaims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Some(SessionData {
                user_id: data.claims.user_id,
                username: data.claims.username,
            }),
            Err(e) => {
                debug!("Ignoring session cookie: {}", e);
                None
            }
        }
    }

    pub fn read(&self, req: &HttpRequest) -> Option<SessionData> {
        req.cookie(SESSION_COOKIE_NAME)
            .and_then(|cookie| self.decode(cookie.value()))
    }

    /// A cookie that makes the client discard its session.
    pub fn clear(&self) -> Cookie<'static> {
        let mut cookie = Self::cookie(String::new()).finish();
        cookie.make_removal();
        cookie
    }

    fn cookie(value: String) -> CookieBuilder<'static> {
        Cookie::build(SESSION_COOKIE_NAME, value)
            .path("/")
            .http_only(true)
            .secure(true)
            .same_site(SameSite::None)
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// The decoded session of the current request, if it has a valid one.
#[derive(Debug, Clone)]
pub struct Session(pub Option<SessionData>);

impl FromRequest for Session {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = match req.app_data::<web::Data<AppState>>() {
            Some(state) => Ok(Session(state.sessions.read(req))),
            None => Err(AppError::InternalError("application state not configured".into()).into()),
        };
        ready(result)
    }
}
