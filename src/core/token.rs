//! Bearer tokens: HS256 JWTs carrying the caller's id, name and role.
//!
//! Verification is stateless; every request decodes its own token and
//! gets an [`Actor`] back.

use crate::errors::{AppError, AppResult};
use crate::models::user::{Actor, User};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: i64,
    username: String,
    is_admin: bool,
    exp: i64,
}

#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_minutes: i64,
}

impl TokenKeys {
    pub fn new(secret: &str, ttl_minutes: i64) -> AppResult<Self> {
        if secret.is_empty() {
            return Err(AppError::Config("jwt_secret must not be empty".into()));
        }
        if ttl_minutes < 1 {
            return Err(AppError::Config(format!(
                "token_ttl_minutes must be positive, got {ttl_minutes}"
            )));
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_minutes,
        })
    }

    pub fn issue(&self, user: &User) -> AppResult<String> {
        let exp = chrono::Utc::now() + chrono::Duration::minutes(self.ttl_minutes);
        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            is_admin: user.is_admin,
            exp: exp.timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    pub fn verify(&self, token: &str) -> AppResult<Actor> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))?;
        Ok(Actor {
            user_id: data.claims.sub,
            username: data.claims.username,
            is_admin: data.claims.is_admin,
        })
    }
}
