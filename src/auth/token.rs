//! Bearer token issuance and verification.

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use once_cell::sync::Lazy;
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};

/// Token lifetime in seconds.
const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

static SECRET: Lazy<Vec<u8>> = Lazy::new(|| match std::env::var("SECRET_KEY") {
    Ok(key) if key.len() >= 64 => key.into_bytes(),
    Ok(_) | Err(_) => {
        let random_string: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(128)
            .map(char::from)
            .collect();
        log::warn!("SECRET_KEY was missing or shorter than 64 bytes. Tokens will be signed with a process-local random key and invalidate every time the application is restarted.\r\nNeed a key? How about:\r\n{}", random_string);
        random_string.into_bytes()
    }
});

/// Claims carried by every issued bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id the token is bound to.
    pub sub: i32,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

/// Token errors
#[derive(Debug)]
pub enum TokenError {
    /// Signing failed.
    Encode(jsonwebtoken::errors::Error),
    /// Malformed, tampered with, or expired.
    Invalid,
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::Encode(e) => write!(f, "Token signing error: {}", e),
            TokenError::Invalid => write!(f, "Invalid token"),
        }
    }
}

impl std::error::Error for TokenError {}

/// Issue a signed bearer token bound to a user identity.
pub fn issue(user_id: i32, username: &str) -> Result<String, TokenError> {
    let now = Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        username: username.to_owned(),
        iat: now,
        exp: now + TOKEN_TTL_SECS,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(&SECRET))
        .map_err(TokenError::Encode)
}

/// Verify a bearer token and return its claims.
pub fn verify(token: &str) -> Result<Claims, TokenError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(&SECRET),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| TokenError::Invalid)
}
