use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::model::User;

const TOKEN_TTL_SECS: i64 = 3600;

/// Claims carried by a bearer token. Tokens are stateless: nothing is
/// persisted and verification is signature + expiry only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: String,
    pub username: String,
    pub iat: usize,
    pub exp: usize,
}

/// HS256 signing/verification keys derived from the shared secret.
#[derive(Clone)]
pub struct TokenKeys {
    secret: String,
}

impl TokenKeys {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Issue a token for `user`, valid for one hour.
    pub fn issue(&self, user: &User) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            id: user.id.clone(),
            username: user.username.clone(),
            iat: now as usize,
            exp: (now + TOKEN_TTL_SECS) as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }

    /// Verify a token and return its claims. Fails on bad signature,
    /// malformed input, or an `exp` in the past.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(decoded.claims)
    }
}
