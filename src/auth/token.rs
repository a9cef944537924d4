use crate::error::AppError;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Represents the claims encoded within a session token.
///
/// There is no `exp` claim: a token stays valid until it is removed from the
/// owner's token set.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token, the user's unique identifier.
    pub sub: Uuid,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Per-issuance nonce; two logins in the same second still get distinct tokens.
    pub jti: Uuid,
}

/// Signs and verifies session tokens with a single HMAC secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims = HashSet::new();

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Produces a signed, URL-safe token whose subject is `user_id`.
    ///
    /// # Returns
    /// Returns `AppError::InternalServerError` if encoding fails.
    pub fn sign(&self, user_id: Uuid) -> Result<String, AppError> {
        let claims = Claims {
            sub: user_id,
            iat: chrono::Utc::now().timestamp(),
            jti: Uuid::new_v4(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
    }

    /// Decodes the full claim set after checking the signature.
    pub fn decode(&self, token: &str) -> Result<Claims, AppError> {
        Ok(decode::<Claims>(token, &self.decoding, &self.validation)?.claims)
    }

    /// Verifies `token` and returns the user id it was issued for.
    ///
    /// Any failure (bad signature, malformed token, undecodable subject) is
    /// reported as `AppError::InvalidToken`. The live token set is not consulted.
    pub fn verify(&self, token: &str) -> Result<Uuid, AppError> {
        self.decode(token).map(|claims| claims.sub)
    }
}
