pub mod extractors;
pub mod middleware;
pub mod password;
pub mod session;
pub mod token;

use serde::{Deserialize, Serialize};

use crate::models::User;

pub use extractors::AuthSession;
pub use middleware::AuthMiddleware;
pub use password::{hash_password, hash_password_async, verify_password, verify_password_async};
pub use session::{authenticate, find_by_credentials, issue_token, logout, logout_all};
pub use token::{Claims, TokenCodec};

/// Represents the payload for a user login request.
///
/// Not validated beyond deserialization: a malformed email simply fails to
/// match any account and is reported like any other bad login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response body after registration or login: the redacted user and a freshly
/// issued session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}
