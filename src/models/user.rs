use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::auth::password::{hash_password_async, verify_password_async};
use crate::error::AppError;

/// A registered account.
///
/// `password_hash`, `tokens` and `avatar` never leave the server: they are
/// skipped by serde, so every JSON rendering of a user is already redacted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    pub age: Option<i32>,
    /// Currently valid session tokens, oldest first.
    #[serde(skip)]
    pub tokens: Vec<String>,
    #[serde(skip)]
    pub avatar: Option<Vec<u8>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Registration payload.
#[derive(Debug, Deserialize, Validate)]
pub struct UserInput {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Email is invalid"))]
    pub email: String,
    #[validate(
        length(min = 7, message = "Password must be at least 7 characters long"),
        custom = "validate_password"
    )]
    pub password: String,
    #[validate(range(min = 0, message = "Age must be a positive number"))]
    pub age: Option<i32>,
}

/// Profile update payload. Only these three fields may be changed; anything
/// else in the body is rejected during deserialization.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UserUpdate {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: Option<String>,
    #[validate(email(message = "Email is invalid"))]
    pub email: Option<String>,
    #[validate(
        length(min = 7, message = "Password must be at least 7 characters long"),
        custom = "validate_password"
    )]
    pub password: Option<String>,
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.to_lowercase().contains("password") {
        let mut err = ValidationError::new("password_contains_password");
        err.message = Some("Password cannot contain the word 'password'".into());
        return Err(err);
    }
    Ok(())
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl UserInput {
    /// Trims every text field and lowercases the email.
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: normalize_email(&self.email),
            password: self.password.trim().to_string(),
            age: self.age,
        }
    }
}

impl UserUpdate {
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.map(|name| name.trim().to_string()),
            email: self.email.as_deref().map(normalize_email),
            password: self.password.map(|password| password.trim().to_string()),
        }
    }
}

impl User {
    /// Builds a fresh account from validated input. The caller hashes the password.
    pub fn new(input: UserInput, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            email: input.email,
            password_hash,
            age: input.age,
            tokens: Vec::new(),
            avatar: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a validated profile update.
    ///
    /// The password is re-hashed only when it differs from the current one.
    /// Both bcrypt steps run on the blocking pool.
    pub async fn apply_update(
        &mut self,
        update: UserUpdate,
        bcrypt_cost: u32,
    ) -> Result<(), AppError> {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(password) = update.password {
            if !verify_password_async(password.clone(), self.password_hash.clone()).await? {
                self.password_hash = hash_password_async(password, bcrypt_cost).await?;
            }
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}
