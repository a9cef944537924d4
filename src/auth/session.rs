//! Session lifecycle on top of the user store.
//!
//! A token is live only while it sits in its owner's token set, so issuing,
//! revoking and checking a session are all token-set operations. Each one is a
//! single store call, which keeps concurrent logins from losing each other's
//! tokens.

use actix_web::web;
use uuid::Uuid;

use super::password::{decoy_hash, verify_password, verify_password_async};
use super::token::TokenCodec;
use crate::error::AppError;
use crate::models::{normalize_email, User};
use crate::store::UserStore;

/// Signs a new token for `user` and records it in the user's token set.
pub async fn issue_token<S: UserStore + ?Sized>(
    store: &S,
    codec: &TokenCodec,
    user: &mut User,
) -> Result<String, AppError> {
    let token = codec.sign(user.id)?;
    store.push_token(user.id, &token).await?;
    user.tokens.push(token.clone());
    log::debug!("issued session token for user {}", user.id);
    Ok(token)
}

/// Resolves a user from login credentials.
///
/// An unknown email and a wrong password both yield `InvalidCredentials`, and
/// both pay for one bcrypt check at `bcrypt_cost`: an unknown email is checked
/// against a decoy hash so the two cases take the same time.
pub async fn find_by_credentials<S: UserStore + ?Sized>(
    store: &S,
    email: &str,
    password: &str,
    bcrypt_cost: u32,
) -> Result<User, AppError> {
    let found = store.find_user_by_email(&normalize_email(email)).await?;
    let password = password.to_string();

    let user = match found {
        Some(user) => user,
        None => {
            web::block(move || {
                let decoy = decoy_hash(bcrypt_cost)?;
                verify_password(&password, &decoy)
            })
            .await??;
            log::debug!("login rejected: unknown email");
            return Err(AppError::InvalidCredentials);
        }
    };
    if !verify_password_async(password, user.password_hash.clone()).await? {
        log::debug!("login rejected: wrong password for user {}", user.id);
        return Err(AppError::InvalidCredentials);
    }
    Ok(user)
}

/// Revokes one token. Revoking a token that is not in the set does nothing.
pub async fn logout<S: UserStore + ?Sized>(
    store: &S,
    user: &mut User,
    token: &str,
) -> Result<(), AppError> {
    store.pull_token(user.id, token).await?;
    user.tokens.retain(|t| t != token);
    Ok(())
}

/// Revokes every token the user holds.
pub async fn logout_all<S: UserStore + ?Sized>(store: &S, user: &mut User) -> Result<(), AppError> {
    store.clear_tokens(user.id).await?;
    user.tokens.clear();
    Ok(())
}

/// Resolves the user behind a bearer token.
///
/// A bad signature, an unknown user and a revoked token all come back as the
/// same `InvalidToken`.
pub async fn authenticate<S: UserStore + ?Sized>(
    store: &S,
    codec: &TokenCodec,
    token: &str,
) -> Result<User, AppError> {
    let user_id: Uuid = codec.verify(token)?;
    match store.find_user_by_token(user_id, token).await? {
        Some(user) => Ok(user),
        None => {
            log::debug!("token rejected: not in token set of user {}", user_id);
            Err(AppError::InvalidToken)
        }
    }
}
