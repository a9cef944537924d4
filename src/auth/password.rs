use std::collections::HashMap;
use std::sync::Mutex;

use actix_web::web;
use bcrypt::{hash, verify};
use lazy_static::lazy_static;

use crate::error::AppError;

lazy_static! {
    // One decoy hash per bcrypt cost, built on first use.
    static ref DECOY_HASHES: Mutex<HashMap<u32, String>> = Mutex::new(HashMap::new());
}

const DECOY_SECRET: &str = "decoy-secret-never-issued";

pub fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    hash(password, cost)
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    verify(password, hashed_password)
        .map_err(|e| AppError::InternalServerError(format!("Failed to verify password: {}", e)))
}

/// [`hash_password`] on the blocking thread pool, so the worker keeps serving
/// other requests while bcrypt runs.
pub async fn hash_password_async(password: String, cost: u32) -> Result<String, AppError> {
    web::block(move || hash_password(&password, cost)).await?
}

/// [`verify_password`] on the blocking thread pool.
pub async fn verify_password_async(password: String, hashed_password: String) -> Result<bool, AppError> {
    web::block(move || verify_password(&password, &hashed_password)).await?
}

/// A valid bcrypt hash at `cost` that no real password maps to.
///
/// Checking a password against it costs the same as checking a real account,
/// so a login for an unknown email takes as long as a wrong password.
pub fn decoy_hash(cost: u32) -> Result<String, AppError> {
    let mut cache = DECOY_HASHES
        .lock()
        .map_err(|_| AppError::InternalServerError("decoy hash cache poisoned".into()))?;
    if let Some(existing) = cache.get(&cost) {
        return Ok(existing.clone());
    }
    let created = hash_password(DECOY_SECRET, cost)?;
    cache.insert(cost, created.clone());
    Ok(created)
}
