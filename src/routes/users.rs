use crate::{
    accounts,
    auth::{find_by_credentials, hash_password_async, issue_token, logout, logout_all},
    auth::{AuthResponse, AuthSession, LoginRequest},
    error::AppError,
    models::{AvatarFormat, User, UserInput, UserUpdate},
    state::AppState,
    store::UserStore,
};
use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

/// Register a new user
///
/// Creates the account, sends a welcome email and returns the user together
/// with a first session token.
#[post("/users")]
pub async fn register(
    state: web::Data<AppState>,
    payload: web::Json<UserInput>,
) -> Result<impl Responder, AppError> {
    let input = payload.into_inner().normalized();
    input.validate()?;

    if state.store.find_user_by_email(&input.email).await?.is_some() {
        return Err(AppError::BadRequest("Email already registered".into()));
    }

    let password_hash = hash_password_async(input.password.clone(), state.bcrypt_cost).await?;
    let mut user = User::new(input, password_hash);
    state.store.insert_user(&user).await?;
    state.mailer.send_welcome(&user.email, &user.name);

    let token = issue_token(state.store.as_ref(), &state.tokens, &mut user).await?;
    log::info!("registered user {}", user.id);

    Ok(HttpResponse::Created().json(AuthResponse { user, token }))
}

/// Login user
///
/// Authenticates by email and password and issues a new session token.
#[post("/users/login")]
pub async fn login(
    state: web::Data<AppState>,
    payload: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let mut user = find_by_credentials(
        state.store.as_ref(),
        &payload.email,
        &payload.password,
        state.bcrypt_cost,
    )
    .await?;
    let token = issue_token(state.store.as_ref(), &state.tokens, &mut user).await?;
    Ok(HttpResponse::Ok().json(AuthResponse { user, token }))
}

/// Revokes the token this request was authenticated with.
#[post("/users/logout")]
pub async fn logout_current(
    state: web::Data<AppState>,
    session: AuthSession,
) -> Result<impl Responder, AppError> {
    let AuthSession { mut user, token } = session;
    logout(state.store.as_ref(), &mut user, &token).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Logged out" })))
}

/// Revokes every session of the current user.
#[post("/users/logoutAll")]
pub async fn logout_everywhere(
    state: web::Data<AppState>,
    session: AuthSession,
) -> Result<impl Responder, AppError> {
    let mut user = session.user;
    logout_all(state.store.as_ref(), &mut user).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Logged out of all sessions" })))
}

#[get("/users/me")]
pub async fn get_profile(session: AuthSession) -> impl Responder {
    HttpResponse::Ok().json(session.user)
}

/// Update the current user's profile
///
/// Only `name`, `email` and `password` are accepted; an unknown field fails
/// deserialization with 400. The password is re-hashed only when it changes.
#[patch("/users/me")]
pub async fn update_profile(
    state: web::Data<AppState>,
    session: AuthSession,
    payload: web::Json<UserUpdate>,
) -> Result<impl Responder, AppError> {
    let update = payload.into_inner().normalized();
    update.validate()?;

    let mut user = session.user;
    if let Some(email) = &update.email {
        if let Some(existing) = state.store.find_user_by_email(email).await? {
            if existing.id != user.id {
                return Err(AppError::BadRequest("Email already registered".into()));
            }
        }
    }

    user.apply_update(update, state.bcrypt_cost).await?;
    state.store.update_user(&user).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// Delete the current account
///
/// Removes every task the user owns, then the user, then says goodbye.
#[delete("/users/me")]
pub async fn delete_account(
    state: web::Data<AppState>,
    session: AuthSession,
) -> Result<impl Responder, AppError> {
    let user = session.user;
    accounts::delete_account(state.store.as_ref(), &user).await?;
    state.mailer.send_cancellation(&user.email, &user.name);
    Ok(HttpResponse::Ok().json(json!({ "message": "Account deleted" })))
}

/// Upload an avatar
///
/// The request body is the raw image. PNG and JPEG are accepted, recognised by
/// their leading bytes rather than any header or file name.
#[post("/users/me/avatar")]
pub async fn upload_avatar(
    state: web::Data<AppState>,
    session: AuthSession,
    body: web::Bytes,
) -> Result<impl Responder, AppError> {
    if AvatarFormat::detect(&body).is_none() {
        return Err(AppError::BadRequest("Please upload an image".into()));
    }

    let mut user = session.user;
    user.avatar = Some(body.to_vec());
    state.store.update_user(&user).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Avatar uploaded" })))
}

#[delete("/users/me/avatar")]
pub async fn delete_avatar(
    state: web::Data<AppState>,
    session: AuthSession,
) -> Result<impl Responder, AppError> {
    let mut user = session.user;
    user.avatar = None;
    state.store.update_user(&user).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Avatar removed" })))
}

/// Serve a user's avatar. Public.
#[get("/users/{id}/avatar")]
pub async fn get_avatar(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let not_found = || AppError::NotFound("User or avatar not found".into());

    let id = Uuid::parse_str(&path).map_err(|_| not_found())?;
    let avatar = state
        .store
        .find_user(id)
        .await?
        .and_then(|user| user.avatar)
        .ok_or_else(not_found)?;
    let format = AvatarFormat::detect(&avatar).ok_or_else(not_found)?;

    Ok(HttpResponse::Ok()
        .content_type(format.content_type())
        .body(avatar))
}
