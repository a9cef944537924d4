use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;
use crate::models::User;

/// The identity attached to a request by `AuthMiddleware`.
///
/// Holds the resolved user and the exact token string the request was
/// authenticated with, so logout can revoke precisely that token. Handlers on
/// a scope without the middleware get `MissingToken`.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
}

impl FromRequest for AuthSession {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthSession>().cloned() {
            Some(session) => ready(Ok(session)),
            None => ready(Err(AppError::MissingToken.into())),
        }
    }
}
