pub mod health;
pub mod tasks;
pub mod users;

use actix_web::{web, HttpRequest};

use crate::auth::AuthMiddleware;
use crate::error::AppError;
use crate::models::AVATAR_MAX_BYTES;

fn json_error(err: actix_web::error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(err.to_string()).into()
}

fn query_error(err: actix_web::error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(err.to_string()).into()
}

/// Registers every route. Public endpoints come first; everything else sits
/// behind `AuthMiddleware`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .app_data(web::PayloadConfig::new(AVATAR_MAX_BYTES))
        .service(health::health)
        .service(users::register)
        .service(users::login)
        .service(users::get_avatar)
        .service(
            web::scope("")
                .wrap(AuthMiddleware)
                .service(users::logout_current)
                .service(users::logout_everywhere)
                .service(users::get_profile)
                .service(users::update_profile)
                .service(users::delete_account)
                .service(users::upload_avatar)
                .service(users::delete_avatar)
                .service(tasks::get_tasks)
                .service(tasks::create_task)
                .service(tasks::get_task)
                .service(tasks::update_task)
                .service(tasks::delete_task),
        );
}
