#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use serde_json::json;
use uuid::Uuid;

use taskkeeper::auth::{AuthResponse, TokenCodec};
use taskkeeper::emails::{Email, Mailer};
use taskkeeper::routes;
use taskkeeper::store::MemoryStore;
use taskkeeper::AppState;

pub const TEST_SECRET: &str = "integration-test-secret";

/// Collects outgoing mail so tests can assert on it.
#[derive(Default)]
pub struct Outbox {
    sent: Mutex<Vec<Email>>,
}

impl Outbox {
    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().unwrap().clone()
    }
}

impl Mailer for Outbox {
    fn sender(&self) -> &str {
        "tests@taskkeeper.local"
    }

    fn deliver(&self, email: Email) {
        self.sent.lock().unwrap().push(email);
    }
}

pub struct TestContext {
    pub state: web::Data<AppState>,
    pub outbox: Arc<Outbox>,
}

/// Fresh in-memory state with a fixed secret and the cheapest bcrypt cost.
pub fn test_context() -> TestContext {
    let outbox = Arc::new(Outbox::default());
    let state = web::Data::new(AppState::new(
        Arc::new(MemoryStore::new()),
        TokenCodec::new(TEST_SECRET),
        outbox.clone(),
        4,
    ));
    TestContext { state, outbox }
}

pub async fn init_app(
    state: web::Data<AppState>,
) -> impl Service<
    actix_http::Request,
    Response = ServiceResponse<impl MessageBody>,
    Error = actix_web::Error,
> {
    test::init_service(
        App::new()
            .app_data(state)
            .wrap(Logger::default())
            .configure(routes::config),
    )
    .await
}

pub struct TestUser {
    pub id: Uuid,
    pub token: String,
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

pub async fn register_user(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    name: &str,
    email: &str,
    password: &str,
) -> TestUser {
    let req = test::TestRequest::post()
        .uri("/users")
        .set_json(&json!({
            "name": name,
            "email": email,
            "password": password
        }))
        .to_request();
    let resp = test::call_service(app, req).await;
    let status = resp.status();
    let body = test::read_body(resp).await;
    assert_eq!(
        status,
        201,
        "registration failed: {}",
        String::from_utf8_lossy(&body)
    );

    let auth: AuthResponse = serde_json::from_slice(&body).expect("registration body");
    TestUser {
        id: auth.user.id,
        token: auth.token,
    }
}

pub async fn login_user(
    app: &impl Service<
        actix_http::Request,
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
    >,
    email: &str,
    password: &str,
) -> String {
    let req = test::TestRequest::post()
        .uri("/users/login")
        .set_json(&json!({ "email": email, "password": password }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 200);
    let auth: AuthResponse = test::read_body_json(resp).await;
    auth.token
}
