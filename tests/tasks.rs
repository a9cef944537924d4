mod common;

use std::net::TcpListener;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{rt, test, web, App, HttpServer};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use uuid::Uuid;

use common::{bearer, init_app, register_user, test_context};
use taskkeeper::auth::TokenCodec;
use taskkeeper::emails::LogMailer;
use taskkeeper::models::Task;
use taskkeeper::routes;
use taskkeeper::store::MemoryStore;
use taskkeeper::AppState;

#[actix_rt::test]
async fn test_create_task_unauthorized() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let state = web::Data::new(AppState::new(
        Arc::new(MemoryStore::new()),
        TokenCodec::new("server-secret"),
        Arc::new(LogMailer::new("no-reply@taskkeeper.local")),
        4,
    ));
    let server_handle = rt::spawn(async move {
        HttpServer::new(move || {
            App::new()
                .app_data(state.clone())
                .wrap(Cors::permissive())
                .wrap(Logger::default())
                .configure(routes::config)
        })
        .bind(("127.0.0.1", port))
        .unwrap_or_else(|_| panic!("Failed to bind to port {}", port))
        .run()
        .await
    });

    tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;

    let client = reqwest::Client::new();
    let base = format!("http://127.0.0.1:{}", port);

    let resp = client
        .get(format!("{}/health", base))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    let resp = client
        .post(format!("{}/tasks", base))
        .json(&json!({ "description": "Unauthorized task" }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), reqwest::StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.expect("JSON error body");
    assert_eq!(body, json!({ "error": "Authorization token missing" }));

    server_handle.abort();
}

#[actix_rt::test]
async fn test_task_crud_flow() {
    let ctx = test_context();
    let app = init_app(ctx.state.clone()).await;
    let user = register_user(&app, "Ada", "a@x.com", "longenough1").await;

    let req = test::TestRequest::post()
        .uri("/tasks")
        .insert_header(bearer(&user.token))
        .set_json(&json!({ "description": "buy milk" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
    let created: Task = test::read_body_json(resp).await;
    assert_eq!(created.description, "buy milk");
    assert!(!created.completed);
    assert_eq!(created.owner, user.id);

    let uri = format!("/tasks/{}", created.id);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(bearer(&user.token))
        .to_request();
    let fetched: Task = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched, created);

    let req = test::TestRequest::patch()
        .uri(&uri)
        .insert_header(bearer(&user.token))
        .set_json(&json!({ "completed": true }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let updated: Task = test::read_body_json(resp).await;
    assert!(updated.completed);
    assert_eq!(updated.description, "buy milk");

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(bearer(&user.token))
        .to_request();
    let fetched: Task = test::call_and_read_body_json(&app, req).await;
    assert!(fetched.completed);

    let req = test::TestRequest::delete()
        .uri(&uri)
        .insert_header(bearer(&user.token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let deleted: Task = test::read_body_json(resp).await;
    assert_eq!(deleted.id, created.id);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(bearer(&user.token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Task not found" }));
}

#[actix_rt::test]
async fn test_tasks_of_other_users_are_not_found() {
    let ctx = test_context();
    let app = init_app(ctx.state.clone()).await;
    let owner = register_user(&app, "Ada", "a@x.com", "longenough1").await;
    let other = register_user(&app, "Bob", "b@x.com", "longenough1").await;

    let req = test::TestRequest::post()
        .uri("/tasks")
        .insert_header(bearer(&owner.token))
        .set_json(&json!({ "description": "private" }))
        .to_request();
    let task: Task = test::call_and_read_body_json(&app, req).await;
    let uri = format!("/tasks/{}", task.id);

    let requests = [
        test::TestRequest::get().uri(&uri),
        test::TestRequest::patch()
            .uri(&uri)
            .set_json(&json!({ "completed": true })),
        test::TestRequest::delete().uri(&uri),
    ];
    for req in requests {
        let resp = test::call_service(&app, req.insert_header(bearer(&other.token)).to_request()).await;
        assert_eq!(resp.status(), 404);
    }

    let req = test::TestRequest::get()
        .uri("/tasks")
        .insert_header(bearer(&other.token))
        .to_request();
    let listed: Vec<Task> = test::call_and_read_body_json(&app, req).await;
    assert!(listed.is_empty());

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header(bearer(&owner.token))
        .to_request();
    let fetched: Task = test::call_and_read_body_json(&app, req).await;
    assert_eq!(fetched, task);
}

#[actix_rt::test]
async fn test_client_supplied_owner_is_ignored() {
    let ctx = test_context();
    let app = init_app(ctx.state.clone()).await;
    let user = register_user(&app, "Ada", "a@x.com", "longenough1").await;
    let victim = register_user(&app, "Bob", "b@x.com", "longenough1").await;

    let req = test::TestRequest::post()
        .uri("/tasks")
        .insert_header(bearer(&user.token))
        .set_json(&json!({ "description": "sneaky", "owner": victim.id }))
        .to_request();
    let task: Task = test::call_and_read_body_json(&app, req).await;
    assert_eq!(task.owner, user.id);

    let req = test::TestRequest::patch()
        .uri(&format!("/tasks/{}", task.id))
        .insert_header(bearer(&user.token))
        .set_json(&json!({ "owner": victim.id }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);
}

#[actix_rt::test]
async fn test_task_validation() {
    let ctx = test_context();
    let app = init_app(ctx.state.clone()).await;
    let user = register_user(&app, "Ada", "a@x.com", "longenough1").await;

    let req = test::TestRequest::post()
        .uri("/tasks")
        .insert_header(bearer(&user.token))
        .set_json(&json!({ "description": "   " }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 422);

    let req = test::TestRequest::get()
        .uri("/tasks/not-a-uuid")
        .insert_header(bearer(&user.token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);

    let req = test::TestRequest::delete()
        .uri(&format!("/tasks/{}", Uuid::new_v4()))
        .insert_header(bearer(&user.token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);
}

#[actix_rt::test]
async fn test_list_tasks_filter_sort_and_paging() {
    let ctx = test_context();
    let app = init_app(ctx.state.clone()).await;
    let user = register_user(&app, "Ada", "a@x.com", "longenough1").await;

    for (description, completed) in [("bake bread", false), ("answer mail", false), ("call mom", true)] {
        let req = test::TestRequest::post()
            .uri("/tasks")
            .insert_header(bearer(&user.token))
            .set_json(&json!({ "description": description, "completed": completed }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), 201);
    }

    let list = |query: &str| {
        test::TestRequest::get()
            .uri(&format!("/tasks{}", query))
            .insert_header(bearer(&user.token))
            .to_request()
    };
    let descriptions = |tasks: Vec<Task>| -> Vec<String> {
        tasks.into_iter().map(|t| t.description).collect()
    };

    let all: Vec<Task> = test::call_and_read_body_json(&app, list("")).await;
    assert_eq!(
        descriptions(all),
        vec!["bake bread", "answer mail", "call mom"]
    );

    let open: Vec<Task> = test::call_and_read_body_json(&app, list("?completed=false")).await;
    assert_eq!(descriptions(open), vec!["bake bread", "answer mail"]);

    let done: Vec<Task> = test::call_and_read_body_json(&app, list("?completed=true")).await;
    assert_eq!(descriptions(done), vec!["call mom"]);

    let sorted: Vec<Task> =
        test::call_and_read_body_json(&app, list("?sortBy=description:asc")).await;
    assert_eq!(
        descriptions(sorted),
        vec!["answer mail", "bake bread", "call mom"]
    );

    let page: Vec<Task> = test::call_and_read_body_json(
        &app,
        list("?sortBy=description:desc&limit=1&skip=1"),
    )
    .await;
    assert_eq!(descriptions(page), vec!["bake bread"]);

    let unlimited: Vec<Task> = test::call_and_read_body_json(&app, list("?limit=0")).await;
    assert_eq!(unlimited.len(), 3);

    for bad in ["?sortBy=owner:asc", "?sortBy=description", "?completed=maybe"] {
        let resp = test::call_service(&app, list(bad)).await;
        assert_eq!(resp.status(), 400, "query {} was accepted", bad);
    }
}
