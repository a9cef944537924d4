use crate::{
    auth::AuthSession,
    error::AppError,
    models::{Task, TaskInput, TaskQuery, TaskUpdate},
    state::AppState,
    store::TaskStore,
};
use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

fn task_not_found() -> AppError {
    AppError::NotFound("Task not found".into())
}

/// A malformed id can never name one of the requester's tasks.
fn parse_task_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| task_not_found())
}

/// Retrieves the authenticated user's tasks.
///
/// ## Query Parameters:
/// - `completed` (optional): `true` or `false`.
/// - `limit` (optional): page size; `0` means no limit.
/// - `skip` (optional): number of tasks to skip.
/// - `sortBy` (optional): `<field>:<asc|desc>` where field is one of
///   `createdAt`, `updatedAt`, `description`, `completed`.
///
/// Without `sortBy` tasks come back in creation order.
///
/// ## Responses:
/// - `200 OK`: JSON array of `Task` objects.
/// - `400 Bad Request`: malformed query or unsupported `sortBy`.
/// - `401 Unauthorized`: missing or rejected token.
#[get("/tasks")]
pub async fn get_tasks(
    state: web::Data<AppState>,
    session: AuthSession,
    query: web::Query<TaskQuery>,
) -> Result<impl Responder, AppError> {
    let filter = query.into_inner().into_filter()?;
    let tasks = state.store.list_tasks(session.user.id, &filter).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a task owned by the authenticated user.
///
/// Any `owner` in the body is ignored.
///
/// ## Responses:
/// - `201 Created`: the new `Task`.
/// - `422 Unprocessable Entity`: empty description.
#[post("/tasks")]
pub async fn create_task(
    state: web::Data<AppState>,
    session: AuthSession,
    payload: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    let input = payload.into_inner().normalized();
    input.validate()?;

    let task = Task::new(input, session.user.id);
    state.store.insert_task(&task).await?;
    log::debug!("user {} created task {}", task.owner, task.id);
    Ok(HttpResponse::Created().json(task))
}

#[get("/tasks/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let id = parse_task_id(&path)?;
    let task = state
        .store
        .find_task(id, session.user.id)
        .await?
        .ok_or_else(task_not_found)?;
    Ok(HttpResponse::Ok().json(task))
}

/// Updates `description` and/or `completed`. Any other field is a 400.
#[patch("/tasks/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<String>,
    payload: web::Json<TaskUpdate>,
) -> Result<impl Responder, AppError> {
    let id = parse_task_id(&path)?;
    let update = payload.into_inner().normalized();
    update.validate()?;

    let mut task = state
        .store
        .find_task(id, session.user.id)
        .await?
        .ok_or_else(task_not_found)?;
    task.apply_update(update);

    if !state.store.update_task(&task).await? {
        return Err(task_not_found());
    }
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task and returns it.
#[delete("/tasks/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    session: AuthSession,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let id = parse_task_id(&path)?;
    let task = state
        .store
        .delete_task(id, session.user.id)
        .await?
        .ok_or_else(task_not_found)?;
    Ok(HttpResponse::Ok().json(task))
}
