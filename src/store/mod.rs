//! Persistence seam.
//!
//! Handlers, the session functions and the account cascade only see these
//! traits. `PgStore` backs a real deployment; `MemoryStore` backs tests and
//! runs the server when no database is configured.
//!
//! Every method is a single read or a single write against one record (or one
//! owner's tasks), so no lock or transaction spans more than one call.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Task, TaskFilter, User};

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persists a new user. Fails with `BadRequest` if the email is taken.
    async fn insert_user(&self, user: &User) -> Result<(), AppError>;

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Looks up by an already-normalized email.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Returns the user only if `token` is currently in their token set.
    async fn find_user_by_token(&self, id: Uuid, token: &str) -> Result<Option<User>, AppError>;

    /// Writes profile fields, password hash and avatar. The token set is left alone.
    async fn update_user(&self, user: &User) -> Result<(), AppError>;

    /// Appends a token to the user's set in one atomic write.
    async fn push_token(&self, id: Uuid, token: &str) -> Result<(), AppError>;

    /// Removes every occurrence of `token`. Absent tokens are not an error.
    async fn pull_token(&self, id: Uuid, token: &str) -> Result<(), AppError>;

    async fn clear_tokens(&self, id: Uuid) -> Result<(), AppError>;

    /// Removes the user record. Returns `false` if it was already gone.
    ///
    /// Fails while tasks still reference the user; run the cascade first.
    async fn delete_user(&self, id: Uuid) -> Result<bool, AppError>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Persists a new task. The owner must exist.
    async fn insert_task(&self, task: &Task) -> Result<(), AppError>;

    /// Fetches a task only if it belongs to `owner`.
    async fn find_task(&self, id: Uuid, owner: Uuid) -> Result<Option<Task>, AppError>;

    async fn list_tasks(&self, owner: Uuid, filter: &TaskFilter) -> Result<Vec<Task>, AppError>;

    /// Writes `description`, `completed` and `updated_at`, scoped to the task's owner.
    /// Returns `false` if no such owned task exists.
    async fn update_task(&self, task: &Task) -> Result<bool, AppError>;

    /// Deletes a task only if it belongs to `owner`, returning it.
    async fn delete_task(&self, id: Uuid, owner: Uuid) -> Result<Option<Task>, AppError>;

    /// Deletes every task owned by `owner`, returning how many were removed.
    async fn delete_tasks_by_owner(&self, owner: Uuid) -> Result<u64, AppError>;
}

/// The full store the application runs against.
pub trait Store: UserStore + TaskStore {}

impl<T: UserStore + TaskStore> Store for T {}
