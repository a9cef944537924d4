use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use uuid::Uuid;

use super::{TaskStore, UserStore};
use crate::error::AppError;
use crate::models::{Task, TaskFilter, User};

const USER_COLUMNS: &str =
    "id, name, email, password_hash, age, tokens, avatar, created_at, updated_at";
const TASK_COLUMNS: &str = "id, description, completed, owner, created_at, updated_at";

const UNIQUE_VIOLATION: &str = "23505";

/// Postgres-backed store. The token set is a `TEXT[]` column mutated in place,
/// so each login or logout is one atomic row update.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Applies the embedded migrations in `migrations/`.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Migration failed: {}", e)))
    }
}

/// Maps a unique-email violation to the same error the handlers raise.
fn map_write_error(error: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_error) = &error {
        if db_error.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return AppError::BadRequest("Email already registered".into());
        }
    }
    error.into()
}

fn require_row(rows_affected: u64) -> Result<(), AppError> {
    if rows_affected == 0 {
        return Err(AppError::NotFound("User not found".into()));
    }
    Ok(())
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, age, tokens, avatar, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.age)
        .bind(&user.tokens)
        .bind(&user.avatar)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_user_by_token(&self, id: Uuid, token: &str) -> Result<Option<User>, AppError> {
        let sql = format!(
            "SELECT {} FROM users WHERE id = $1 AND $2 = ANY(tokens)",
            USER_COLUMNS
        );
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(token)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_user(&self, user: &User) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE users
             SET name = $2, email = $3, password_hash = $4, age = $5, avatar = $6, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.age)
        .bind(&user.avatar)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;
        require_row(result.rows_affected())
    }

    async fn push_token(&self, id: Uuid, token: &str) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE users SET tokens = array_append(tokens, $2), updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(token)
        .execute(&self.pool)
        .await?;
        require_row(result.rows_affected())
    }

    async fn pull_token(&self, id: Uuid, token: &str) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE users SET tokens = array_remove(tokens, $2), updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(token)
        .execute(&self.pool)
        .await?;
        require_row(result.rows_affected())
    }

    async fn clear_tokens(&self, id: Uuid) -> Result<(), AppError> {
        let result =
            sqlx::query("UPDATE users SET tokens = '{}', updated_at = NOW() WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;
        require_row(result.rows_affected())
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn insert_task(&self, task: &Task) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO tasks (id, description, completed, owner, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(task.id)
        .bind(&task.description)
        .bind(task.completed)
        .bind(task.owner)
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_task(&self, id: Uuid, owner: Uuid) -> Result<Option<Task>, AppError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE id = $1 AND owner = $2",
            TASK_COLUMNS
        );
        Ok(sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_tasks(&self, owner: Uuid, filter: &TaskFilter) -> Result<Vec<Task>, AppError> {
        // Sort columns come from a closed enum and limits are integers, so only
        // the owner and the completed flag need binding.
        let mut sql = format!("SELECT {} FROM tasks WHERE owner = $1", TASK_COLUMNS);
        if filter.completed.is_some() {
            sql.push_str(" AND completed = $2");
        }
        match &filter.sort {
            Some(sort) => sql.push_str(&format!(
                " ORDER BY {} {}, created_at, id",
                sort.field.column(),
                sort.direction.keyword()
            )),
            None => sql.push_str(" ORDER BY created_at, id"),
        }
        if let Some(limit) = filter.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        if filter.skip > 0 {
            sql.push_str(&format!(" OFFSET {}", filter.skip));
        }

        let mut query = sqlx::query_as::<_, Task>(&sql).bind(owner);
        if let Some(completed) = filter.completed {
            query = query.bind(completed);
        }
        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn update_task(&self, task: &Task) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE tasks SET description = $3, completed = $4, updated_at = $5
             WHERE id = $1 AND owner = $2",
        )
        .bind(task.id)
        .bind(task.owner)
        .bind(&task.description)
        .bind(task.completed)
        .bind(task.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_task(&self, id: Uuid, owner: Uuid) -> Result<Option<Task>, AppError> {
        let sql = format!(
            "DELETE FROM tasks WHERE id = $1 AND owner = $2 RETURNING {}",
            TASK_COLUMNS
        );
        Ok(sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_tasks_by_owner(&self, owner: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE owner = $1")
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
