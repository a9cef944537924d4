use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{TaskStore, UserStore};
use crate::error::AppError;
use crate::models::{Task, TaskFilter, User};

/// In-memory store for tests and database-less runs.
///
/// Locks are always taken users-first, then tasks, and never held across an
/// await. Tasks are kept in insertion order so unsorted listings come back in
/// creation order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    tasks: RwLock<Vec<Task>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: PoisonError<T>) -> AppError {
    AppError::DatabaseError("memory store lock poisoned".into())
}

fn user_not_found() -> AppError {
    AppError::NotFound("User not found".into())
}

fn email_taken() -> AppError {
    AppError::BadRequest("Email already registered".into())
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        let mut users = self.users.write().map_err(poisoned)?;
        if users.values().any(|existing| existing.email == user.email) {
            return Err(email_taken());
        }
        if users.contains_key(&user.id) {
            return Err(AppError::DatabaseError(format!("duplicate user id {}", user.id)));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users.values().find(|user| user.email == email).cloned())
    }

    async fn find_user_by_token(&self, id: Uuid, token: &str) -> Result<Option<User>, AppError> {
        let users = self.users.read().map_err(poisoned)?;
        Ok(users
            .get(&id)
            .filter(|user| user.tokens.iter().any(|t| t == token))
            .cloned())
    }

    async fn update_user(&self, user: &User) -> Result<(), AppError> {
        let mut users = self.users.write().map_err(poisoned)?;
        if users
            .values()
            .any(|other| other.id != user.id && other.email == user.email)
        {
            return Err(email_taken());
        }
        let stored = users.get_mut(&user.id).ok_or_else(user_not_found)?;
        stored.name = user.name.clone();
        stored.email = user.email.clone();
        stored.password_hash = user.password_hash.clone();
        stored.age = user.age;
        stored.avatar = user.avatar.clone();
        stored.updated_at = Utc::now();
        Ok(())
    }

    async fn push_token(&self, id: Uuid, token: &str) -> Result<(), AppError> {
        let mut users = self.users.write().map_err(poisoned)?;
        let user = users.get_mut(&id).ok_or_else(user_not_found)?;
        user.tokens.push(token.to_string());
        Ok(())
    }

    async fn pull_token(&self, id: Uuid, token: &str) -> Result<(), AppError> {
        let mut users = self.users.write().map_err(poisoned)?;
        let user = users.get_mut(&id).ok_or_else(user_not_found)?;
        user.tokens.retain(|t| t != token);
        Ok(())
    }

    async fn clear_tokens(&self, id: Uuid) -> Result<(), AppError> {
        let mut users = self.users.write().map_err(poisoned)?;
        let user = users.get_mut(&id).ok_or_else(user_not_found)?;
        user.tokens.clear();
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, AppError> {
        let mut users = self.users.write().map_err(poisoned)?;
        let tasks = self.tasks.read().map_err(poisoned)?;
        if tasks.iter().any(|task| task.owner == id) {
            return Err(AppError::DatabaseError(format!(
                "user {} still owns tasks",
                id
            )));
        }
        Ok(users.remove(&id).is_some())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert_task(&self, task: &Task) -> Result<(), AppError> {
        let users = self.users.read().map_err(poisoned)?;
        if !users.contains_key(&task.owner) {
            return Err(AppError::DatabaseError(format!(
                "task owner {} does not exist",
                task.owner
            )));
        }
        let mut tasks = self.tasks.write().map_err(poisoned)?;
        tasks.push(task.clone());
        Ok(())
    }

    async fn find_task(&self, id: Uuid, owner: Uuid) -> Result<Option<Task>, AppError> {
        let tasks = self.tasks.read().map_err(poisoned)?;
        Ok(tasks
            .iter()
            .find(|task| task.id == id && task.owner == owner)
            .cloned())
    }

    async fn list_tasks(&self, owner: Uuid, filter: &TaskFilter) -> Result<Vec<Task>, AppError> {
        let tasks = self.tasks.read().map_err(poisoned)?;
        Ok(filter.apply(tasks.iter().filter(|task| task.owner == owner)))
    }

    async fn update_task(&self, task: &Task) -> Result<bool, AppError> {
        let mut tasks = self.tasks.write().map_err(poisoned)?;
        match tasks
            .iter_mut()
            .find(|stored| stored.id == task.id && stored.owner == task.owner)
        {
            Some(stored) => {
                stored.description = task.description.clone();
                stored.completed = task.completed;
                stored.updated_at = task.updated_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_task(&self, id: Uuid, owner: Uuid) -> Result<Option<Task>, AppError> {
        let mut tasks = self.tasks.write().map_err(poisoned)?;
        Ok(tasks
            .iter()
            .position(|task| task.id == id && task.owner == owner)
            .map(|index| tasks.remove(index)))
    }

    async fn delete_tasks_by_owner(&self, owner: Uuid) -> Result<u64, AppError> {
        let mut tasks = self.tasks.write().map_err(poisoned)?;
        let before = tasks.len();
        tasks.retain(|task| task.owner != owner);
        Ok((before - tasks.len()) as u64)
    }
}
