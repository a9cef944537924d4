//! Account removal and the ownership cascade.
//!
//! Deleting a user is two explicit steps: remove everything the user owns,
//! then remove the user record. If the first step fails the user is left in
//! place, so the whole workflow can simply be run again.

use uuid::Uuid;

use crate::error::AppError;
use crate::models::User;
use crate::store::{Store, TaskStore};

/// Deletes every task owned by `owner`. Running it again deletes nothing.
pub async fn remove_owned_tasks<S: TaskStore + ?Sized>(
    store: &S,
    owner: Uuid,
) -> Result<u64, AppError> {
    let removed = store.delete_tasks_by_owner(owner).await?;
    log::debug!("removed {} task(s) owned by {}", removed, owner);
    Ok(removed)
}

/// Cascades over the user's tasks, then removes the user.
///
/// Sessions go with the user record, so every token the user held stops
/// validating as soon as this returns. Returns the number of tasks removed.
pub async fn delete_account<S: Store + ?Sized>(store: &S, user: &User) -> Result<u64, AppError> {
    let removed = remove_owned_tasks(store, user.id).await?;
    if !store.delete_user(user.id).await? {
        log::warn!("user {} was already deleted", user.id);
    }
    log::info!("deleted user {} and {} owned task(s)", user.id, removed);
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Task, TaskFilter, TaskInput, UserInput};
    use crate::store::{MemoryStore, UserStore};

    async fn seed_user(store: &MemoryStore, email: &str, tasks: usize) -> User {
        let user = User::new(
            UserInput {
                name: "Owner".into(),
                email: email.into(),
                password: "longenough1".into(),
                age: None,
            },
            "$2b$04$notarealhash".into(),
        );
        store.insert_user(&user).await.unwrap();
        store.push_token(user.id, "session").await.unwrap();
        for n in 0..tasks {
            let task = Task::new(
                TaskInput {
                    description: format!("task {}", n),
                    completed: false,
                },
                user.id,
            );
            store.insert_task(&task).await.unwrap();
        }
        user
    }

    #[actix_rt::test]
    async fn test_delete_account_removes_only_owned_tasks() {
        let store = MemoryStore::new();
        let a = seed_user(&store, "a@x.com", 3).await;
        let b = seed_user(&store, "b@x.com", 2).await;

        assert_eq!(delete_account(&store, &a).await.unwrap(), 3);

        assert!(store.find_user(a.id).await.unwrap().is_none());
        assert!(store.find_user_by_token(a.id, "session").await.unwrap().is_none());
        assert!(store
            .list_tasks(a.id, &TaskFilter::default())
            .await
            .unwrap()
            .is_empty());
        assert_eq!(
            store
                .list_tasks(b.id, &TaskFilter::default())
                .await
                .unwrap()
                .len(),
            2
        );
    }

    #[actix_rt::test]
    async fn test_delete_account_without_tasks() {
        let store = MemoryStore::new();
        let a = seed_user(&store, "a@x.com", 0).await;
        assert_eq!(delete_account(&store, &a).await.unwrap(), 0);
        assert!(store.find_user(a.id).await.unwrap().is_none());
    }

    #[actix_rt::test]
    async fn test_cascade_is_idempotent() {
        let store = MemoryStore::new();
        let a = seed_user(&store, "a@x.com", 2).await;

        assert_eq!(remove_owned_tasks(&store, a.id).await.unwrap(), 2);
        assert_eq!(remove_owned_tasks(&store, a.id).await.unwrap(), 0);

        delete_account(&store, &a).await.unwrap();
        assert_eq!(delete_account(&store, &a).await.unwrap(), 0);
    }
}
