use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::cmp::Ordering;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;

lazy_static! {
    // `<field>:<direction>`, e.g. `createdAt:desc`
    static ref SORT_BY_REGEX: Regex = Regex::new(r"^([A-Za-z]+):(asc|desc)$").unwrap();
}

/// A unit of work owned by exactly one user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    pub description: String,
    pub completed: bool,
    /// The owning user. Set from the authenticated requester and never changed.
    pub owner: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input structure for creating a task.
///
/// There is deliberately no `owner` field: ownership always comes from the
/// authenticated request, and any `owner` in the body is ignored.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
}

/// Partial update of a task. Only `description` and `completed` are accepted.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct TaskUpdate {
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: Option<String>,
    pub completed: Option<bool>,
}

/// Query parameters accepted when listing tasks.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TaskQuery {
    pub completed: Option<bool>,
    /// Maximum number of tasks to return; `0` means no limit.
    pub limit: Option<u32>,
    pub skip: Option<u32>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    Description,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSort {
    pub field: SortField,
    pub direction: SortDirection,
}

/// A parsed and checked `TaskQuery`, ready for the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskFilter {
    pub completed: Option<bool>,
    pub limit: Option<usize>,
    pub skip: usize,
    pub sort: Option<TaskSort>,
}

impl SortField {
    pub fn column(self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
            SortField::Description => "description",
            SortField::Completed => "completed",
        }
    }

    fn compare(self, a: &Task, b: &Task) -> Ordering {
        match self {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            SortField::Description => a.description.cmp(&b.description),
            SortField::Completed => a.completed.cmp(&b.completed),
        }
    }
}

impl SortDirection {
    pub fn keyword(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl TaskSort {
    /// Parses `createdAt:desc` style values.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let invalid = || AppError::BadRequest(format!("Invalid sortBy value: {}", raw));
        let captures = SORT_BY_REGEX.captures(raw.trim()).ok_or_else(invalid)?;

        let field = match &captures[1] {
            "createdAt" => SortField::CreatedAt,
            "updatedAt" => SortField::UpdatedAt,
            "description" => SortField::Description,
            "completed" => SortField::Completed,
            _ => return Err(invalid()),
        };
        let direction = match &captures[2] {
            "desc" => SortDirection::Desc,
            _ => SortDirection::Asc,
        };
        Ok(Self { field, direction })
    }

    pub fn compare(&self, a: &Task, b: &Task) -> Ordering {
        let ordering = self.field.compare(a, b);
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl TaskQuery {
    pub fn into_filter(self) -> Result<TaskFilter, AppError> {
        let sort = self.sort_by.as_deref().map(TaskSort::parse).transpose()?;
        Ok(TaskFilter {
            completed: self.completed,
            limit: self.limit.filter(|limit| *limit > 0).map(|limit| limit as usize),
            skip: self.skip.unwrap_or(0) as usize,
            sort,
        })
    }
}

impl TaskFilter {
    /// Applies the filter to an owner's tasks held in creation order.
    pub fn apply<'a>(&self, tasks: impl Iterator<Item = &'a Task>) -> Vec<Task> {
        let mut matched: Vec<Task> = tasks
            .filter(|task| self.completed.map_or(true, |c| task.completed == c))
            .cloned()
            .collect();
        if let Some(sort) = &self.sort {
            matched.sort_by(|a, b| sort.compare(a, b));
        }
        matched
            .into_iter()
            .skip(self.skip)
            .take(self.limit.unwrap_or(usize::MAX))
            .collect()
    }
}

impl TaskInput {
    pub fn normalized(self) -> Self {
        Self {
            description: self.description.trim().to_string(),
            completed: self.completed,
        }
    }
}

impl TaskUpdate {
    pub fn normalized(self) -> Self {
        Self {
            description: self.description.map(|d| d.trim().to_string()),
            completed: self.completed,
        }
    }
}

impl Task {
    /// Creates a new `Task` owned by `owner`.
    pub fn new(input: TaskInput, owner: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            description: input.description,
            completed: input.completed,
            owner,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply_update(&mut self, update: TaskUpdate) {
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(completed) = update.completed {
            self.completed = completed;
        }
        self.updated_at = Utc::now();
    }
}
