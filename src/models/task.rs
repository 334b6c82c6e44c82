use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::FieldError;

const TITLE_MIN: usize = 3;
const TITLE_MAX: usize = 100;
const DESCRIPTION_MAX: usize = 500;
const LIMIT_MAX: u32 = 100;
const DEFAULT_LIMIT: u32 = 10;

/// Represents the lifecycle status of a task.
/// Corresponds to the `task_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Task is yet to be started.
    Todo,
    /// Task is currently being worked on.
    InProgress,
    /// Task is completed.
    Done,
}

impl TaskStatus {
    pub fn parse(value: &str) -> Option<TaskStatus> {
        match value {
            "TODO" => Some(TaskStatus::Todo),
            "IN_PROGRESS" => Some(TaskStatus::InProgress),
            "DONE" => Some(TaskStatus::Done),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Done => "DONE",
        }
    }
}

/// Represents a task as stored and as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    /// The title of the task, trimmed, 3-100 characters.
    pub title: String,
    /// Free-form description, trimmed, at most 500 characters. Empty when
    /// none was supplied.
    pub description: String,
    /// The current lifecycle status.
    pub status: TaskStatus,
    /// Identity that owns the task. Set once at creation; no update path
    /// touches it.
    pub owner_id: Uuid,
    /// Timestamp of when the task was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last successful mutation. Equal to `created_at`
    /// until the first update.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new `Task` from validated input and the owner's identity id.
    /// `created_at` and `updated_at` start equal.
    pub fn new(input: NewTask, owner_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            status: input.status,
            owner_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Raw create/update payload as deserialized from the request body, before
/// any validation has run. `into_new_task` and `into_patch` are the only
/// ways to turn it into something the engine accepts.
#[derive(Debug, Default, Deserialize)]
pub struct TaskDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

/// Validated input for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
}

/// Validated partial update. Only these three fields can ever change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
}

fn check_title_bounds(title: &str, errors: &mut Vec<FieldError>) {
    let len = title.chars().count();
    if len < TITLE_MIN || len > TITLE_MAX {
        errors.push(FieldError::new(
            "title",
            "Title must be between 3 and 100 characters",
        ));
    }
}

fn check_description(raw: &str, errors: &mut Vec<FieldError>) -> String {
    let trimmed = raw.trim().to_string();
    if trimmed.chars().count() > DESCRIPTION_MAX {
        errors.push(FieldError::new(
            "description",
            "Description cannot exceed 500 characters",
        ));
    }
    trimmed
}

fn check_status(raw: &str, errors: &mut Vec<FieldError>) -> Option<TaskStatus> {
    match TaskStatus::parse(raw) {
        Some(status) => Some(status),
        None => {
            errors.push(FieldError::new(
                "status",
                "Status must be TODO, IN_PROGRESS, or DONE",
            ));
            None
        }
    }
}

impl TaskDraft {
    /// Validates the draft as a create payload. Title is required; status
    /// defaults to TODO and description to empty. All field errors are
    /// collected, not just the first.
    pub fn into_new_task(self) -> Result<NewTask, Vec<FieldError>> {
        let mut errors = Vec::new();

        let title = self
            .title
            .as_deref()
            .map(str::trim)
            .unwrap_or("")
            .to_string();
        if title.is_empty() {
            errors.push(FieldError::new("title", "Title is required"));
        } else {
            check_title_bounds(&title, &mut errors);
        }

        let description = self
            .description
            .as_deref()
            .map(|raw| check_description(raw, &mut errors))
            .unwrap_or_default();

        let status = self
            .status
            .as_deref()
            .and_then(|raw| check_status(raw, &mut errors))
            .unwrap_or(TaskStatus::Todo);

        if errors.is_empty() {
            Ok(NewTask {
                title,
                description,
                status,
            })
        } else {
            Err(errors)
        }
    }

    /// Validates the draft as an update payload. Every field is optional,
    /// but a field that is present must satisfy the same bounds as at
    /// creation. An empty patch is legal and still refreshes `updatedAt`.
    pub fn into_patch(self) -> Result<TaskPatch, Vec<FieldError>> {
        let mut errors = Vec::new();
        let mut patch = TaskPatch::default();

        if let Some(raw) = self.title.as_deref() {
            let title = raw.trim().to_string();
            if title.is_empty() {
                errors.push(FieldError::new("title", "Title cannot be empty"));
            } else {
                check_title_bounds(&title, &mut errors);
                patch.title = Some(title);
            }
        }

        if let Some(raw) = self.description.as_deref() {
            patch.description = Some(check_description(raw, &mut errors));
        }

        if let Some(raw) = self.status.as_deref() {
            patch.status = check_status(raw, &mut errors);
        }

        if errors.is_empty() {
            Ok(patch)
        } else {
            Err(errors)
        }
    }
}

/// Restricts a listing to matching tasks. Both filters compose with the
/// implicit owner scoping; neither widens it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Exact status match.
    pub status: Option<TaskStatus>,
    /// Case-insensitive substring match on the title.
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    Title,
}

impl SortField {
    pub fn parse(value: &str) -> Option<SortField> {
        match value {
            "createdAt" => Some(SortField::CreatedAt),
            "updatedAt" => Some(SortField::UpdatedAt),
            "title" => Some(SortField::Title),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(value: &str) -> Option<SortOrder> {
        match value {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }
}

/// Requested ordering. Whatever the primary key and direction, ties are
/// broken by ascending task id so page boundaries are stable across calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSort {
    pub field: SortField,
    pub order: SortOrder,
}

/// Raw query parameters for a task listing, exactly as supplied by the
/// caller. Everything arrives as text and is parsed by `into_query`.
#[derive(Debug, Default, Deserialize)]
pub struct TaskListParams {
    pub status: Option<String>,
    pub search: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

/// Validated listing parameters with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListQuery {
    pub filter: TaskFilter,
    pub page: u32,
    pub limit: u32,
    pub sort: TaskSort,
}

impl TaskListParams {
    /// Parses and validates the raw parameters, applying the defaults
    /// `page=1, limit=10, sortBy=createdAt, order=desc`. All field errors
    /// are collected.
    pub fn into_query(self) -> Result<TaskListQuery, Vec<FieldError>> {
        let mut errors = Vec::new();

        let status = match self.status.as_deref() {
            Some(raw) => match TaskStatus::parse(raw) {
                Some(status) => Some(status),
                None => {
                    errors.push(FieldError::new("status", "Invalid status filter"));
                    None
                }
            },
            None => None,
        };

        let search = match self.search.as_deref() {
            Some(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    errors.push(FieldError::new("search", "Search term cannot be empty"));
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            None => None,
        };

        let page = match self.page.as_deref() {
            Some(raw) => match raw.parse::<u32>() {
                Ok(page) if page >= 1 => page,
                _ => {
                    errors.push(FieldError::new("page", "Page must be a positive integer"));
                    1
                }
            },
            None => 1,
        };

        let limit = match self.limit.as_deref() {
            Some(raw) => match raw.parse::<u32>() {
                Ok(limit) if (1..=LIMIT_MAX).contains(&limit) => limit,
                _ => {
                    errors.push(FieldError::new("limit", "Limit must be between 1 and 100"));
                    DEFAULT_LIMIT
                }
            },
            None => DEFAULT_LIMIT,
        };

        let field = match self.sort_by.as_deref() {
            Some(raw) => match SortField::parse(raw) {
                Some(field) => field,
                None => {
                    errors.push(FieldError::new("sortBy", "Invalid sort field"));
                    SortField::CreatedAt
                }
            },
            None => SortField::CreatedAt,
        };

        let order = match self.order.as_deref() {
            Some(raw) => match SortOrder::parse(raw) {
                Some(order) => order,
                None => {
                    errors.push(FieldError::new("order", "Order must be asc or desc"));
                    SortOrder::Desc
                }
            },
            None => SortOrder::Desc,
        };

        if errors.is_empty() {
            Ok(TaskListQuery {
                filter: TaskFilter { status, search },
                page,
                limit,
                sort: TaskSort { field, order },
            })
        } else {
            Err(errors)
        }
    }
}

/// Pagination metadata for a task listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_tasks: u64,
    pub limit: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total_tasks: u64) -> Self {
        let total_pages = (total_tasks.div_ceil(limit as u64)) as u32;
        Self {
            current_page: page,
            total_pages,
            total_tasks,
            limit,
            has_next_page: page < total_pages,
            has_prev_page: page > 1,
        }
    }
}

/// One page of a task listing together with its pagination envelope.
#[derive(Debug, Clone)]
pub struct TaskPage {
    pub tasks: Vec<Task>,
    pub pagination: Pagination,
}

/// Per-status task counts for one owner. The three counts always sum to
/// `total`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskStats {
    #[serde(rename = "TODO")]
    pub todo: u64,
    #[serde(rename = "IN_PROGRESS")]
    pub in_progress: u64,
    #[serde(rename = "DONE")]
    pub done: u64,
    pub total: u64,
}
