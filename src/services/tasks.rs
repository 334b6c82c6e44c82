use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Pagination, Task, TaskDraft, TaskListQuery, TaskPage};
use crate::store::TaskStore;

/// The task query engine: creation, listing with filter/sort/pagination,
/// and the conditional single-record operations. Every call is scoped to
/// one owner; no filter combination can widen that scope.
pub struct TaskService {
    store: Arc<dyn TaskStore>,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    /// Validates the draft, applies defaults (status TODO, empty
    /// description), and stores the task with `created_at == updated_at`.
    pub async fn create(&self, owner_id: Uuid, draft: TaskDraft) -> Result<Task, AppError> {
        let new_task = draft.into_new_task().map_err(AppError::Validation)?;
        self.store.insert(Task::new(new_task, owner_id)).await
    }

    /// One page of the owner's tasks. The page fetch and the total count are
    /// two store reads; the pagination envelope is computed here:
    /// `skip = (page-1)*limit`, `totalPages = ceil(total/limit)`.
    pub async fn list(&self, owner_id: Uuid, query: TaskListQuery) -> Result<TaskPage, AppError> {
        let skip = (query.page as u64 - 1) * query.limit as u64;
        let tasks = self
            .store
            .find_page(owner_id, &query.filter, query.sort, skip, query.limit)
            .await?;
        let total = self.store.count(owner_id, &query.filter).await?;

        Ok(TaskPage {
            tasks,
            pagination: Pagination::new(query.page, query.limit, total),
        })
    }

    /// Fetches one task. A task that exists but belongs to someone else
    /// yields the same `NotFound` as a task that does not exist.
    pub async fn get(&self, task_id: Uuid, owner_id: Uuid) -> Result<Task, AppError> {
        self.store
            .find_by_id(task_id, owner_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".into()))
    }

    /// Applies a partial update through the store's conditional operation,
    /// which checks ownership, mutates, and refreshes `updated_at` as one
    /// step. Only title, description, and status can change.
    pub async fn update(
        &self,
        task_id: Uuid,
        owner_id: Uuid,
        draft: TaskDraft,
    ) -> Result<Task, AppError> {
        let patch = draft.into_patch().map_err(AppError::Validation)?;
        self.store
            .update(task_id, owner_id, patch, Utc::now())
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".into()))
    }

    /// Conditional delete. Not idempotent: deleting an already-deleted id
    /// fails with `NotFound` like any other missing task.
    pub async fn delete(&self, task_id: Uuid, owner_id: Uuid) -> Result<(), AppError> {
        if self.store.delete(task_id, owner_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound("Task not found".into()))
        }
    }
}
