use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{
    Identity, IdentityRecord, SortField, SortOrder, Task, TaskFilter, TaskPatch, TaskSort,
    TaskStatus,
};
use crate::store::{IdentityStore, TaskStore};

/// In-memory identity store. Backs the test suites and honors the same
/// unique-email contract as the PostgreSQL store.
#[derive(Default)]
pub struct MemoryIdentityStore {
    records: RwLock<HashMap<Uuid, IdentityRecord>>,
}

/// In-memory task store. Each mutation runs its ownership check and its
/// write inside one lock acquisition, matching the conditional semantics of
/// the SQL statements it stands in for.
#[derive(Default)]
pub struct MemoryTaskStore {
    tasks: RwLock<HashMap<Uuid, Task>>,
}

fn matches(task: &Task, owner_id: Uuid, filter: &TaskFilter) -> bool {
    if task.owner_id != owner_id {
        return false;
    }
    if let Some(status) = filter.status {
        if task.status != status {
            return false;
        }
    }
    if let Some(search) = &filter.search {
        if !task
            .title
            .to_lowercase()
            .contains(&search.to_lowercase())
        {
            return false;
        }
    }
    true
}

fn compare(a: &Task, b: &Task, sort: TaskSort) -> Ordering {
    let primary = match sort.field {
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        SortField::Title => a.title.cmp(&b.title),
    };
    let primary = match sort.order {
        SortOrder::Asc => primary,
        SortOrder::Desc => primary.reverse(),
    };
    // Ascending id regardless of direction: one layout per (field, order).
    primary.then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl IdentityStore for MemoryIdentityStore {
    async fn insert(&self, record: IdentityRecord) -> Result<Identity, AppError> {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        if records
            .values()
            .any(|existing| existing.email.eq_ignore_ascii_case(&record.email))
        {
            return Err(AppError::DuplicateEmail);
        }
        let identity = record.clone().into_identity();
        records.insert(record.id, record);
        Ok(identity)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<IdentityRecord>, AppError> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        Ok(records
            .values()
            .find(|record| record.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>, AppError> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        Ok(records.get(&id).cloned().map(IdentityRecord::into_identity))
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn insert(&self, task: Task) -> Result<Task, AppError> {
        let mut tasks = self.tasks.write().unwrap_or_else(|e| e.into_inner());
        tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn find_page(
        &self,
        owner_id: Uuid,
        filter: &TaskFilter,
        sort: TaskSort,
        skip: u64,
        limit: u32,
    ) -> Result<Vec<Task>, AppError> {
        let tasks = self.tasks.read().unwrap_or_else(|e| e.into_inner());
        let mut matching: Vec<Task> = tasks
            .values()
            .filter(|task| matches(task, owner_id, filter))
            .cloned()
            .collect();
        matching.sort_by(|a, b| compare(a, b, sort));
        Ok(matching
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count(&self, owner_id: Uuid, filter: &TaskFilter) -> Result<u64, AppError> {
        let tasks = self.tasks.read().unwrap_or_else(|e| e.into_inner());
        Ok(tasks
            .values()
            .filter(|task| matches(task, owner_id, filter))
            .count() as u64)
    }

    async fn find_by_id(&self, task_id: Uuid, owner_id: Uuid) -> Result<Option<Task>, AppError> {
        let tasks = self.tasks.read().unwrap_or_else(|e| e.into_inner());
        Ok(tasks
            .get(&task_id)
            .filter(|task| task.owner_id == owner_id)
            .cloned())
    }

    async fn update(
        &self,
        task_id: Uuid,
        owner_id: Uuid,
        patch: TaskPatch,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Task>, AppError> {
        let mut tasks = self.tasks.write().unwrap_or_else(|e| e.into_inner());
        let task = match tasks.get_mut(&task_id) {
            Some(task) if task.owner_id == owner_id => task,
            _ => return Ok(None),
        };
        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(status) = patch.status {
            task.status = status;
        }
        task.updated_at = updated_at;
        Ok(Some(task.clone()))
    }

    async fn delete(&self, task_id: Uuid, owner_id: Uuid) -> Result<bool, AppError> {
        let mut tasks = self.tasks.write().unwrap_or_else(|e| e.into_inner());
        match tasks.get(&task_id) {
            Some(task) if task.owner_id == owner_id => {
                tasks.remove(&task_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn count_by_status(&self, owner_id: Uuid) -> Result<HashMap<TaskStatus, u64>, AppError> {
        let tasks = self.tasks.read().unwrap_or_else(|e| e.into_inner());
        let mut counts = HashMap::new();
        for task in tasks.values().filter(|task| task.owner_id == owner_id) {
            *counts.entry(task.status).or_insert(0) += 1;
        }
        Ok(counts)
    }
}
