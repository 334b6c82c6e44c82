//!
//! # Persistence Traits
//!
//! The services never talk to a database directly; they hold
//! `Arc<dyn IdentityStore>` / `Arc<dyn TaskStore>` handed in at
//! construction. The binary wires in the PostgreSQL implementations, the
//! test suites wire in the in-memory ones, and both honor the same
//! contract — in particular the conditional single-operation update and
//! delete keyed on `(id, owner)`.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Identity, IdentityRecord, Task, TaskFilter, TaskPatch, TaskSort, TaskStatus};

pub use memory::{MemoryIdentityStore, MemoryTaskStore};
pub use postgres::{PgIdentityStore, PgTaskStore};

/// Persists identity records and enforces unique email at the storage layer.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Inserts a new identity. Returns `AppError::DuplicateEmail` when the
    /// email (case-insensitive) is already registered.
    async fn insert(&self, record: IdentityRecord) -> Result<Identity, AppError>;

    /// Looks an identity up by email, case-insensitively. Returns the full
    /// record including the credential hash; only the identity service may
    /// call this.
    async fn find_by_email(&self, email: &str) -> Result<Option<IdentityRecord>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>, AppError>;
}

/// Persists tasks and supports the filtered/sorted/paginated reads plus the
/// atomic conditional mutations the query engine relies on.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert(&self, task: Task) -> Result<Task, AppError>;

    /// One page of the owner's tasks under `filter`, ordered by `sort` with
    /// ascending id as the tie-break.
    async fn find_page(
        &self,
        owner_id: Uuid,
        filter: &TaskFilter,
        sort: TaskSort,
        skip: u64,
        limit: u32,
    ) -> Result<Vec<Task>, AppError>;

    /// Total number of the owner's tasks matching `filter`.
    async fn count(&self, owner_id: Uuid, filter: &TaskFilter) -> Result<u64, AppError>;

    /// The task with this id, if it exists AND belongs to `owner_id`.
    async fn find_by_id(&self, task_id: Uuid, owner_id: Uuid) -> Result<Option<Task>, AppError>;

    /// Applies `patch` and stamps `updated_at` in one conditional operation
    /// keyed on `(task_id, owner_id)`. Returns the post-update record, or
    /// `None` when no such task exists for that owner.
    async fn update(
        &self,
        task_id: Uuid,
        owner_id: Uuid,
        patch: TaskPatch,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Task>, AppError>;

    /// Conditional delete keyed on `(task_id, owner_id)`. Returns whether a
    /// row was removed.
    async fn delete(&self, task_id: Uuid, owner_id: Uuid) -> Result<bool, AppError>;

    /// Per-status counts for one owner, taken from a single query or lock so
    /// the counts are one consistent snapshot. Absent statuses are simply
    /// absent; zero-filling is the aggregator's job.
    async fn count_by_status(&self, owner_id: Uuid) -> Result<HashMap<TaskStatus, u64>, AppError>;
}
