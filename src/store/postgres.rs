use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{
    Identity, IdentityRecord, SortField, SortOrder, Task, TaskFilter, TaskPatch, TaskSort,
    TaskStatus,
};
use crate::store::{IdentityStore, TaskStore};

const TASK_COLUMNS: &str = "id, title, description, status, owner_id, created_at, updated_at";

/// PostgreSQL-backed identity store. Email uniqueness is enforced by a
/// unique index on `lower(email)`; a violation surfaces as
/// `AppError::DuplicateEmail`.
pub struct PgIdentityStore {
    pool: PgPool,
}

impl PgIdentityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for PgIdentityStore {
    async fn insert(&self, record: IdentityRecord) -> Result<Identity, AppError> {
        sqlx::query_as::<_, Identity>(
            "INSERT INTO identities (id, name, email, password_hash, created_at) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, name, email, created_at",
        )
        .bind(record.id)
        .bind(&record.name)
        .bind(&record.email)
        .bind(&record.password_hash)
        .bind(record.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if let sqlx::Error::Database(db) = &err {
                if db.is_unique_violation() {
                    return AppError::DuplicateEmail;
                }
            }
            AppError::from(err)
        })
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<IdentityRecord>, AppError> {
        let record = sqlx::query_as::<_, IdentityRecord>(
            "SELECT id, name, email, password_hash, created_at \
             FROM identities WHERE lower(email) = lower($1)",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>, AppError> {
        let identity = sqlx::query_as::<_, Identity>(
            "SELECT id, name, email, created_at FROM identities WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(identity)
    }
}

/// PostgreSQL-backed task store. Updates and deletes are single conditional
/// statements keyed on `(id, owner_id)`, so there is no window between the
/// ownership check and the mutation.
pub struct PgTaskStore {
    pool: PgPool,
}

impl PgTaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn sort_column(field: SortField) -> &'static str {
    match field {
        SortField::CreatedAt => "created_at",
        SortField::UpdatedAt => "updated_at",
        SortField::Title => "title",
    }
}

fn sort_direction(order: SortOrder) -> &'static str {
    match order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    }
}

/// `ORDER BY` clause for a listing. The column name comes from a closed
/// enum, never from caller input, and the ascending id tie-break keeps page
/// boundaries stable when many rows share a sort-key value.
fn order_by_clause(sort: TaskSort) -> String {
    format!(
        " ORDER BY {} {}, id ASC",
        sort_column(sort.field),
        sort_direction(sort.order)
    )
}

/// Appends the filter conditions to a query that already has `owner_id`
/// bound as `$1`, returning the next free placeholder index.
fn push_filter_conditions(sql: &mut String, filter: &TaskFilter) -> usize {
    let mut param = 2;
    if filter.status.is_some() {
        sql.push_str(&format!(" AND status = ${}", param));
        param += 1;
    }
    if filter.search.is_some() {
        sql.push_str(&format!(" AND title ILIKE ${}", param));
        param += 1;
    }
    param
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn insert(&self, task: Task) -> Result<Task, AppError> {
        let inserted = sqlx::query_as::<_, Task>(&format!(
            "INSERT INTO tasks ({}) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {}",
            TASK_COLUMNS, TASK_COLUMNS
        ))
        .bind(task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status)
        .bind(task.owner_id)
        .bind(task.created_at)
        .bind(task.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(inserted)
    }

    async fn find_page(
        &self,
        owner_id: Uuid,
        filter: &TaskFilter,
        sort: TaskSort,
        skip: u64,
        limit: u32,
    ) -> Result<Vec<Task>, AppError> {
        let mut sql = format!("SELECT {} FROM tasks WHERE owner_id = $1", TASK_COLUMNS);
        let param = push_filter_conditions(&mut sql, filter);
        sql.push_str(&order_by_clause(sort));
        sql.push_str(&format!(" OFFSET ${} LIMIT ${}", param, param + 1));

        let mut query = sqlx::query_as::<_, Task>(&sql).bind(owner_id);
        if let Some(status) = filter.status {
            query = query.bind(status);
        }
        if let Some(search) = &filter.search {
            query = query.bind(format!("%{}%", search));
        }
        let tasks = query
            .bind(skip as i64)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;
        Ok(tasks)
    }

    async fn count(&self, owner_id: Uuid, filter: &TaskFilter) -> Result<u64, AppError> {
        let mut sql = String::from("SELECT COUNT(*) FROM tasks WHERE owner_id = $1");
        push_filter_conditions(&mut sql, filter);

        let mut query = sqlx::query_scalar::<_, i64>(&sql).bind(owner_id);
        if let Some(status) = filter.status {
            query = query.bind(status);
        }
        if let Some(search) = &filter.search {
            query = query.bind(format!("%{}%", search));
        }
        let total = query.fetch_one(&self.pool).await?;
        Ok(total as u64)
    }

    async fn find_by_id(&self, task_id: Uuid, owner_id: Uuid) -> Result<Option<Task>, AppError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE id = $1 AND owner_id = $2",
            TASK_COLUMNS
        ))
        .bind(task_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(task)
    }

    async fn update(
        &self,
        task_id: Uuid,
        owner_id: Uuid,
        patch: TaskPatch,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Task>, AppError> {
        let mut sql = String::from("UPDATE tasks SET updated_at = $1");
        let mut param = 2;
        if patch.title.is_some() {
            sql.push_str(&format!(", title = ${}", param));
            param += 1;
        }
        if patch.description.is_some() {
            sql.push_str(&format!(", description = ${}", param));
            param += 1;
        }
        if patch.status.is_some() {
            sql.push_str(&format!(", status = ${}", param));
            param += 1;
        }
        sql.push_str(&format!(
            " WHERE id = ${} AND owner_id = ${} RETURNING {}",
            param,
            param + 1,
            TASK_COLUMNS
        ));

        let mut query = sqlx::query_as::<_, Task>(&sql).bind(updated_at);
        if let Some(title) = &patch.title {
            query = query.bind(title.clone());
        }
        if let Some(description) = &patch.description {
            query = query.bind(description.clone());
        }
        if let Some(status) = patch.status {
            query = query.bind(status);
        }
        let updated = query
            .bind(task_id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }

    async fn delete(&self, task_id: Uuid, owner_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND owner_id = $2")
            .bind(task_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_by_status(&self, owner_id: Uuid) -> Result<HashMap<TaskStatus, u64>, AppError> {
        let rows = sqlx::query_as::<_, (TaskStatus, i64)>(
            "SELECT status, COUNT(*) FROM tasks WHERE owner_id = $1 GROUP BY status",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(status, count)| (status, count as u64))
            .collect())
    }
}
