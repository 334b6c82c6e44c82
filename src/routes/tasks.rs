use crate::{
    auth::AuthenticatedIdentity,
    error::AppError,
    models::{TaskDraft, TaskListParams},
    services::{StatsAggregator, TaskService},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use uuid::Uuid;

/// Lists the caller's tasks with filtering, sorting, and pagination.
///
/// ## Query Parameters:
/// - `status` (optional): exact status match (`TODO`, `IN_PROGRESS`, `DONE`).
/// - `search` (optional): case-insensitive substring match on the title.
/// - `page` (optional, default 1) and `limit` (optional, default 10, max 100).
/// - `sortBy` (optional, default `createdAt`): `createdAt`, `updatedAt`, or `title`.
/// - `order` (optional, default `desc`): `asc` or `desc`.
///
/// Parameter validation happens here at the gate; the engine only ever sees
/// well-formed queries. The response carries the page plus a pagination
/// envelope (`currentPage`, `totalPages`, `totalTasks`, `limit`,
/// `hasNextPage`, `hasPrevPage`).
#[get("")]
pub async fn get_tasks(
    service: web::Data<TaskService>,
    params: web::Query<TaskListParams>,
    identity: AuthenticatedIdentity,
) -> Result<impl Responder, AppError> {
    let query = params.into_inner().into_query().map_err(AppError::Validation)?;

    let page = service.list(identity.0, query).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": page.tasks,
        "pagination": page.pagination,
    })))
}

/// Creates a task owned by the caller.
///
/// Title is required (3-100 characters after trimming); description
/// defaults to empty and status to `TODO`. Validation failures return the
/// full field-error list.
#[post("")]
pub async fn create_task(
    service: web::Data<TaskService>,
    payload: web::Json<TaskDraft>,
    identity: AuthenticatedIdentity,
) -> Result<impl Responder, AppError> {
    let task = service.create(identity.0, payload.into_inner()).await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Task created successfully",
        "data": task,
    })))
}

/// Per-status counts for the caller's tasks, zero-filled, with their sum.
///
/// Registered before the `/{id}` routes so "stats" is never parsed as a
/// task id.
#[get("/stats")]
pub async fn get_task_stats(
    aggregator: web::Data<StatsAggregator>,
    identity: AuthenticatedIdentity,
) -> Result<impl Responder, AppError> {
    let stats = aggregator.task_stats(identity.0).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": stats,
    })))
}

/// Fetches one of the caller's tasks by id.
///
/// A task owned by someone else yields the same 404 as a missing id.
#[get("/{id}")]
pub async fn get_task(
    service: web::Data<TaskService>,
    task_id: web::Path<Uuid>,
    identity: AuthenticatedIdentity,
) -> Result<impl Responder, AppError> {
    let task = service.get(task_id.into_inner(), identity.0).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": task,
    })))
}

/// Updates title, description, and/or status of one of the caller's tasks.
///
/// The ownership check and the mutation are a single conditional store
/// operation, which also refreshes `updatedAt`. Returns the post-update
/// record.
#[put("/{id}")]
pub async fn update_task(
    service: web::Data<TaskService>,
    task_id: web::Path<Uuid>,
    payload: web::Json<TaskDraft>,
    identity: AuthenticatedIdentity,
) -> Result<impl Responder, AppError> {
    let task = service
        .update(task_id.into_inner(), identity.0, payload.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Task updated successfully",
        "data": task,
    })))
}

/// Deletes one of the caller's tasks. Deleting the same id again is a 404.
#[delete("/{id}")]
pub async fn delete_task(
    service: web::Data<TaskService>,
    task_id: web::Path<Uuid>,
    identity: AuthenticatedIdentity,
) -> Result<impl Responder, AppError> {
    service.delete(task_id.into_inner(), identity.0).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Task deleted successfully",
    })))
}
