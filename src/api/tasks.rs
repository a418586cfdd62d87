//! Task endpoints, including the completion review transitions.

use super::{ApiJson, AppState};
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::mapper::{self, Task};
use crate::types::{NewTask, Role, TaskStatus, TaskUpdate};
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

/// Query parameters for task listing.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct TaskListParams {
    /// Requesters only: filter their own tasks by status.
    status: Option<String>,
    /// Providers only: filter open tasks by category.
    category: Option<String>,
}

pub(crate) async fn create_task(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(input): ApiJson<NewTask>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    user.require_requester()?;
    let row = state.db.create_task(&user.id, &input)?;
    Ok((StatusCode::CREATED, Json(mapper::task(row))))
}

/// Requesters see their own tasks; providers browse open ones.
pub(crate) async fn list_tasks(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<TaskListParams>,
) -> ApiResult<Json<Vec<Task>>> {
    let rows = match user.role {
        Role::Requester => {
            let status = params
                .status
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(|s| {
                    s.parse::<TaskStatus>()
                        .map_err(|_| ApiError::invalid_value("status", "unknown task status"))
                })
                .transpose()?;
            state.db.list_tasks_for_owner(&user.id, status)?
        }
        Role::Provider => {
            let category = params.category.as_deref().filter(|c| !c.is_empty());
            state.db.list_open_tasks(category)?
        }
    };
    Ok(Json(rows.into_iter().map(mapper::task).collect()))
}

pub(crate) async fn get_task(
    State(state): State<AppState>,
    user: AuthUser,
    Path(task_id): Path<String>,
) -> ApiResult<Json<Task>> {
    let row = state
        .db
        .get_task(&task_id)?
        .ok_or_else(|| ApiError::not_found("Task"))?;
    if user.role == Role::Requester {
        user.require_owner(&row.user_id)?;
    }
    Ok(Json(mapper::task(row)))
}

pub(crate) async fn update_task(
    State(state): State<AppState>,
    user: AuthUser,
    Path(task_id): Path<String>,
    ApiJson(update): ApiJson<TaskUpdate>,
) -> ApiResult<Json<Task>> {
    user.require_requester()?;
    let row = state.db.update_task(&task_id, &user.id, &update)?;
    Ok(Json(mapper::task(row)))
}

pub(crate) async fn mark_completed(
    State(state): State<AppState>,
    user: AuthUser,
    Path(task_id): Path<String>,
) -> ApiResult<Json<Task>> {
    user.require_provider()?;
    let row = state.db.mark_task_completed(&task_id, &user.id)?;
    Ok(Json(mapper::task(row)))
}

pub(crate) async fn accept_completion(
    State(state): State<AppState>,
    user: AuthUser,
    Path(task_id): Path<String>,
) -> ApiResult<Json<Task>> {
    user.require_requester()?;
    let row = state.db.accept_completion(&task_id, &user.id)?;
    Ok(Json(mapper::task(row)))
}

pub(crate) async fn reject_completion(
    State(state): State<AppState>,
    user: AuthUser,
    Path(task_id): Path<String>,
) -> ApiResult<Json<Task>> {
    user.require_requester()?;
    let row = state.db.reject_completion(&task_id, &user.id)?;
    Ok(Json(mapper::task(row)))
}
