//! Task progress log endpoints.

use super::{ApiJson, AppState};
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::mapper::{self, TaskProgress};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ProgressRequest {
    description: String,
}

pub(crate) async fn add_progress(
    State(state): State<AppState>,
    user: AuthUser,
    Path(task_id): Path<String>,
    ApiJson(input): ApiJson<ProgressRequest>,
) -> ApiResult<(StatusCode, Json<TaskProgress>)> {
    user.require_provider()?;
    let row = state
        .db
        .add_task_progress(&task_id, &user.id, &input.description)?;
    Ok((StatusCode::CREATED, Json(mapper::progress(row))))
}

pub(crate) async fn list_progress(
    State(state): State<AppState>,
    user: AuthUser,
    Path(task_id): Path<String>,
) -> ApiResult<Json<Vec<TaskProgress>>> {
    let rows = state.db.list_task_progress(&task_id, &user.id)?;
    Ok(Json(rows.into_iter().map(mapper::progress).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_support;
    use crate::error::ErrorCode;
    use crate::types::{NewOffer, NewTask, Role};

    #[tokio::test]
    async fn progress_is_created_then_refused_after_close() {
        let state = test_support::state();
        let owner = test_support::register(&state, "r@example.com", Role::Requester);
        let provider = test_support::register(&state, "p@example.com", Role::Provider);

        let task = state
            .db
            .create_task(
                &owner.id,
                &NewTask {
                    category: "Tutoring".into(),
                    name: "Algebra".into(),
                    description: "Weekly sessions".into(),
                    start_date: "2026-11-10".into(),
                    expected_working_hours: 10,
                    hourly_rate: 50.0,
                    rate_currency: "USD".into(),
                },
            )
            .unwrap();
        let offer = state
            .db
            .make_offer(
                &task.id,
                &provider.id,
                &NewOffer {
                    offered_rate: 50.0,
                    rate_currency: "USD".into(),
                    message: None,
                },
            )
            .unwrap();
        state.db.accept_offer(&offer.id, &owner.id).unwrap();

        let (status, _) = add_progress(
            State(state.clone()),
            provider.clone(),
            Path(task.id.clone()),
            ApiJson(ProgressRequest {
                description: "Covered linear equations".into(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);

        state.db.mark_task_completed(&task.id, &provider.id).unwrap();
        state.db.accept_completion(&task.id, &owner.id).unwrap();

        let err = add_progress(
            State(state.clone()),
            provider,
            Path(task.id.clone()),
            ApiJson(ProgressRequest {
                description: "One more".into(),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::Validation);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let Json(entries) = list_progress(State(state), owner, Path(task.id)).await.unwrap();
        assert_eq!(entries.len(), 1);
    }
}
