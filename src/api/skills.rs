//! Provider skill catalog endpoints. Everything is owner-scoped.

use super::{ApiJson, AppState};
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::mapper::{self, Skill};
use crate::types::{NewSkill, SkillUpdate};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

pub(crate) async fn create_skill(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(input): ApiJson<NewSkill>,
) -> ApiResult<(StatusCode, Json<Skill>)> {
    user.require_provider()?;
    let row = state.db.create_skill(&user.id, &input)?;
    Ok((StatusCode::CREATED, Json(mapper::skill(row))))
}

pub(crate) async fn list_skills(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<Skill>>> {
    user.require_provider()?;
    let rows = state.db.list_skills(&user.id)?;
    Ok(Json(rows.into_iter().map(mapper::skill).collect()))
}

pub(crate) async fn get_skill(
    State(state): State<AppState>,
    user: AuthUser,
    Path(skill_id): Path<String>,
) -> ApiResult<Json<Skill>> {
    user.require_provider()?;
    let row = state
        .db
        .get_skill(&skill_id, &user.id)?
        .ok_or_else(|| ApiError::not_found("Skill"))?;
    Ok(Json(mapper::skill(row)))
}

pub(crate) async fn update_skill(
    State(state): State<AppState>,
    user: AuthUser,
    Path(skill_id): Path<String>,
    ApiJson(update): ApiJson<SkillUpdate>,
) -> ApiResult<Json<Skill>> {
    user.require_provider()?;
    let row = state.db.update_skill(&skill_id, &user.id, &update)?;
    Ok(Json(mapper::skill(row)))
}

pub(crate) async fn delete_skill(
    State(state): State<AppState>,
    user: AuthUser,
    Path(skill_id): Path<String>,
) -> ApiResult<StatusCode> {
    user.require_provider()?;
    state.db.delete_skill(&skill_id, &user.id)?;
    Ok(StatusCode::NO_CONTENT)
}
