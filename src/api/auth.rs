//! Signup, login and current-user endpoints.

use super::{ApiJson, AppState};
use crate::auth::{AuthUser, hash_password, verify_password};
use crate::error::{ApiError, ApiResult};
use crate::mapper::{self, User};
use crate::types::NewUser;
use crate::validate;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(crate) struct SessionResponse {
    token: String,
    user: User,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct LoginRequest {
    email: String,
    password: String,
}

pub(crate) async fn signup(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewUser>,
) -> ApiResult<(StatusCode, Json<SessionResponse>)> {
    let (role, user_type) = validate::new_user(&input, state.min_password_len)?;
    let password_hash = hash_password(&input.password)?;
    let row = state.db.create_user(&input, role, user_type, &password_hash)?;
    let token = state.tokens.issue(&row)?;

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            token,
            user: mapper::user(row),
        }),
    ))
}

pub(crate) async fn login(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<LoginRequest>,
) -> ApiResult<Json<SessionResponse>> {
    validate::required("email", &input.email)?;
    validate::required("password", &input.password)?;

    // Unknown email and wrong password look the same to the caller.
    let invalid = || ApiError::unauthenticated("Invalid email or password");
    let row = state.db.get_user_by_email(&input.email)?.ok_or_else(invalid)?;
    if !verify_password(&input.password, &row.password_hash) {
        tracing::debug!(user_id = %row.id, "Login rejected: wrong password");
        return Err(invalid());
    }

    let token = state.tokens.issue(&row)?;
    Ok(Json(SessionResponse {
        token,
        user: mapper::user(row),
    }))
}

pub(crate) async fn me(State(state): State<AppState>, user: AuthUser) -> ApiResult<Json<User>> {
    let row = state
        .db
        .get_user(&user.id)?
        .ok_or_else(|| ApiError::not_found("User"))?;
    Ok(Json(mapper::user(row)))
}
