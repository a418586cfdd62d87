//! Offer endpoints: bidding and the accept/reject decision.

use super::{ApiJson, AppState};
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::mapper::{self, Offer};
use crate::types::NewOffer;
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

pub(crate) async fn make_offer(
    State(state): State<AppState>,
    user: AuthUser,
    Path(task_id): Path<String>,
    ApiJson(input): ApiJson<NewOffer>,
) -> ApiResult<(StatusCode, Json<Offer>)> {
    user.require_provider()?;
    let row = state.db.make_offer(&task_id, &user.id, &input)?;
    Ok((StatusCode::CREATED, Json(mapper::offer(row))))
}

pub(crate) async fn list_task_offers(
    State(state): State<AppState>,
    user: AuthUser,
    Path(task_id): Path<String>,
) -> ApiResult<Json<Vec<Offer>>> {
    user.require_requester()?;
    let rows = state.db.list_offers_for_task(&task_id, &user.id)?;
    Ok(Json(rows.into_iter().map(mapper::offer).collect()))
}

pub(crate) async fn list_my_offers(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<Vec<Offer>>> {
    user.require_provider()?;
    let rows = state.db.list_provider_offers(&user.id)?;
    Ok(Json(rows.into_iter().map(mapper::offer).collect()))
}

pub(crate) async fn accept_offer(
    State(state): State<AppState>,
    user: AuthUser,
    Path(offer_id): Path<String>,
) -> ApiResult<Json<Offer>> {
    user.require_requester()?;
    let row = state.db.accept_offer(&offer_id, &user.id)?;
    Ok(Json(mapper::offer(row)))
}

pub(crate) async fn reject_offer(
    State(state): State<AppState>,
    user: AuthUser,
    Path(offer_id): Path<String>,
) -> ApiResult<Json<Offer>> {
    user.require_requester()?;
    let row = state.db.reject_offer(&offer_id, &user.id)?;
    Ok(Json(mapper::offer(row)))
}
