//! Handlers for the `/event` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use eventhub_core::types::DbId;
use eventhub_db::models::event::{
    CascadeSummary, CreateEvent, Event, UpdateEvent, UpdateEventState,
};

use crate::error::AppResult;
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::rbac::{policy, Authorized};
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::workflow::event;

/// POST /api/v1/event/create
pub async fn create(
    Authorized(user, _): Authorized<policy::CreateEvent>,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateEvent>,
) -> AppResult<(StatusCode, Json<ApiResponse<Event>>)> {
    let created = event::create(&state, &user, input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok("Event created", created))))
}

/// GET /api/v1/event/get
///
/// Public: no token required.
pub async fn list(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<Event>>>> {
    let items = event::list_accepted(&state).await?;
    Ok(Json(ApiResponse::ok("Events retrieved", items)))
}

/// GET /api/v1/event/mine
pub async fn list_mine(
    Authorized(user, _): Authorized<policy::ListOwnEvents>,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<Event>>>> {
    let items = event::list_mine(&state, &user).await?;
    Ok(Json(ApiResponse::ok("Events retrieved", items)))
}

/// GET /api/v1/event/get/{id}
pub async fn get_by_id(
    _auth: Authorized<policy::ViewEvent>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<ApiResponse<Event>>> {
    let found = event::get(&state, id).await?;
    Ok(Json(ApiResponse::ok("Event retrieved", found)))
}

/// PUT /api/v1/event/update/{id}
pub async fn update(
    Authorized(user, _): Authorized<policy::UpdateEvent>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
    ApiJson(input): ApiJson<UpdateEvent>,
) -> AppResult<Json<ApiResponse<Event>>> {
    let updated = event::update(&state, &user, id, input).await?;
    Ok(Json(ApiResponse::ok("Event updated", updated)))
}

/// PUT /api/v1/event/etat/{id}
pub async fn set_state(
    Authorized(user, _): Authorized<policy::SetEventState>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
    ApiJson(input): ApiJson<UpdateEventState>,
) -> AppResult<Json<ApiResponse<Event>>> {
    let updated = event::set_state(&state, &user, id, &input.state).await?;
    Ok(Json(ApiResponse::ok("Event state updated", updated)))
}

/// DELETE /api/v1/event/delete/{id}
pub async fn delete(
    Authorized(user, _): Authorized<policy::DeleteEvent>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<ApiResponse<CascadeSummary>>> {
    let summary = event::delete(&state, &user, id).await?;
    Ok(Json(ApiResponse::ok("Event deleted", summary)))
}
