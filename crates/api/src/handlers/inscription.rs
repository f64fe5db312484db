//! Handlers for the `/inscription` resource.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use eventhub_core::types::DbId;
use eventhub_db::models::registration::{
    CreateRegistrationRequest, Registration, RegistrationOverview, RemoveRegistrationRequest,
};

use crate::error::AppResult;
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::rbac::{policy, Authorized};
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::workflow::registration;

/// POST /api/v1/inscription/creeinscription
pub async fn create(
    Authorized(user, _): Authorized<policy::CreateRegistration>,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateRegistrationRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Registration>>)> {
    let created = registration::create(&state, &user, input).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Registration created", created)),
    ))
}

/// GET /api/v1/inscription/get
pub async fn list_managed(
    Authorized(user, _): Authorized<policy::ListManagedRegistrations>,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<RegistrationOverview>>>> {
    let items = registration::list_for_manager(&state, &user).await?;
    Ok(Json(ApiResponse::ok("Registrations retrieved", items)))
}

/// GET /api/v1/inscription/getparticipant
pub async fn list_own(
    Authorized(user, _): Authorized<policy::ListOwnRegistrations>,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<RegistrationOverview>>>> {
    let items = registration::list_for_participant(&state, &user).await?;
    Ok(Json(ApiResponse::ok("Registrations retrieved", items)))
}

/// GET /api/v1/inscription/{id}
pub async fn get_by_id(
    Authorized(user, _): Authorized<policy::ViewRegistration>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<ApiResponse<Registration>>> {
    let found = registration::get(&state, &user, id).await?;
    Ok(Json(ApiResponse::ok("Registration retrieved", found)))
}

/// PUT /api/v1/inscription/valider/{id}
pub async fn confirm(
    Authorized(user, _): Authorized<policy::ConfirmRegistration>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<ApiResponse<Registration>>> {
    let confirmed = registration::confirm(&state, &user, id).await?;
    Ok(Json(ApiResponse::ok("Registration validated", confirmed)))
}

/// PUT /api/v1/inscription/annulee/{id}
pub async fn cancel(
    Authorized(user, _): Authorized<policy::CancelRegistration>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<ApiResponse<Registration>>> {
    let cancelled = registration::cancel(&state, &user, id).await?;
    Ok(Json(ApiResponse::ok("Registration cancelled", cancelled)))
}

/// DELETE /api/v1/inscription/annuleeinscription/{id}
pub async fn delete_own(
    Authorized(user, _): Authorized<policy::SelfDeleteRegistration>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
) -> AppResult<Json<ApiResponse<()>>> {
    registration::delete_own(&state, &user, id).await?;
    Ok(Json(ApiResponse::message("Registration deleted")))
}

/// DELETE /api/v1/inscription/deleteinscription/{id}
///
/// Body: `{"reason": "payment_not_received"}`.
pub async fn remove(
    Authorized(user, _): Authorized<policy::RemoveRegistration>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
    body: Result<Option<Json<RemoveRegistrationRequest>>, JsonRejection>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let input = body?.map(|Json(b)| b).unwrap_or_default();
    let reason = registration::remove(&state, &user, id, input.reason.as_deref()).await?;
    Ok(Json(ApiResponse::ok(
        "Registration removed",
        serde_json::json!({ "id": id, "reason": reason, "reason_label": reason.label() }),
    )))
}
