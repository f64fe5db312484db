//! Handlers for the `/payment` resource.

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use eventhub_core::types::DbId;
use eventhub_db::models::payment::{Payment, PaymentWithEvent, ReviewPaymentRequest};

use crate::error::{AppError, AppResult};
use crate::extract::{ApiJson, ApiMultipart, ApiPath};
use crate::middleware::rbac::{policy, Authorized};
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::workflow::payment::{self, PaymentSubmission, ProofUpload};

/// Read the multipart form into a [`PaymentSubmission`].
///
/// Text fields: `registration_id`, `payment_method`, `remark`. File: `proof`.
/// Unknown fields are ignored.
async fn read_submission(mut multipart: Multipart) -> AppResult<PaymentSubmission> {
    let mut submission = PaymentSubmission::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "proof" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                if !data.is_empty() {
                    submission.proof = Some(ProofUpload {
                        file_name,
                        data: data.to_vec(),
                    });
                }
            }
            "registration_id" | "payment_method" | "remark" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                match name.as_str() {
                    "registration_id" => {
                        let id = text.trim().parse::<DbId>().map_err(|_| {
                            AppError::BadRequest(format!("Invalid registration_id '{text}'"))
                        })?;
                        submission.registration_id = Some(id);
                    }
                    "payment_method" => submission.payment_method = Some(text),
                    _ => submission.remark = Some(text),
                }
            }
            _ => {}
        }
    }

    Ok(submission)
}

/// POST /api/v1/payment/create
pub async fn create(
    Authorized(user, _): Authorized<policy::SubmitPayment>,
    State(state): State<AppState>,
    ApiMultipart(multipart): ApiMultipart,
) -> AppResult<(StatusCode, Json<ApiResponse<Payment>>)> {
    let submission = read_submission(multipart).await?;
    let created = payment::submit(&state, &user, submission).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Payment submitted", created)),
    ))
}

/// GET /api/v1/payment/get
pub async fn list_managed(
    Authorized(user, _): Authorized<policy::ListManagedPayments>,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<PaymentWithEvent>>>> {
    let items = payment::list_for_manager(&state, &user).await?;
    Ok(Json(ApiResponse::ok("Payments retrieved", items)))
}

/// PUT|PATCH /api/v1/payment/valider/{id}
pub async fn review(
    Authorized(user, _): Authorized<policy::ReviewPayment>,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<DbId>,
    ApiJson(input): ApiJson<ReviewPaymentRequest>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    let reviewed = payment::review(&state, &user, id, &input.status).await?;
    let message = format!("Payment {}", reviewed.status);
    Ok(Json(ApiResponse::ok(message, reviewed)))
}

/// GET /api/v1/payment/get/{inscription_id}
pub async fn get_by_registration(
    Authorized(user, _): Authorized<policy::ViewRegistrationPayment>,
    State(state): State<AppState>,
    ApiPath(registration_id): ApiPath<DbId>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    let found = payment::get_by_registration(&state, &user, registration_id).await?;
    Ok(Json(ApiResponse::ok("Payment retrieved", found)))
}
