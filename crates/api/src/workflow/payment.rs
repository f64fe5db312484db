//! Payment submission and manager review.

use eventhub_core::authorization::ensure_owner;
use eventhub_core::error::CoreError;
use eventhub_core::payment::{
    check_submission, generate_reference, parse_decision, validate_method, SubmissionFacts,
    MAX_REFERENCE_ATTEMPTS,
};
use eventhub_core::status::PaymentStatus;
use eventhub_core::types::DbId;
use eventhub_db::models::payment::{NewPayment, Payment, PaymentWithEvent};
use eventhub_db::repositories::PaymentRepo;
use eventhub_events::{Notification, NotificationKind};

use super::registration::load_registration;
use super::{ensure_manages, load_event, organizer_scope};
use crate::error::{is_unique_violation, AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// An uploaded proof-of-payment file.
#[derive(Debug, Clone)]
pub struct ProofUpload {
    pub file_name: String,
    pub data: Vec<u8>,
}

/// Parsed multipart submission. Every field is optional at this level so the
/// checks can run in their documented order.
#[derive(Debug, Clone, Default)]
pub struct PaymentSubmission {
    pub registration_id: Option<DbId>,
    pub payment_method: Option<String>,
    pub remark: Option<String>,
    pub proof: Option<ProofUpload>,
}

/// Submit a payment for one of the caller's registrations.
pub async fn submit(
    state: &AppState,
    actor: &AuthUser,
    submission: PaymentSubmission,
) -> AppResult<Payment> {
    let method = validate_method(submission.payment_method.as_deref().unwrap_or(""))?.to_string();

    let registration_id = submission
        .registration_id
        .ok_or_else(|| AppError::BadRequest("registration_id is required".into()))?;
    let registration = load_registration(state, registration_id).await?;
    ensure_owner(actor.user_id, registration.user_id, "registration")?;
    let event = load_event(&state.pool, registration.event_id).await?;

    let payment_exists =
        PaymentRepo::exists_for_user_event(&state.pool, actor.user_id, event.id).await?;
    check_submission(&SubmissionFacts {
        registration_status: registration.status,
        payment_exists,
        method: &method,
        has_proof: submission.proof.is_some(),
    })?;

    let proof_path = match &submission.proof {
        Some(proof) => Some(state.proofs.store(&proof.file_name, &proof.data).await?),
        None => None,
    };

    let mut input = NewPayment {
        user_id: actor.user_id,
        event_id: event.id,
        registration_id: registration.id,
        contact: registration.contact(),
        amount_cents: event.price_cents,
        reference: String::new(),
        payment_method: method,
        proof_path,
        remark: submission.remark.filter(|r| !r.trim().is_empty()),
    };

    let payment = match insert_with_fresh_reference(state, &mut input).await {
        Ok(payment) => payment,
        Err(e) => {
            if let Some(path) = &input.proof_path {
                if let Err(cleanup) = state.proofs.remove(path).await {
                    tracing::warn!(error = %cleanup, path = %path, "Failed to remove orphaned proof");
                }
            }
            return Err(e);
        }
    };

    tracing::info!(
        payment_id = payment.id,
        registration_id = registration.id,
        event_id = event.id,
        reference = %payment.reference,
        method = %payment.payment_method,
        "Payment submitted"
    );

    Ok(payment)
}

/// Insert the payment, drawing a new reference whenever the previous one
/// collides with an existing row.
async fn insert_with_fresh_reference(
    state: &AppState,
    input: &mut NewPayment,
) -> AppResult<Payment> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        input.reference = generate_reference(chrono::Utc::now());
        match PaymentRepo::insert(&state.pool, input).await {
            Ok(payment) => return Ok(payment),
            Err(e)
                if attempt < MAX_REFERENCE_ATTEMPTS
                    && is_unique_violation(&e, "uq_payments_reference") =>
            {
                tracing::warn!(attempt, reference = %input.reference, "Payment reference collision");
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Approve or reject a payment for an event the caller manages.
pub async fn review(
    state: &AppState,
    actor: &AuthUser,
    id: DbId,
    decision: &str,
) -> AppResult<Payment> {
    let payment = PaymentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Payment",
            id,
        }))?;
    let event = load_event(&state.pool, payment.event_id).await?;
    ensure_manages(actor, &event)?;
    let status = parse_decision(decision)?;

    let reviewed = PaymentRepo::set_status(&state.pool, id, status)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Payment",
            id,
        }))?;

    tracing::info!(
        payment_id = id,
        registration_id = reviewed.registration_id,
        event_id = event.id,
        manager_id = actor.user_id,
        status = %status,
        "Payment reviewed"
    );

    let kind = match status {
        PaymentStatus::Approved => NotificationKind::PaymentValidated,
        _ => NotificationKind::PaymentRejected,
    };
    state.bus.publish(
        Notification::new(kind, &reviewed.contact(), &event.title)
            .with_registration(reviewed.registration_id)
            .with_reference(reviewed.reference.clone()),
    );

    Ok(reviewed)
}

/// Payments for the events the caller manages (all events for admins).
pub async fn list_for_manager(
    state: &AppState,
    actor: &AuthUser,
) -> AppResult<Vec<PaymentWithEvent>> {
    Ok(PaymentRepo::list_for_organizer(&state.pool, organizer_scope(actor)).await?)
}

/// The payment attached to a registration of an event the caller manages.
pub async fn get_by_registration(
    state: &AppState,
    actor: &AuthUser,
    registration_id: DbId,
) -> AppResult<Payment> {
    let registration = load_registration(state, registration_id).await?;
    let event = load_event(&state.pool, registration.event_id).await?;
    ensure_manages(actor, &event)?;

    PaymentRepo::find_by_registration(&state.pool, registration_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Payment for registration",
            id: registration_id,
        }))
}
