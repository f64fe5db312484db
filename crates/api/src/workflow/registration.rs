//! Registration lifecycle: admission, confirmation, cancellation, removal.

use eventhub_core::authorization::ensure_owner;
use eventhub_core::error::CoreError;
use eventhub_core::registration::{
    check_admission, check_cancel, check_confirm, check_self_delete, AdmissionFacts,
    ContactSnapshot, RemovalReason,
};
use eventhub_core::roles::ROLE_PARTICIPANT;
use eventhub_core::types::DbId;
use eventhub_db::models::registration::{
    CreateRegistrationRequest, NewRegistration, Registration, RegistrationOverview,
};
use eventhub_db::repositories::{EventRepo, PaymentRepo, RegistrationRepo, UserRepo};
use eventhub_events::{Notification, NotificationKind};
use validator::Validate;

use super::{ensure_manages, load_event, organizer_scope};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Load a registration or fail with 404.
pub(crate) async fn load_registration(state: &AppState, id: DbId) -> AppResult<Registration> {
    RegistrationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Registration",
            id,
        }))
}

/// Register the caller for an event.
///
/// The event row is locked for the duration of the transaction so that the
/// capacity count, the duplicate check and the insert are atomic with
/// respect to concurrent registrations for the same event.
pub async fn create(
    state: &AppState,
    actor: &AuthUser,
    input: CreateRegistrationRequest,
) -> AppResult<Registration> {
    input.validate()?;

    let user = UserRepo::find_by_id(&state.pool, actor.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized("Unknown user".into())))?;

    let mut tx = state.pool.begin().await?;

    let event = EventRepo::lock_for_update(&mut tx, input.event_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Event",
            id: input.event_id,
        }))?;

    let facts = AdmissionFacts {
        capacity: event.capacity,
        active_registrations: RegistrationRepo::count_active(&mut tx, event.id).await?,
        already_registered: RegistrationRepo::exists_for_user_event(&mut tx, user.id, event.id)
            .await?,
    };
    let phone = check_admission(&facts, input.phone.as_deref())?;

    let contact = ContactSnapshot::capture(
        &user.name,
        &user.email,
        input.display_name.as_deref(),
        &phone,
    );
    let registration = RegistrationRepo::insert(
        &mut tx,
        &NewRegistration {
            user_id: user.id,
            event_id: event.id,
            contact,
            note: input.note.filter(|n| !n.trim().is_empty()),
        },
    )
    .await?;

    tx.commit().await?;

    tracing::info!(
        registration_id = registration.id,
        event_id = event.id,
        user_id = user.id,
        seats_taken = facts.active_registrations + 1,
        capacity = event.capacity,
        "Registration created"
    );

    state.bus.publish(
        Notification::new(
            NotificationKind::RegistrationReceived,
            &registration.contact(),
            &event.title,
        )
        .with_registration(registration.id),
    );

    Ok(registration)
}

/// Fetch one registration: its owner, the event's manager, or an admin.
pub async fn get(state: &AppState, actor: &AuthUser, id: DbId) -> AppResult<Registration> {
    let registration = load_registration(state, id).await?;
    if actor.role == ROLE_PARTICIPANT {
        ensure_owner(actor.user_id, registration.user_id, "registration")?;
    } else {
        let event = load_event(&state.pool, registration.event_id).await?;
        ensure_manages(actor, &event)?;
    }
    Ok(registration)
}

/// Registrations for the events the caller manages (all events for admins).
pub async fn list_for_manager(
    state: &AppState,
    actor: &AuthUser,
) -> AppResult<Vec<RegistrationOverview>> {
    Ok(RegistrationRepo::list_for_organizer(&state.pool, organizer_scope(actor)).await?)
}

/// The caller's own registrations.
pub async fn list_for_participant(
    state: &AppState,
    actor: &AuthUser,
) -> AppResult<Vec<RegistrationOverview>> {
    Ok(RegistrationRepo::list_for_user(&state.pool, actor.user_id).await?)
}

/// Confirm a pending registration.
///
/// For a priced event the payment is re-read here and must be approved. The
/// payment row stays share-locked until the status change commits, so a
/// review landing in between cannot leave a confirmed registration behind a
/// rejected payment.
pub async fn confirm(state: &AppState, actor: &AuthUser, id: DbId) -> AppResult<Registration> {
    let registration = load_registration(state, id).await?;
    let event = load_event(&state.pool, registration.event_id).await?;
    ensure_manages(actor, &event)?;

    let mut tx = state.pool.begin().await?;

    let payment = PaymentRepo::find_by_registration_for_share(&mut tx, registration.id).await?;
    check_confirm(
        registration.status,
        event.price_cents,
        payment.as_ref().map(|p| p.status),
    )?;

    let confirmed = RegistrationRepo::mark_confirmed(&mut tx, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "The registration changed while it was being validated".into(),
            ))
        })?;

    tx.commit().await?;

    tracing::info!(
        registration_id = id,
        event_id = event.id,
        manager_id = actor.user_id,
        "Registration confirmed"
    );

    state.bus.publish(
        Notification::new(
            NotificationKind::RegistrationConfirmed,
            &confirmed.contact(),
            &event.title,
        )
        .with_registration(id),
    );

    Ok(confirmed)
}

/// Cancel a pending registration. The event's manager, an admin, or the
/// owning participant may cancel.
pub async fn cancel(state: &AppState, actor: &AuthUser, id: DbId) -> AppResult<Registration> {
    let registration = load_registration(state, id).await?;
    let event = load_event(&state.pool, registration.event_id).await?;
    if actor.role == ROLE_PARTICIPANT {
        ensure_owner(actor.user_id, registration.user_id, "registration")?;
    } else {
        ensure_manages(actor, &event)?;
    }

    check_cancel(registration.status)?;

    let cancelled = RegistrationRepo::mark_cancelled(&state.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "The registration changed while it was being cancelled".into(),
            ))
        })?;

    tracing::info!(
        registration_id = id,
        event_id = event.id,
        actor_id = actor.user_id,
        "Registration cancelled"
    );

    state.bus.publish(
        Notification::new(
            NotificationKind::RegistrationCancelled,
            &cancelled.contact(),
            &event.title,
        )
        .with_registration(id),
    );

    Ok(cancelled)
}

/// Participant deletes their own registration (and its payment).
pub async fn delete_own(state: &AppState, actor: &AuthUser, id: DbId) -> AppResult<()> {
    let registration = load_registration(state, id).await?;
    ensure_owner(actor.user_id, registration.user_id, "registration")?;
    check_self_delete(registration.status)?;

    if !RegistrationRepo::delete_unconfirmed(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "The registration changed while it was being deleted".into(),
        )));
    }

    tracing::info!(
        registration_id = id,
        event_id = registration.event_id,
        user_id = actor.user_id,
        "Registration deleted by participant"
    );
    Ok(())
}

/// Manager removes a registration for one of the fixed reasons and the
/// participant is told why.
pub async fn remove(
    state: &AppState,
    actor: &AuthUser,
    id: DbId,
    reason: Option<&str>,
) -> AppResult<RemovalReason> {
    let registration = load_registration(state, id).await?;
    let event = load_event(&state.pool, registration.event_id).await?;
    ensure_manages(actor, &event)?;
    let reason = RemovalReason::parse(reason)?;

    if !RegistrationRepo::delete_with_payment(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Registration",
            id,
        }));
    }

    tracing::info!(
        registration_id = id,
        event_id = event.id,
        manager_id = actor.user_id,
        reason = reason.code(),
        "Registration removed by manager"
    );

    state.bus.publish(
        Notification::new(
            NotificationKind::RegistrationRemoved,
            &registration.contact(),
            &event.title,
        )
        .with_registration(id)
        .with_reason(reason.label()),
    );

    Ok(reason)
}
