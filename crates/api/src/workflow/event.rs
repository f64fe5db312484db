//! Event directory operations: creation, editing, moderation, cascade deletion.

use eventhub_core::error::CoreError;
use eventhub_core::event::{
    check_capacity_change, check_state_transition, parse_state, validate_new_event,
};
use eventhub_core::status::EventState;
use eventhub_core::types::DbId;
use eventhub_db::models::event::{CascadeSummary, CreateEvent, Event, UpdateEvent};
use eventhub_db::repositories::{EventRepo, RegistrationRepo};
use validator::Validate;

use super::{ensure_manages, load_event};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Create an event owned by the caller, pending moderation.
pub async fn create(state: &AppState, actor: &AuthUser, input: CreateEvent) -> AppResult<Event> {
    input.validate()?;
    validate_new_event(
        input.starts_at,
        input.ends_at,
        input.capacity,
        input.price_cents,
    )?;

    let event = EventRepo::create(&state.pool, actor.user_id, &input).await?;
    tracing::info!(
        event_id = event.id,
        organizer_id = actor.user_id,
        capacity = event.capacity,
        price_cents = event.price_cents,
        "Event created"
    );
    Ok(event)
}

/// Edit an event the caller manages.
///
/// The event row is locked like an admission, so a registration cannot slip
/// in between counting the taken seats and lowering the capacity.
pub async fn update(
    state: &AppState,
    actor: &AuthUser,
    id: DbId,
    input: UpdateEvent,
) -> AppResult<Event> {
    input.validate()?;

    let mut tx = state.pool.begin().await?;

    let current = EventRepo::lock_for_update(&mut tx, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Event", id }))?;
    ensure_manages(actor, &current)?;

    let merged = input.apply(current);
    validate_new_event(
        merged.starts_at,
        merged.ends_at,
        merged.capacity,
        merged.price_cents,
    )?;
    let active = RegistrationRepo::count_active(&mut tx, id).await?;
    check_capacity_change(merged.capacity, active)?;

    let updated = EventRepo::update_details(&mut tx, &merged)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Event", id }))?;
    tx.commit().await?;

    tracing::info!(
        event_id = id,
        actor_id = actor.user_id,
        capacity = updated.capacity,
        active_registrations = active,
        "Event updated"
    );
    Ok(updated)
}

pub async fn get(state: &AppState, id: DbId) -> AppResult<Event> {
    load_event(&state.pool, id).await
}

/// Public listing: accepted events only.
pub async fn list_accepted(state: &AppState) -> AppResult<Vec<Event>> {
    Ok(EventRepo::list_by_state(&state.pool, EventState::Accepted).await?)
}

pub async fn list_mine(state: &AppState, actor: &AuthUser) -> AppResult<Vec<Event>> {
    Ok(EventRepo::list_by_organizer(&state.pool, actor.user_id).await?)
}

/// Moderate an event (admin only, enforced by the route policy).
pub async fn set_state(
    state: &AppState,
    actor: &AuthUser,
    id: DbId,
    requested: &str,
) -> AppResult<Event> {
    let next = parse_state(requested)?;
    let event = load_event(&state.pool, id).await?;
    check_state_transition(event.state, next)?;

    let updated = EventRepo::update_state(&state.pool, id, next)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Event", id }))?;

    tracing::info!(
        event_id = id,
        admin_id = actor.user_id,
        state = %updated.state,
        "Event state changed"
    );
    Ok(updated)
}

/// Delete an event with its registrations and payments, atomically.
pub async fn delete(state: &AppState, actor: &AuthUser, id: DbId) -> AppResult<CascadeSummary> {
    let event = load_event(&state.pool, id).await?;
    ensure_manages(actor, &event)?;

    let summary = match EventRepo::delete_cascade(&state.pool, id).await {
        Ok(Some(summary)) => summary,
        Ok(None) => {
            return Err(AppError::Core(CoreError::NotFound { entity: "Event", id }))
        }
        Err(e) => {
            tracing::error!(event_id = id, error = %e, "Event cascade delete failed, rolled back");
            return Err(e.into());
        }
    };

    tracing::info!(
        event_id = id,
        actor_id = actor.user_id,
        payments_deleted = summary.payments_deleted,
        registrations_deleted = summary.registrations_deleted,
        "Event deleted"
    );
    Ok(summary)
}
