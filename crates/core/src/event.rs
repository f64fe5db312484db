//! Event directory rules: creation validation and moderation transitions.

use crate::error::CoreError;
use crate::status::EventState;
use crate::types::{Cents, Timestamp};

/// Validate the cross-field constraints of a new event.
///
/// Field-level checks (lengths, ranges) are declared on the request DTO; this
/// covers what a single field cannot express.
pub fn validate_new_event(
    starts_at: Timestamp,
    ends_at: Timestamp,
    capacity: i32,
    price_cents: Cents,
) -> Result<(), CoreError> {
    if ends_at <= starts_at {
        return Err(CoreError::Validation(
            "The end date must be after the start date".to_string(),
        ));
    }
    if capacity <= 0 {
        return Err(CoreError::Validation(
            "Capacity must be a positive integer".to_string(),
        ));
    }
    if price_cents < 0 {
        return Err(CoreError::Validation("Price cannot be negative".to_string()));
    }
    Ok(())
}

/// Refuse to shrink an event below the seats it has already handed out.
pub fn check_capacity_change(capacity: i32, active: i64) -> Result<(), CoreError> {
    if i64::from(capacity) < active {
        return Err(CoreError::Validation(format!(
            "Capacity cannot be lower than the {active} seats already taken"
        )));
    }
    Ok(())
}

/// Parse the requested moderation state.
pub fn parse_state(state: &str) -> Result<EventState, CoreError> {
    EventState::from_name(state.trim()).ok_or_else(|| {
        CoreError::Validation(format!(
            "Invalid state '{state}'. Must be one of: pending, accepted, rejected"
        ))
    })
}

/// Check a moderation transition. Accepting an already accepted event is
/// rejected; every other transition is allowed.
pub fn check_state_transition(current: EventState, next: EventState) -> Result<(), CoreError> {
    if current == EventState::Accepted && next == EventState::Accepted {
        return Err(CoreError::Validation(
            "This event is already accepted".to_string(),
        ));
    }
    Ok(())
}
