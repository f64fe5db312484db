//! Declarative authorization policy.
//!
//! Every routed operation is listed once in [`POLICY`] together with the
//! roles allowed to invoke it. The API layer evaluates the table before any
//! handler logic runs; resource ownership (which event a manager owns, which
//! registration a participant owns) is checked afterwards by the workflow via
//! [`ensure_event_manager`] and [`ensure_owner`].

use crate::error::CoreError;
use crate::roles::{ROLE_ADMIN, ROLE_MANAGER, ROLE_PARTICIPANT};
use crate::types::DbId;

/// Every operation exposed over HTTP that requires an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateRegistration,
    ListManagedRegistrations,
    ListOwnRegistrations,
    ViewRegistration,
    ConfirmRegistration,
    CancelRegistration,
    SelfDeleteRegistration,
    RemoveRegistration,
    SubmitPayment,
    ListManagedPayments,
    ReviewPayment,
    ViewRegistrationPayment,
    CreateEvent,
    UpdateEvent,
    ViewEvent,
    ListOwnEvents,
    SetEventState,
    DeleteEvent,
}

const MANAGERS: &[&str] = &[ROLE_MANAGER, ROLE_ADMIN];
const PARTICIPANTS: &[&str] = &[ROLE_PARTICIPANT];
const ADMINS: &[&str] = &[ROLE_ADMIN];
const ANYONE: &[&str] = &[ROLE_PARTICIPANT, ROLE_MANAGER, ROLE_ADMIN];
const CANCELLERS: &[&str] = &[ROLE_MANAGER, ROLE_ADMIN, ROLE_PARTICIPANT];

/// Operation -> allowed role names.
pub const POLICY: &[(Operation, &[&str])] = &[
    (Operation::CreateRegistration, PARTICIPANTS),
    (Operation::ListManagedRegistrations, MANAGERS),
    (Operation::ListOwnRegistrations, PARTICIPANTS),
    (Operation::ViewRegistration, ANYONE),
    (Operation::ConfirmRegistration, MANAGERS),
    (Operation::CancelRegistration, CANCELLERS),
    (Operation::SelfDeleteRegistration, PARTICIPANTS),
    (Operation::RemoveRegistration, MANAGERS),
    (Operation::SubmitPayment, PARTICIPANTS),
    (Operation::ListManagedPayments, MANAGERS),
    (Operation::ReviewPayment, MANAGERS),
    (Operation::ViewRegistrationPayment, MANAGERS),
    (Operation::CreateEvent, MANAGERS),
    (Operation::UpdateEvent, MANAGERS),
    (Operation::ViewEvent, ANYONE),
    (Operation::ListOwnEvents, MANAGERS),
    (Operation::SetEventState, ADMINS),
    (Operation::DeleteEvent, MANAGERS),
];

impl Operation {
    /// Roles allowed to invoke this operation. Empty if the operation is
    /// missing from [`POLICY`], which denies everyone.
    pub fn allowed_roles(self) -> &'static [&'static str] {
        POLICY
            .iter()
            .find(|(op, _)| *op == self)
            .map(|(_, roles)| *roles)
            .unwrap_or(&[])
    }
}

/// Check `role` against the policy table for `operation`.
pub fn authorize(operation: Operation, role: &str) -> Result<(), CoreError> {
    let allowed = operation.allowed_roles();
    if allowed.contains(&role) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!(
            "Role '{role}' may not perform this action. Allowed: {}",
            allowed.join(", ")
        )))
    }
}

/// Require that the caller manages the event (organizer), or is an admin.
pub fn ensure_event_manager(
    role: &str,
    user_id: DbId,
    organizer_id: DbId,
) -> Result<(), CoreError> {
    if role == ROLE_ADMIN || user_id == organizer_id {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "You do not manage this event".to_string(),
        ))
    }
}

/// Require that the caller owns a participant-side resource.
pub fn ensure_owner(user_id: DbId, owner_id: DbId, what: &str) -> Result<(), CoreError> {
    if user_id == owner_id {
        Ok(())
    } else {
        Err(CoreError::Forbidden(format!(
            "You are not allowed to act on this {what}"
        )))
    }
}
