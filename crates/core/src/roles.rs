//! Well-known role name constants.
//!
//! These must match the seed data in `20261001000001_create_roles_table.sql`.

/// Platform administrator: moderates events and may act on any event.
pub const ROLE_ADMIN: &str = "admin";

/// Event organizer: owns events and processes their registrations/payments.
pub const ROLE_MANAGER: &str = "manager";

/// Attendee: registers for events and submits payments.
pub const ROLE_PARTICIPANT: &str = "participant";

/// All valid role names.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_MANAGER, ROLE_PARTICIPANT];

/// Returns `true` if `role` is one of [`VALID_ROLES`].
pub fn is_valid_role(role: &str) -> bool {
    VALID_ROLES.contains(&role)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_roles_are_valid() {
        assert!(is_valid_role("admin"));
        assert!(is_valid_role("manager"));
        assert!(is_valid_role("participant"));
    }

    #[test]
    fn unknown_role_is_invalid() {
        assert!(!is_valid_role("gestionnaire"));
        assert!(!is_valid_role(""));
    }
}
