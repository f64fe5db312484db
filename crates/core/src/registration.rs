//! Registration rules: admission, status transitions, payment gate and
//! manager removal reasons.
//!
//! The functions here are pure. The workflow layer gathers the facts from
//! storage (inside the transaction that will perform the write) and asks
//! these functions whether the transition is allowed.

use serde::Serialize;

use crate::error::CoreError;
use crate::status::{PaymentStatus, RegistrationStatus};
use crate::types::Cents;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Business-rule failures of the registration lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationRuleError {
    #[error("Capacity exceeded: the event is full")]
    CapacityExceeded,

    #[error("You are already registered for this event")]
    AlreadyRegistered,

    #[error("A phone number is required")]
    MissingPhone,

    #[error("This registration is already validated")]
    AlreadyConfirmed,

    #[error("A cancelled registration cannot be validated")]
    ConfirmCancelled,

    #[error("No payment found for this registration")]
    PaymentMissing,

    #[error("The payment for this registration was rejected")]
    PaymentRejected,

    #[error("The payment is not yet validated; the registration cannot be validated")]
    AwaitingPayment,

    #[error("This registration is already cancelled")]
    AlreadyCancelled,

    #[error("A validated registration cannot be cancelled")]
    CancelConfirmed,

    #[error("A validated registration cannot be deleted by the participant")]
    DeleteConfirmed,

    #[error("Invalid or missing removal reason '{0}'")]
    InvalidRemovalReason(String),
}

impl From<RegistrationRuleError> for CoreError {
    fn from(err: RegistrationRuleError) -> Self {
        match err {
            RegistrationRuleError::AlreadyRegistered => CoreError::Conflict(err.to_string()),
            other => CoreError::Validation(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Contact snapshot
// ---------------------------------------------------------------------------

/// Public contact details copied into a registration (and later its payment)
/// at creation time. Never re-derived from the live user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactSnapshot {
    pub display_name: String,
    pub email: String,
    pub phone: String,
}

impl ContactSnapshot {
    /// Capture a snapshot from the user directory entry and request input.
    ///
    /// A blank `requested_name` falls back to the directory name.
    pub fn capture(
        directory_name: &str,
        directory_email: &str,
        requested_name: Option<&str>,
        phone: &str,
    ) -> Self {
        let display_name = requested_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(directory_name)
            .to_string();

        Self {
            display_name,
            email: directory_email.to_string(),
            phone: phone.trim().to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Admission
// ---------------------------------------------------------------------------

/// Facts read from storage, under the event row lock, before inserting a
/// registration.
#[derive(Debug, Clone, Copy)]
pub struct AdmissionFacts {
    /// Event capacity (always positive).
    pub capacity: i32,
    /// Registrations for the event that count toward capacity.
    pub active_registrations: i64,
    /// Whether the caller already holds a registration (any status).
    pub already_registered: bool,
}

/// Whether a registration in `status` occupies a seat.
///
/// Pending and confirmed registrations count; cancelled ones free the seat.
pub fn counts_toward_capacity(status: RegistrationStatus) -> bool {
    status != RegistrationStatus::Cancelled
}

/// Decide whether a registration may be created.
///
/// The event's existence is checked first by the caller. The remaining
/// checks run in fixed order, first failure wins: capacity, duplicate, phone.
/// Returns the trimmed phone number on success.
pub fn check_admission(
    facts: &AdmissionFacts,
    phone: Option<&str>,
) -> Result<String, RegistrationRuleError> {
    if facts.active_registrations >= i64::from(facts.capacity) {
        return Err(RegistrationRuleError::CapacityExceeded);
    }
    if facts.already_registered {
        return Err(RegistrationRuleError::AlreadyRegistered);
    }
    match phone.map(str::trim) {
        Some(p) if !p.is_empty() => Ok(p.to_string()),
        _ => Err(RegistrationRuleError::MissingPhone),
    }
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

/// Whether a priced event requires an approved payment before confirmation.
pub fn requires_payment(price_cents: Cents) -> bool {
    price_cents > 0
}

/// Gate confirmation on the current payment status.
///
/// `payment` must be freshly read from storage, never taken from the caller.
pub fn check_payment_gate(
    price_cents: Cents,
    payment: Option<PaymentStatus>,
) -> Result<(), RegistrationRuleError> {
    if !requires_payment(price_cents) {
        return Ok(());
    }
    match payment {
        None => Err(RegistrationRuleError::PaymentMissing),
        Some(PaymentStatus::Rejected) => Err(RegistrationRuleError::PaymentRejected),
        Some(PaymentStatus::Pending) => Err(RegistrationRuleError::AwaitingPayment),
        Some(PaymentStatus::Approved) => Ok(()),
    }
}

/// Check whether a registration may move to `confirmed`.
///
/// Status guards come before the payment gate, so a second confirmation is
/// reported as "already validated" regardless of payment state.
pub fn check_confirm(
    status: RegistrationStatus,
    price_cents: Cents,
    payment: Option<PaymentStatus>,
) -> Result<(), RegistrationRuleError> {
    match status {
        RegistrationStatus::Confirmed => Err(RegistrationRuleError::AlreadyConfirmed),
        RegistrationStatus::Cancelled => Err(RegistrationRuleError::ConfirmCancelled),
        RegistrationStatus::Pending => check_payment_gate(price_cents, payment),
    }
}

/// Check whether a registration may move to `cancelled`.
pub fn check_cancel(status: RegistrationStatus) -> Result<(), RegistrationRuleError> {
    match status {
        RegistrationStatus::Cancelled => Err(RegistrationRuleError::AlreadyCancelled),
        RegistrationStatus::Confirmed => Err(RegistrationRuleError::CancelConfirmed),
        RegistrationStatus::Pending => Ok(()),
    }
}

/// Check whether the owning participant may delete the registration.
///
/// Mirrors [`check_cancel`]: a confirmed seat cannot be dropped through the
/// participant path. Pending and cancelled registrations may be deleted.
pub fn check_self_delete(status: RegistrationStatus) -> Result<(), RegistrationRuleError> {
    match status {
        RegistrationStatus::Confirmed => Err(RegistrationRuleError::DeleteConfirmed),
        RegistrationStatus::Pending | RegistrationStatus::Cancelled => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Removal reasons
// ---------------------------------------------------------------------------

/// Reason a manager gives when removing a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalReason {
    PaymentNotReceived,
    ParticipantRequest,
    DataEntryError,
    CapacityReached,
    TechnicalIssue,
    Other,
}

impl RemovalReason {
    pub const ALL: &'static [RemovalReason] = &[
        RemovalReason::PaymentNotReceived,
        RemovalReason::ParticipantRequest,
        RemovalReason::DataEntryError,
        RemovalReason::CapacityReached,
        RemovalReason::TechnicalIssue,
        RemovalReason::Other,
    ];

    /// Machine code accepted in request bodies.
    pub fn code(self) -> &'static str {
        match self {
            RemovalReason::PaymentNotReceived => "payment_not_received",
            RemovalReason::ParticipantRequest => "participant_request",
            RemovalReason::DataEntryError => "data_entry_error",
            RemovalReason::CapacityReached => "capacity_reached",
            RemovalReason::TechnicalIssue => "technical_issue",
            RemovalReason::Other => "other",
        }
    }

    /// Human-readable label used in notifications.
    pub fn label(self) -> &'static str {
        match self {
            RemovalReason::PaymentNotReceived => "Payment not received",
            RemovalReason::ParticipantRequest => "Participant request",
            RemovalReason::DataEntryError => "Data entry error",
            RemovalReason::CapacityReached => "Maximum capacity reached",
            RemovalReason::TechnicalIssue => "Technical issue",
            RemovalReason::Other => "Other",
        }
    }

    /// Parse a reason code. Missing or unknown codes are rejected.
    pub fn parse(code: Option<&str>) -> Result<Self, RegistrationRuleError> {
        let code = code.map(str::trim).unwrap_or_default();
        Self::ALL
            .iter()
            .copied()
            .find(|r| r.code() == code)
            .ok_or_else(|| RegistrationRuleError::InvalidRemovalReason(code.to_string()))
    }
}
