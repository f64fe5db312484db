//! Payment submission and review rules.
//!
//! Payments are manual proof-of-payment submissions reviewed by the event's
//! manager; nothing here talks to a payment gateway.

use rand::Rng;

use crate::error::CoreError;
use crate::status::{PaymentStatus, RegistrationStatus};
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Bank transfer; a receipt must be uploaded.
pub const METHOD_BANK_TRANSFER: &str = "bank_transfer";

/// Cash handed to the organizer.
pub const METHOD_CASH: &str = "cash";

/// Mobile money transfer.
pub const METHOD_MOBILE_MONEY: &str = "mobile_money";

/// All accepted payment methods.
pub const VALID_METHODS: &[&str] = &[METHOD_BANK_TRANSFER, METHOD_CASH, METHOD_MOBILE_MONEY];

/// Prefix of every payment reference.
pub const REFERENCE_PREFIX: &str = "PAY";

/// Number of random characters in a payment reference.
pub const REFERENCE_RANDOM_LEN: usize = 8;

/// How many fresh references to try when the unique constraint collides.
pub const MAX_REFERENCE_ATTEMPTS: usize = 3;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Business-rule failures of payment submission and review.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PaymentRuleError {
    #[error("Invalid payment method '{0}'. Must be one of: bank_transfer, cash, mobile_money")]
    InvalidMethod(String),

    #[error("A cancelled registration cannot be paid")]
    RegistrationCancelled,

    #[error("A payment was already submitted for this event")]
    DuplicatePayment,

    #[error("A proof of payment is required for {0}")]
    MissingProof(String),

    #[error("Invalid review decision '{0}'. Must be 'approved' or 'rejected'")]
    InvalidDecision(String),
}

impl From<PaymentRuleError> for CoreError {
    fn from(err: PaymentRuleError) -> Self {
        match err {
            PaymentRuleError::DuplicatePayment => CoreError::Conflict(err.to_string()),
            other => CoreError::Validation(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

/// Validate a payment method name and return it trimmed.
pub fn validate_method(method: &str) -> Result<&str, PaymentRuleError> {
    let method = method.trim();
    if VALID_METHODS.contains(&method) {
        Ok(method)
    } else {
        Err(PaymentRuleError::InvalidMethod(method.to_string()))
    }
}

/// Whether the method mandates an uploaded proof artifact.
pub fn method_requires_proof(method: &str) -> bool {
    method == METHOD_BANK_TRANSFER
}

/// Facts gathered before inserting a payment.
#[derive(Debug, Clone, Copy)]
pub struct SubmissionFacts<'a> {
    pub registration_status: RegistrationStatus,
    pub payment_exists: bool,
    pub method: &'a str,
    pub has_proof: bool,
}

/// Decide whether a payment may be submitted. Ownership and existence of the
/// registration and its event are checked by the caller beforehand.
pub fn check_submission(facts: &SubmissionFacts<'_>) -> Result<(), PaymentRuleError> {
    if facts.registration_status == RegistrationStatus::Cancelled {
        return Err(PaymentRuleError::RegistrationCancelled);
    }
    if facts.payment_exists {
        return Err(PaymentRuleError::DuplicatePayment);
    }
    if method_requires_proof(facts.method) && !facts.has_proof {
        return Err(PaymentRuleError::MissingProof(facts.method.to_string()));
    }
    Ok(())
}

/// Generate a human-readable payment reference such as `PAY-20261016-7F3K9Q2A`.
///
/// Uniqueness is enforced by the `uq_payments_reference` constraint; callers
/// retry with a fresh reference on collision.
pub fn generate_reference(now: Timestamp) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(REFERENCE_RANDOM_LEN)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect();
    format!("{REFERENCE_PREFIX}-{}-{suffix}", now.format("%Y%m%d"))
}

// ---------------------------------------------------------------------------
// Review
// ---------------------------------------------------------------------------

/// Parse a manager's review decision. Only terminal statuses are accepted.
pub fn parse_decision(decision: &str) -> Result<PaymentStatus, PaymentRuleError> {
    match PaymentStatus::from_name(decision.trim()) {
        Some(status @ (PaymentStatus::Approved | PaymentStatus::Rejected)) => Ok(status),
        _ => Err(PaymentRuleError::InvalidDecision(decision.to_string())),
    }
}
