//! Registration ledger models.

use eventhub_core::registration::ContactSnapshot;
use eventhub_core::status::{PaymentStatus, RegistrationStatus, StatusId};
use eventhub_core::types::{Cents, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `registrations` table.
///
/// `display_name`, `email` and `phone` are the snapshot captured at
/// registration time.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Registration {
    pub id: DbId,
    pub user_id: DbId,
    pub event_id: DbId,
    pub display_name: String,
    pub email: String,
    pub phone: String,
    pub note: Option<String>,
    #[sqlx(try_from = "i16")]
    pub status: RegistrationStatus,
    pub registered_at: Timestamp,
    pub validated_at: Option<Timestamp>,
    pub cancelled_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Registration {
    /// The contact snapshot stored on this registration.
    pub fn contact(&self) -> ContactSnapshot {
        ContactSnapshot {
            display_name: self.display_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }
}

/// Insert DTO assembled by the workflow after admission succeeds.
#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub user_id: DbId,
    pub event_id: DbId,
    pub contact: ContactSnapshot,
    pub note: Option<String>,
}

/// Request body for `POST /inscription/creeinscription`.
///
/// `phone` is optional at the type level so that a missing value is reported
/// in the documented validation order instead of as a JSON parse error.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateRegistrationRequest {
    pub event_id: DbId,
    #[validate(length(max = 40))]
    pub phone: Option<String>,
    #[validate(length(max = 1000))]
    pub note: Option<String>,
    #[validate(length(max = 120))]
    pub display_name: Option<String>,
}

/// Request body for the manager removal endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoveRegistrationRequest {
    pub reason: Option<String>,
}

// ---------------------------------------------------------------------------
// Overview (joined) rows
// ---------------------------------------------------------------------------

/// Flat row joining a registration with its event and optional payment.
#[derive(Debug, Clone, FromRow)]
pub struct RegistrationOverviewRow {
    pub id: DbId,
    pub user_id: DbId,
    pub event_id: DbId,
    pub display_name: String,
    pub email: String,
    pub phone: String,
    pub note: Option<String>,
    pub status_id: StatusId,
    pub registered_at: Timestamp,
    pub validated_at: Option<Timestamp>,
    pub cancelled_at: Option<Timestamp>,
    pub event_title: String,
    pub event_starts_at: Timestamp,
    pub event_ends_at: Timestamp,
    pub event_price_cents: Cents,
    pub payment_id: Option<DbId>,
    pub payment_amount_cents: Option<Cents>,
    pub payment_reference: Option<String>,
    pub payment_status_id: Option<StatusId>,
    pub payment_submitted_at: Option<Timestamp>,
}

/// Event fields shown alongside a registration.
#[derive(Debug, Clone, Serialize)]
pub struct EventSummary {
    pub id: DbId,
    pub title: String,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    pub price_cents: Cents,
}

/// Payment fields shown alongside a registration.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentSummary {
    pub id: DbId,
    pub amount_cents: Cents,
    pub reference: String,
    pub status: Option<PaymentStatus>,
    pub submitted_at: Option<Timestamp>,
}

/// A registration as listed to managers and participants.
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationOverview {
    pub id: DbId,
    pub user_id: DbId,
    pub participant: ContactSnapshot,
    pub event: EventSummary,
    pub note: Option<String>,
    pub status: Option<RegistrationStatus>,
    pub registered_at: Timestamp,
    pub validated_at: Option<Timestamp>,
    pub cancelled_at: Option<Timestamp>,
    pub payment: Option<PaymentSummary>,
}

impl From<RegistrationOverviewRow> for RegistrationOverview {
    fn from(row: RegistrationOverviewRow) -> Self {
        let payment = match (row.payment_id, row.payment_reference) {
            (Some(id), Some(reference)) => Some(PaymentSummary {
                id,
                amount_cents: row.payment_amount_cents.unwrap_or_default(),
                reference,
                status: row.payment_status_id.and_then(PaymentStatus::from_id),
                submitted_at: row.payment_submitted_at,
            }),
            _ => None,
        };

        Self {
            id: row.id,
            user_id: row.user_id,
            participant: ContactSnapshot {
                display_name: row.display_name,
                email: row.email,
                phone: row.phone,
            },
            event: EventSummary {
                id: row.event_id,
                title: row.event_title,
                starts_at: row.event_starts_at,
                ends_at: row.event_ends_at,
                price_cents: row.event_price_cents,
            },
            note: row.note,
            status: RegistrationStatus::from_id(row.status_id),
            registered_at: row.registered_at,
            validated_at: row.validated_at,
            cancelled_at: row.cancelled_at,
            payment,
        }
    }
}
