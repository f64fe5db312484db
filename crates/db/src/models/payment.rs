//! Payment record models.

use eventhub_core::registration::ContactSnapshot;
use eventhub_core::status::PaymentStatus;
use eventhub_core::types::{Cents, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `payments` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Payment {
    pub id: DbId,
    pub user_id: DbId,
    pub event_id: DbId,
    pub registration_id: DbId,
    pub display_name: String,
    pub email: String,
    pub phone: String,
    pub amount_cents: Cents,
    pub reference: String,
    pub payment_method: String,
    pub proof_path: Option<String>,
    pub remark: Option<String>,
    #[sqlx(try_from = "i16")]
    pub status: PaymentStatus,
    pub submitted_at: Timestamp,
    pub reviewed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Payment {
    /// The contact snapshot copied from the registration.
    pub fn contact(&self) -> ContactSnapshot {
        ContactSnapshot {
            display_name: self.display_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }
}

/// A payment listed to a manager, with the event title for context.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PaymentWithEvent {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub payment: Payment,
    pub event_title: String,
}

/// Insert DTO assembled by the workflow.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub user_id: DbId,
    pub event_id: DbId,
    pub registration_id: DbId,
    pub contact: ContactSnapshot,
    pub amount_cents: Cents,
    pub reference: String,
    pub payment_method: String,
    pub proof_path: Option<String>,
    pub remark: Option<String>,
}

/// Request body for the review endpoint: `{"status": "approved"}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ReviewPaymentRequest {
    pub status: String,
}
