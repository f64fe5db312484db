//! Repository for the `payments` table.

use sqlx::{PgConnection, PgPool};
use eventhub_core::status::{PaymentStatus, StatusId};
use eventhub_core::types::DbId;

use crate::models::payment::{NewPayment, Payment, PaymentWithEvent};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, event_id, registration_id, display_name, email, phone, \
                       amount_cents, reference, payment_method, proof_path, remark, \
                       status_id AS status, submitted_at, reviewed_at, created_at, updated_at";

/// Same columns qualified with the `p` alias, for joins.
const P_COLUMNS: &str = "p.id, p.user_id, p.event_id, p.registration_id, p.display_name, \
                         p.email, p.phone, p.amount_cents, p.reference, p.payment_method, \
                         p.proof_path, p.remark, p.status_id AS status, p.submitted_at, \
                         p.reviewed_at, p.created_at, p.updated_at";

/// Provides CRUD operations for payments.
pub struct PaymentRepo;

impl PaymentRepo {
    /// Insert a pending payment.
    ///
    /// A reference collision surfaces as a unique violation on
    /// `uq_payments_reference`; callers retry with a fresh reference.
    pub async fn insert(pool: &PgPool, input: &NewPayment) -> Result<Payment, sqlx::Error> {
        let query = format!(
            "INSERT INTO payments
                (user_id, event_id, registration_id, display_name, email, phone,
                 amount_cents, reference, payment_method, proof_path, remark)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(input.user_id)
            .bind(input.event_id)
            .bind(input.registration_id)
            .bind(&input.contact.display_name)
            .bind(&input.contact.email)
            .bind(&input.contact.phone)
            .bind(input.amount_cents)
            .bind(&input.reference)
            .bind(&input.payment_method)
            .bind(&input.proof_path)
            .bind(&input.remark)
            .fetch_one(pool)
            .await
    }

    /// Find a payment by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM payments WHERE id = $1");
        sqlx::query_as::<_, Payment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find the payment attached to a registration.
    pub async fn find_by_registration(
        pool: &PgPool,
        registration_id: DbId,
    ) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM payments WHERE registration_id = $1");
        sqlx::query_as::<_, Payment>(&query)
            .bind(registration_id)
            .fetch_optional(pool)
            .await
    }

    /// Same as [`Self::find_by_registration`], holding a `FOR SHARE` lock so
    /// the review status cannot change until the transaction ends.
    pub async fn find_by_registration_for_share(
        conn: &mut PgConnection,
        registration_id: DbId,
    ) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM payments WHERE registration_id = $1 FOR SHARE");
        sqlx::query_as::<_, Payment>(&query)
            .bind(registration_id)
            .fetch_optional(conn)
            .await
    }

    /// Whether the user already submitted a payment for the event.
    pub async fn exists_for_user_event(
        pool: &PgPool,
        user_id: DbId,
        event_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM payments WHERE user_id = $1 AND event_id = $2)",
        )
        .bind(user_id)
        .bind(event_id)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }

    /// Payments for every event organized by `organizer_id`, newest first.
    ///
    /// When `organizer_id` is `None` (admin view) all payments are listed.
    pub async fn list_for_organizer(
        pool: &PgPool,
        organizer_id: Option<DbId>,
    ) -> Result<Vec<PaymentWithEvent>, sqlx::Error> {
        let query = format!(
            "SELECT {P_COLUMNS}, e.title AS event_title
             FROM payments p
             JOIN events e ON e.id = p.event_id
             WHERE ($1::BIGINT IS NULL OR e.organizer_id = $1)
             ORDER BY p.submitted_at DESC, p.id DESC"
        );
        sqlx::query_as::<_, PaymentWithEvent>(&query)
            .bind(organizer_id)
            .fetch_all(pool)
            .await
    }

    /// Record a review decision and stamp `reviewed_at`.
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: PaymentStatus,
    ) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!(
            "UPDATE payments SET status_id = $2, reviewed_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(id)
            .bind(StatusId::from(status))
            .fetch_optional(pool)
            .await
    }
}
