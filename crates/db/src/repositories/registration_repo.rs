//! Repository for the `registrations` table.

use sqlx::{PgConnection, PgPool};
use eventhub_core::status::{RegistrationStatus, StatusId};
use eventhub_core::types::DbId;

use crate::models::registration::{
    NewRegistration, Registration, RegistrationOverview, RegistrationOverviewRow,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, event_id, display_name, email, phone, note, \
                       status_id AS status, registered_at, validated_at, cancelled_at, \
                       created_at, updated_at";

/// Joined projection used by the overview listings. Expects aliases
/// `reg`, `e` and `p` (payment, left-joined).
const OVERVIEW_COLUMNS: &str = "reg.id, reg.user_id, reg.event_id, reg.display_name, reg.email, \
    reg.phone, reg.note, reg.status_id, reg.registered_at, reg.validated_at, reg.cancelled_at, \
    e.title AS event_title, e.starts_at AS event_starts_at, e.ends_at AS event_ends_at, \
    e.price_cents AS event_price_cents, \
    p.id AS payment_id, p.amount_cents AS payment_amount_cents, \
    p.reference AS payment_reference, p.status_id AS payment_status_id, \
    p.submitted_at AS payment_submitted_at";

const OVERVIEW_FROM: &str = "registrations reg \
    JOIN events e ON e.id = reg.event_id \
    LEFT JOIN payments p ON p.registration_id = reg.id";

/// Provides ledger operations for registrations.
pub struct RegistrationRepo;

impl RegistrationRepo {
    /// Count registrations that occupy a seat (every status except cancelled).
    pub async fn count_active(conn: &mut PgConnection, event_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM registrations WHERE event_id = $1 AND status_id <> $2",
        )
        .bind(event_id)
        .bind(StatusId::from(RegistrationStatus::Cancelled))
        .fetch_one(conn)
        .await?;
        Ok(count)
    }

    /// Whether the user already holds a registration for the event, in any
    /// status.
    pub async fn exists_for_user_event(
        conn: &mut PgConnection,
        user_id: DbId,
        event_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM registrations WHERE user_id = $1 AND event_id = $2)",
        )
        .bind(user_id)
        .bind(event_id)
        .fetch_one(conn)
        .await?;
        Ok(exists)
    }

    /// Insert a pending registration.
    pub async fn insert(
        conn: &mut PgConnection,
        input: &NewRegistration,
    ) -> Result<Registration, sqlx::Error> {
        let query = format!(
            "INSERT INTO registrations (user_id, event_id, display_name, email, phone, note)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Registration>(&query)
            .bind(input.user_id)
            .bind(input.event_id)
            .bind(&input.contact.display_name)
            .bind(&input.contact.email)
            .bind(&input.contact.phone)
            .bind(&input.note)
            .fetch_one(conn)
            .await
    }

    /// Find a registration by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Registration>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM registrations WHERE id = $1");
        sqlx::query_as::<_, Registration>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Registrations for every event organized by `organizer_id`, newest first.
    ///
    /// When `organizer_id` is `None` (admin view) all registrations are listed.
    pub async fn list_for_organizer(
        pool: &PgPool,
        organizer_id: Option<DbId>,
    ) -> Result<Vec<RegistrationOverview>, sqlx::Error> {
        let query = format!(
            "SELECT {OVERVIEW_COLUMNS} FROM {OVERVIEW_FROM}
             WHERE ($1::BIGINT IS NULL OR e.organizer_id = $1)
             ORDER BY reg.registered_at DESC, reg.id DESC"
        );
        let rows = sqlx::query_as::<_, RegistrationOverviewRow>(&query)
            .bind(organizer_id)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(RegistrationOverview::from).collect())
    }

    /// Registrations held by `user_id`, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<RegistrationOverview>, sqlx::Error> {
        let query = format!(
            "SELECT {OVERVIEW_COLUMNS} FROM {OVERVIEW_FROM}
             WHERE reg.user_id = $1
             ORDER BY reg.registered_at DESC, reg.id DESC"
        );
        let rows = sqlx::query_as::<_, RegistrationOverviewRow>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(RegistrationOverview::from).collect())
    }

    /// Move a pending registration to `confirmed` and stamp `validated_at`.
    ///
    /// Returns `None` if the row is missing or no longer pending, so a
    /// concurrent transition cannot be overwritten.
    pub async fn mark_confirmed(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Registration>, sqlx::Error> {
        let query = format!(
            "UPDATE registrations SET status_id = $2, validated_at = NOW()
             WHERE id = $1 AND status_id = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Registration>(&query)
            .bind(id)
            .bind(StatusId::from(RegistrationStatus::Confirmed))
            .bind(StatusId::from(RegistrationStatus::Pending))
            .fetch_optional(conn)
            .await
    }

    /// Move a pending registration to `cancelled` and stamp `cancelled_at`.
    ///
    /// Same conditional semantics as [`Self::mark_confirmed`].
    pub async fn mark_cancelled(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Registration>, sqlx::Error> {
        let query = format!(
            "UPDATE registrations SET status_id = $2, cancelled_at = NOW()
             WHERE id = $1 AND status_id = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Registration>(&query)
            .bind(id)
            .bind(StatusId::from(RegistrationStatus::Cancelled))
            .bind(StatusId::from(RegistrationStatus::Pending))
            .fetch_optional(pool)
            .await
    }

    /// Delete a registration and its payment (if any) in one transaction.
    ///
    /// Returns `true` if the registration existed.
    pub async fn delete_with_payment(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM payments WHERE registration_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM registrations WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a registration and its payment unless it has been confirmed.
    ///
    /// The row is locked first, so a confirmation racing with the delete
    /// either lands before (and the delete is refused) or finds nothing to
    /// update. Returns `false` when the row is missing or confirmed.
    pub async fn delete_unconfirmed(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let locked: Option<(DbId,)> = sqlx::query_as(
            "SELECT id FROM registrations WHERE id = $1 AND status_id <> $2 FOR UPDATE",
        )
        .bind(id)
        .bind(StatusId::from(RegistrationStatus::Confirmed))
        .fetch_optional(&mut *tx)
        .await?;
        if locked.is_none() {
            return Ok(false);
        }

        sqlx::query("DELETE FROM payments WHERE registration_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM registrations WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }
}
