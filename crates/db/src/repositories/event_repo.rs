//! Repository for the `events` table.

use sqlx::{PgConnection, PgPool};
use eventhub_core::status::{EventState, StatusId};
use eventhub_core::types::DbId;

use crate::models::event::{CascadeSummary, CreateEvent, Event};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, description, location, starts_at, ends_at, capacity, \
                       price_cents, state_id AS state, organizer_id, created_at, updated_at";

/// Provides CRUD operations for events.
pub struct EventRepo;

impl EventRepo {
    /// Insert a new event in the `pending` state.
    pub async fn create(
        pool: &PgPool,
        organizer_id: DbId,
        input: &CreateEvent,
    ) -> Result<Event, sqlx::Error> {
        let query = format!(
            "INSERT INTO events
                (title, description, location, starts_at, ends_at, capacity, price_cents, organizer_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.location)
            .bind(input.starts_at)
            .bind(input.ends_at)
            .bind(input.capacity)
            .bind(input.price_cents)
            .bind(organizer_id)
            .fetch_one(pool)
            .await
    }

    /// Find an event by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events WHERE id = $1");
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch an event and hold a row lock on it until the transaction ends.
    ///
    /// Concurrent admissions to the same event serialize on this lock, which
    /// makes the capacity count and insert that follow atomic.
    pub async fn lock_for_update(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// List events in the given moderation state, soonest first.
    pub async fn list_by_state(
        pool: &PgPool,
        state: EventState,
    ) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events WHERE state_id = $1 ORDER BY starts_at");
        sqlx::query_as::<_, Event>(&query)
            .bind(StatusId::from(state))
            .fetch_all(pool)
            .await
    }

    /// List events owned by an organizer, most recently created first.
    pub async fn list_by_organizer(
        pool: &PgPool,
        organizer_id: DbId,
    ) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM events WHERE organizer_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(organizer_id)
            .fetch_all(pool)
            .await
    }

    /// Set the moderation state. Returns `None` if the event does not exist.
    pub async fn update_state(
        pool: &PgPool,
        id: DbId,
        state: EventState,
    ) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("UPDATE events SET state_id = $2 WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .bind(StatusId::from(state))
            .fetch_optional(pool)
            .await
    }

    /// Write the editable fields of `event` back to its row.
    ///
    /// State and organizer are left untouched. Returns `None` if the event
    /// does not exist.
    pub async fn update_details(
        conn: &mut PgConnection,
        event: &Event,
    ) -> Result<Option<Event>, sqlx::Error> {
        let query = format!(
            "UPDATE events
             SET title = $2, description = $3, location = $4, starts_at = $5,
                 ends_at = $6, capacity = $7, price_cents = $8
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(event.id)
            .bind(&event.title)
            .bind(&event.description)
            .bind(&event.location)
            .bind(event.starts_at)
            .bind(event.ends_at)
            .bind(event.capacity)
            .bind(event.price_cents)
            .fetch_optional(conn)
            .await
    }

    /// Delete an event together with its payments and registrations.
    ///
    /// Runs in one transaction, children first. Returns `None` (and deletes
    /// nothing) if the event does not exist.
    pub async fn delete_cascade(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<CascadeSummary>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let exists = Self::lock_for_update(&mut tx, id).await?.is_some();
        if !exists {
            return Ok(None);
        }

        let payments = sqlx::query("DELETE FROM payments WHERE event_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let registrations = sqlx::query("DELETE FROM registrations WHERE event_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let summary = CascadeSummary {
            payments_deleted: payments.rows_affected(),
            registrations_deleted: registrations.rows_affected(),
        };
        tracing::debug!(
            event_id = id,
            payments = summary.payments_deleted,
            registrations = summary.registrations_deleted,
            "Event deleted with dependents",
        );
        Ok(Some(summary))
    }
}
