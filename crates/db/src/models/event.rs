//! Event directory models.

use eventhub_core::status::EventState;
use eventhub_core::types::{Cents, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Event {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub location: Option<String>,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    pub capacity: i32,
    pub price_cents: Cents,
    #[sqlx(try_from = "i16")]
    pub state: EventState,
    pub organizer_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Request body for creating an event. The organizer is the caller.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEvent {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(length(max = 300))]
    pub location: Option<String>,
    pub starts_at: Timestamp,
    pub ends_at: Timestamp,
    #[validate(range(min = 1, message = "Capacity must be a positive integer"))]
    pub capacity: i32,
    #[serde(default)]
    #[validate(range(min = 0, message = "Price cannot be negative"))]
    pub price_cents: Cents,
}

/// Request body for editing an event. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateEvent {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: Option<String>,
    #[validate(length(max = 300))]
    pub location: Option<String>,
    pub starts_at: Option<Timestamp>,
    pub ends_at: Option<Timestamp>,
    #[validate(range(min = 1, message = "Capacity must be a positive integer"))]
    pub capacity: Option<i32>,
    #[validate(range(min = 0, message = "Price cannot be negative"))]
    pub price_cents: Option<Cents>,
}

impl UpdateEvent {
    /// Overlay the provided fields on `event`.
    pub fn apply(self, mut event: Event) -> Event {
        if let Some(title) = self.title {
            event.title = title;
        }
        if let Some(description) = self.description {
            event.description = description;
        }
        if self.location.is_some() {
            event.location = self.location;
        }
        if let Some(starts_at) = self.starts_at {
            event.starts_at = starts_at;
        }
        if let Some(ends_at) = self.ends_at {
            event.ends_at = ends_at;
        }
        if let Some(capacity) = self.capacity {
            event.capacity = capacity;
        }
        if let Some(price_cents) = self.price_cents {
            event.price_cents = price_cents;
        }
        event
    }
}

/// Request body for the admin moderation endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateEventState {
    pub state: String,
}

/// Counts of dependent rows removed when an event is deleted.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CascadeSummary {
    pub payments_deleted: u64,
    pub registrations_deleted: u64,
}
