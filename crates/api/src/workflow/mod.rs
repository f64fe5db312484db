//! Workflow engine: orchestrates the directory, ledger and payment record.
//!
//! Each function gathers facts from storage, asks the pure rules in
//! `eventhub_core` whether the transition is allowed, performs the write, and
//! only then publishes a notification. Nothing is mutated before every check
//! has passed.

pub mod event;
pub mod payment;
pub mod registration;

use eventhub_core::authorization::ensure_event_manager;
use eventhub_core::error::CoreError;
use eventhub_core::types::DbId;
use eventhub_db::models::event::Event;
use eventhub_db::repositories::EventRepo;
use eventhub_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;

/// Load an event or fail with 404.
pub(crate) async fn load_event(pool: &DbPool, id: DbId) -> AppResult<Event> {
    EventRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Event", id }))
}

/// Require that `actor` organizes `event` (admins pass).
pub(crate) fn ensure_manages(actor: &AuthUser, event: &Event) -> AppResult<()> {
    ensure_event_manager(&actor.role, actor.user_id, event.organizer_id)?;
    Ok(())
}

/// Organizer filter for manager listings: admins see everything.
pub(crate) fn organizer_scope(actor: &AuthUser) -> Option<DbId> {
    if actor.is_admin() {
        None
    } else {
        Some(actor.user_id)
    }
}
