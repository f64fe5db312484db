use std::sync::Arc;

use eventhub_events::NotificationBus;

use crate::config::ServerConfig;
use crate::storage::ProofStorage;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; inner data is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: eventhub_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Notification bus; workflows publish after their writes commit.
    pub bus: Arc<NotificationBus>,
    /// Where uploaded payment proofs are written.
    pub proofs: Arc<ProofStorage>,
}
