//! Background consumer that turns bus notifications into emails.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::bus::Notification;
use crate::delivery::email::{EmailError, Mailer};
use crate::templates;

/// Default per-send timeout.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Why a single dispatch failed.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Email(#[from] EmailError),

    #[error("Delivery timed out after {0:?}")]
    Timeout(Duration),
}

/// Sends every notification it receives, one at a time.
///
/// Failures and timeouts are logged and swallowed; they never reach the
/// request that published the notification.
pub struct NotificationDispatcher {
    mailer: Arc<dyn Mailer>,
    send_timeout: Duration,
}

impl NotificationDispatcher {
    pub fn new(mailer: Arc<dyn Mailer>, send_timeout: Duration) -> Self {
        Self {
            mailer,
            send_timeout,
        }
    }

    /// Run the dispatch loop.
    ///
    /// The loop exits when the channel is closed, i.e. once every
    /// [`NotificationBus`](crate::NotificationBus) handle has been dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<Notification>) {
        loop {
            match receiver.recv().await {
                Ok(notification) => {
                    if let Err(e) = self.dispatch(&notification).await {
                        tracing::error!(
                            error = %e,
                            kind = %notification.kind,
                            to = %notification.recipient_email,
                            registration_id = ?notification.registration_id,
                            "Failed to deliver notification"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification dispatcher lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Notification bus closed, dispatcher shutting down");
                    break;
                }
            }
        }
    }

    /// Render and send a single notification under the configured timeout.
    pub async fn dispatch(&self, notification: &Notification) -> Result<(), DispatchError> {
        let email = templates::render(notification);
        match tokio::time::timeout(self.send_timeout, self.mailer.send(&email)).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(DispatchError::Timeout(self.send_timeout)),
        }
    }
}
