//! In-process notification bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`NotificationBus`] is shared via `Arc<NotificationBus>` across the
//! application. Publishing never blocks and never fails the caller.

use chrono::{DateTime, Utc};
use eventhub_core::registration::ContactSnapshot;
use eventhub_core::types::DbId;
use serde::Serialize;
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// NotificationKind
// ---------------------------------------------------------------------------

/// What happened, from the participant's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    RegistrationReceived,
    RegistrationConfirmed,
    RegistrationCancelled,
    RegistrationRemoved,
    PaymentValidated,
    PaymentRejected,
}

impl NotificationKind {
    /// Stable snake_case name, used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RegistrationReceived => "registration_received",
            Self::RegistrationConfirmed => "registration_confirmed",
            Self::RegistrationCancelled => "registration_cancelled",
            Self::RegistrationRemoved => "registration_removed",
            Self::PaymentValidated => "payment_validated",
            Self::PaymentRejected => "payment_rejected",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Notification
// ---------------------------------------------------------------------------

/// A notification addressed to one participant.
///
/// Constructed via [`Notification::new`] and enriched with
/// [`with_registration`](Notification::with_registration),
/// [`with_reference`](Notification::with_reference) and
/// [`with_reason`](Notification::with_reason).
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub recipient_email: String,
    pub recipient_name: String,
    pub event_title: String,
    pub registration_id: Option<DbId>,
    /// Payment reference, for payment notifications.
    pub reference: Option<String>,
    /// Human-readable removal reason, for `RegistrationRemoved`.
    pub reason: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    /// Address a notification to the contact snapshot of a registration.
    pub fn new(
        kind: NotificationKind,
        recipient: &ContactSnapshot,
        event_title: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            recipient_email: recipient.email.clone(),
            recipient_name: recipient.display_name.clone(),
            event_title: event_title.into(),
            registration_id: None,
            reference: None,
            reason: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_registration(mut self, registration_id: DbId) -> Self {
        self.registration_id = Some(registration_id);
        self
    }

    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

// ---------------------------------------------------------------------------
// NotificationBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

/// In-process fan-out notification bus.
pub struct NotificationBus {
    sender: broadcast::Sender<Notification>,
}

impl NotificationBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest undelivered notifications are
    /// dropped and slow receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a notification to all current subscribers.
    ///
    /// With no subscribers the notification is dropped.
    pub fn publish(&self, notification: Notification) {
        tracing::debug!(
            kind = %notification.kind,
            to = %notification.recipient_email,
            "Publishing notification"
        );
        // A SendError only means there are zero receivers.
        let _ = self.sender.send(notification);
    }

    /// Subscribe to every notification published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    /// Number of live receivers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
