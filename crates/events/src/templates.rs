//! Plain-text rendering of notifications.

use crate::bus::{Notification, NotificationKind};
use crate::delivery::email::OutgoingEmail;

/// Subject line prefix for every notification email.
const SUBJECT_PREFIX: &str = "[Eventhub]";

/// Render the subject line for a notification.
pub fn subject(n: &Notification) -> String {
    let summary = match n.kind {
        NotificationKind::RegistrationReceived => "Registration received",
        NotificationKind::RegistrationConfirmed => "Registration confirmed",
        NotificationKind::RegistrationCancelled => "Registration cancelled",
        NotificationKind::RegistrationRemoved => "Registration removed",
        NotificationKind::PaymentValidated => "Payment validated",
        NotificationKind::PaymentRejected => "Payment rejected",
    };
    format!("{SUBJECT_PREFIX} {summary}: {}", n.event_title)
}

/// Render the plain-text body for a notification.
pub fn body(n: &Notification) -> String {
    let title = &n.event_title;
    let main = match n.kind {
        NotificationKind::RegistrationReceived => format!(
            "We received your registration for \"{title}\". \
             It is pending until the organizer validates it."
        ),
        NotificationKind::RegistrationConfirmed => {
            format!("Your registration for \"{title}\" has been validated. See you there!")
        }
        NotificationKind::RegistrationCancelled => {
            format!("Your registration for \"{title}\" has been cancelled.")
        }
        NotificationKind::RegistrationRemoved => format!(
            "Your registration for \"{title}\" was removed by the organizer.\nReason: {}",
            n.reason.as_deref().unwrap_or("not specified")
        ),
        NotificationKind::PaymentValidated => format!(
            "Your payment{} for \"{title}\" has been validated.",
            reference_suffix(n)
        ),
        NotificationKind::PaymentRejected => format!(
            "Your payment{} for \"{title}\" was rejected. \
             Please contact the organizer.",
            reference_suffix(n)
        ),
    };
    format!("Hello {},\n\n{main}\n", n.recipient_name)
}

fn reference_suffix(n: &Notification) -> String {
    n.reference
        .as_deref()
        .map(|r| format!(" (reference {r})"))
        .unwrap_or_default()
}

/// Render a complete email for the notification's recipient.
pub fn render(n: &Notification) -> OutgoingEmail {
    OutgoingEmail {
        to: n.recipient_email.clone(),
        to_name: Some(n.recipient_name.clone()),
        subject: subject(n),
        body: body(n),
    }
}
