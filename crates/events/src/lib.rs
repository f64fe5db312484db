//! Eventhub notification infrastructure.
//!
//! - [`NotificationBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`. Workflows publish after their mutation commits.
//! - [`Notification`]: the envelope describing who to tell what.
//! - [`templates`]: subject and body rendering per notification kind.
//! - [`delivery`]: the [`Mailer`] seam with SMTP and log-only implementations.
//! - [`NotificationDispatcher`]: background consumer that sends each
//!   notification under a timeout and never propagates failures.

pub mod bus;
pub mod delivery;
pub mod dispatcher;
pub mod templates;

pub use bus::{Notification, NotificationBus, NotificationKind};
pub use delivery::email::{EmailConfig, EmailError, LogMailer, Mailer, OutgoingEmail, SmtpMailer};
pub use dispatcher::NotificationDispatcher;
