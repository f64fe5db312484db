//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! `&PgPool` as the first argument. Methods that must run inside a caller's
//! transaction take `&mut PgConnection` instead.

pub mod event_repo;
pub mod payment_repo;
pub mod registration_repo;
pub mod user_repo;

pub use event_repo::EventRepo;
pub use payment_repo::PaymentRepo;
pub use registration_repo::RegistrationRepo;
pub use user_repo::UserRepo;
