//! Domain rules for the eventhub registration and payment workflow.
//!
//! This crate has no I/O: it holds the identifiers, status enums, error
//! taxonomy, authorization policy and the pure validation functions that the
//! database and API layers compose into the workflow.

pub mod authorization;
pub mod error;
pub mod event;
pub mod payment;
pub mod registration;
pub mod roles;
pub mod status;
pub mod types;
