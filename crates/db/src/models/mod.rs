//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - An insert DTO built by the workflow layer
//! - `Deserialize` request bodies accepted by the API

pub mod event;
pub mod payment;
pub mod registration;
pub mod user;
