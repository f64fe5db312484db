//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the caller, from a Bearer token or `token` cookie.
//! - [`rbac::Authorized`] -- evaluates the core policy table for an operation.

pub mod auth;
pub mod rbac;
