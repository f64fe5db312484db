//! User directory rows. The workflow only reads users; rows are created by
//! the (external) account flow and by test fixtures.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use eventhub_core::types::{DbId, Timestamp};

/// Seeded id of the `admin` role.
pub const ROLE_ID_ADMIN: DbId = 1;
/// Seeded id of the `manager` role.
pub const ROLE_ID_MANAGER: DbId = 2;
/// Seeded id of the `participant` role.
pub const ROLE_ID_PARTICIPANT: DbId = 3;

/// A row from the `users` table joined with its role name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role_id: DbId,
    pub role: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a user.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role_id: DbId,
}
