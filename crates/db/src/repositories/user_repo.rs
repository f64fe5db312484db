//! Repository for the `users` table.

use sqlx::PgPool;
use eventhub_core::types::DbId;

use crate::models::user::{CreateUser, User};

/// Column list with the role name joined in. Expects aliases `u` and `r`.
const COLUMNS: &str = "u.id, u.name, u.email, u.phone, u.role_id, r.name AS role, \
                       u.is_active, u.created_at, u.updated_at";

/// Read access to the user directory.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row with its role name.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "WITH u AS (
                INSERT INTO users (name, email, phone, role_id)
                VALUES ($1, $2, $3, $4)
                RETURNING *
             )
             SELECT {COLUMNS} FROM u JOIN roles r ON r.id = u.role_id"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(input.role_id)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM users u JOIN roles r ON r.id = u.role_id WHERE u.id = $1"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
