//! API Key model for authentication.
//!
//! Every user of the service (account holders and administrators alike) is
//! issued an API key. Keys are stored in the database as SHA-256 hashes.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// An active API key joined with the user it belongs to.
///
/// # Database Tables
///
/// Built from `api_keys` joined with `users`:
/// - `id`: API key identifier
/// - `user_id`, `username`, `is_admin`: taken from the owning user
/// - `created_at`: when the key was issued
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ApiKeyOwner {
    pub id: Uuid,

    pub user_id: Uuid,

    pub username: String,

    /// Administrators may call the `/admin` endpoints.
    pub is_admin: bool,

    pub created_at: DateTime<Utc>,
}
