use sqlx::FromRow;

use super::role::Role;

/// Account row as read by the authentication handlers.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub password: String,
    pub role_id: u8,
}

/// A new account together with the display name of its profile row.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub full_name: String,
}
