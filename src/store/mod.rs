//! Access to the backing table store.
//!
//! One trait per collection (`requests`, `profiles`, `admin_settings`, `system_settings`, plus the
//! account tables used by authentication); every per-user call is scoped by an equality filter on
//! the caller's id. [`MySqlStore`] is the production implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::model::admin_settings::{AdminSettings, NewAdminSettings, UpdateAdminSettings};
use crate::model::profile::Profile;
use crate::model::request::{NewRequest, Request, RequestFilter, StatusChange};
use crate::model::system_setting::{
    NewSystemSetting, Provenance, SystemSetting, UpdateSystemSetting,
};
use crate::model::user::{NewAccount, User};

mod mysql;
#[cfg(test)]
pub mod memory;

pub use mysql::MySqlStore;

#[async_trait]
pub trait RequestStore: Send + Sync {
    /// Stores a new request in `pending` state.
    async fn insert_request(&self, new: NewRequest) -> Result<Request, AppError>;

    async fn find_request(&self, id: u64) -> Result<Option<Request>, AppError>;

    /// All requests of one user, newest first.
    async fn list_requests_for_user(&self, user_id: u64) -> Result<Vec<Request>, AppError>;

    /// Requests matching `filter`, newest first.
    async fn list_requests(&self, filter: &RequestFilter) -> Result<Vec<Request>, AppError>;

    /// Applies a decision to a request that is still pending.
    /// Returns `false` when no pending row with that id exists.
    async fn apply_decision(&self, change: &StatusChange) -> Result<bool, AppError>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn find_profile(&self, user_id: u64) -> Result<Option<Profile>, AppError>;

    async fn upsert_profile(&self, profile: &Profile) -> Result<Profile, AppError>;
}

#[async_trait]
pub trait AdminSettingsStore: Send + Sync {
    async fn find_admin_settings(&self, user_id: u64) -> Result<Option<AdminSettings>, AppError>;

    /// Fails with `Conflict` if the user already has a settings row.
    async fn insert_admin_settings(
        &self,
        user_id: u64,
        new: &NewAdminSettings,
    ) -> Result<AdminSettings, AppError>;

    async fn update_admin_settings(
        &self,
        user_id: u64,
        patch: &UpdateAdminSettings,
    ) -> Result<Option<AdminSettings>, AppError>;
}

#[async_trait]
pub trait SystemSettingsStore: Send + Sync {
    /// All settings ordered by category then key.
    async fn list_system_settings(&self) -> Result<Vec<SystemSetting>, AppError>;

    async fn insert_system_setting(
        &self,
        new: &NewSystemSetting,
        by: Provenance,
    ) -> Result<SystemSetting, AppError>;

    async fn update_system_setting(
        &self,
        key: &str,
        patch: &UpdateSystemSetting,
        by: Provenance,
    ) -> Result<Option<SystemSetting>, AppError>;
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Creates the user and its profile row atomically.
    /// Fails with `Conflict` if the username or email is taken.
    async fn create_account(&self, new: &NewAccount) -> Result<User, AppError>;

    async fn record_login(&self, user_id: u64) -> Result<(), AppError>;

    async fn insert_refresh_token(
        &self,
        user_id: u64,
        jti: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError>;

    /// Revokes a refresh token. Returns `true` only if it was still live (not revoked, not
    /// expired), so a token can be exchanged at most once.
    async fn revoke_refresh_token(&self, jti: &str) -> Result<bool, AppError>;
}

pub trait Store:
    RequestStore + ProfileStore + AdminSettingsStore + SystemSettingsStore + AccountStore
{
}

impl<T> Store for T where
    T: RequestStore + ProfileStore + AdminSettingsStore + SystemSettingsStore + AccountStore
{
}
