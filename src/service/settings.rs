use std::sync::Arc;
use std::time::Duration;

use validator::Validate;

use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::admin_settings::{AdminSettings, NewAdminSettings, UpdateAdminSettings};
use crate::model::system_setting::{
    NewSystemSetting, Provenance, SystemSetting, UpdateSystemSetting,
};
use crate::store::Store;
use crate::utils::query_cache::QueryCache;

/// Per-administrator settings: one row per admin, keyed by the admin's user id.
pub struct AdminSettingsService {
    store: Arc<dyn Store>,
    cache: QueryCache<u64, AdminSettings>,
}

impl AdminSettingsService {
    pub fn new(store: Arc<dyn Store>, ttl: Duration) -> Self {
        Self {
            store,
            cache: QueryCache::new("admin_settings", 1_000, ttl),
        }
    }

    /// Reads the caller's settings, provisioning defaults on first access.
    pub async fn get(&self, admin: &AuthUser) -> Result<AdminSettings, AppError> {
        let store = self.store.clone();
        let user_id = admin.user_id;
        let email = admin.email.clone();

        self.cache
            .get_or_fetch(user_id, || async move {
                if let Some(settings) = store.find_admin_settings(user_id).await? {
                    return Ok(settings);
                }
                tracing::info!(user_id, "Provisioning default admin settings");
                match store
                    .insert_admin_settings(user_id, &NewAdminSettings::defaults_for(&email))
                    .await
                {
                    Ok(settings) => Ok(settings),
                    // provisioned concurrently by another request
                    Err(AppError::Conflict(_)) => store
                        .find_admin_settings(user_id)
                        .await?
                        .ok_or_else(|| AppError::NotFound("Admin settings not found".to_string())),
                    Err(e) => Err(e),
                }
            })
            .await
    }

    pub async fn create(
        &self,
        admin: &AuthUser,
        new: NewAdminSettings,
    ) -> Result<AdminSettings, AppError> {
        new.validate()?;
        let settings = self.store.insert_admin_settings(admin.user_id, &new).await?;
        self.cache.invalidate(&admin.user_id).await;
        Ok(settings)
    }

    pub async fn update(
        &self,
        admin: &AuthUser,
        patch: UpdateAdminSettings,
    ) -> Result<AdminSettings, AppError> {
        patch.validate()?;
        let settings = self
            .store
            .update_admin_settings(admin.user_id, &patch)
            .await?
            .ok_or_else(|| AppError::NotFound("Admin settings not found".to_string()))?;
        self.cache.invalidate(&admin.user_id).await;
        Ok(settings)
    }
}

/// Process-wide key/value configuration, readable by everyone.
pub struct SystemSettingsService {
    store: Arc<dyn Store>,
    cache: QueryCache<(), Arc<Vec<SystemSetting>>>,
}

impl SystemSettingsService {
    pub fn new(store: Arc<dyn Store>, ttl: Duration) -> Self {
        Self {
            store,
            cache: QueryCache::new("system_settings", 1, ttl),
        }
    }

    pub async fn list(&self) -> Result<Arc<Vec<SystemSetting>>, AppError> {
        let store = self.store.clone();
        self.cache
            .get_or_fetch((), || async move { Ok(Arc::new(store.list_system_settings().await?)) })
            .await
    }

    pub async fn get(&self, key: &str) -> Result<SystemSetting, AppError> {
        self.list()
            .await?
            .iter()
            .find(|s| s.key == key)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Setting {key} not found")))
    }

    pub async fn create(
        &self,
        admin: &AuthUser,
        new: NewSystemSetting,
    ) -> Result<SystemSetting, AppError> {
        new.validate()?;
        let setting = self
            .store
            .insert_system_setting(&new, Provenance::now(admin.user_id))
            .await?;
        self.cache.invalidate(&()).await;
        tracing::info!(key = %setting.key, by = admin.user_id, "System setting created");
        Ok(setting)
    }

    pub async fn update(
        &self,
        admin: &AuthUser,
        key: &str,
        patch: UpdateSystemSetting,
    ) -> Result<SystemSetting, AppError> {
        patch.validate()?;
        let setting = self
            .store
            .update_system_setting(key, &patch, Provenance::now(admin.user_id))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Setting {key} not found")))?;
        self.cache.invalidate(&()).await;
        tracing::info!(key, by = admin.user_id, "System setting updated");
        Ok(setting)
    }
}
