//! In-process store used by service and API tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use super::{AccountStore, AdminSettingsStore, ProfileStore, RequestStore, SystemSettingsStore};
use crate::error::AppError;
use crate::model::admin_settings::{AdminSettings, NewAdminSettings, UpdateAdminSettings};
use crate::model::profile::Profile;
use crate::model::request::{
    NewRequest, Request, RequestFilter, RequestStatus, StatusChange,
};
use crate::model::system_setting::{
    NewSystemSetting, Provenance, SystemSetting, UpdateSystemSetting,
};
use crate::model::user::{NewAccount, User};

#[derive(Default)]
struct Tables {
    requests: Vec<Request>,
    profiles: Vec<Profile>,
    admin_settings: Vec<AdminSettings>,
    system_settings: Vec<SystemSetting>,
    users: Vec<User>,
    refresh_tokens: Vec<RefreshToken>,
}

struct RefreshToken {
    jti: String,
    expires_at: DateTime<Utc>,
    revoked: bool,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    failing: AtomicBool,
    /// Number of `list_system_settings` / `find_admin_settings` calls, to observe caching.
    reads: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following call fail like an unreachable database.
    pub fn fail_all(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn settings_reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn with_profile(self, profile: Profile) -> Self {
        self.tables.lock().unwrap().profiles.push(profile);
        self
    }

    fn check(&self) -> Result<(), AppError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("connection refused").into());
        }
        Ok(())
    }

    fn sorted_newest_first(mut requests: Vec<Request>) -> Vec<Request> {
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        requests
    }
}

#[async_trait]
impl RequestStore for MemoryStore {
    async fn insert_request(&self, new: NewRequest) -> Result<Request, AppError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        let id = tables.requests.len() as u64 + 1;
        // strictly increasing timestamps keep ordering deterministic
        let created_at = Utc::now() + Duration::milliseconds(id as i64);
        let request = Request {
            id,
            user_id: new.user_id,
            request_type: new.request_type,
            data: new.data,
            status: RequestStatus::Pending,
            reviewed_by: None,
            reviewed_at: None,
            review_comment: None,
            created_at,
        };
        tables.requests.push(request.clone());
        Ok(request)
    }

    async fn find_request(&self, id: u64) -> Result<Option<Request>, AppError> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.requests.iter().find(|r| r.id == id).cloned())
    }

    async fn list_requests_for_user(&self, user_id: u64) -> Result<Vec<Request>, AppError> {
        self.list_requests(&RequestFilter {
            user_id: Some(user_id),
            ..Default::default()
        })
        .await
    }

    async fn list_requests(&self, filter: &RequestFilter) -> Result<Vec<Request>, AppError> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        let matching = tables
            .requests
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        Ok(Self::sorted_newest_first(matching))
    }

    async fn apply_decision(&self, change: &StatusChange) -> Result<bool, AppError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        match tables
            .requests
            .iter_mut()
            .find(|r| r.id == change.request_id && r.status == RequestStatus::Pending)
        {
            Some(request) => {
                request.status = change.to;
                request.reviewed_by = Some(change.reviewer_id);
                request.reviewed_at = Some(Utc::now());
                request.review_comment = change.comment.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn find_profile(&self, user_id: u64) -> Result<Option<Profile>, AppError> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.profiles.iter().find(|p| p.user_id == user_id).cloned())
    }

    async fn upsert_profile(&self, profile: &Profile) -> Result<Profile, AppError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        tables.profiles.retain(|p| p.user_id != profile.user_id);
        tables.profiles.push(profile.clone());
        Ok(profile.clone())
    }
}

#[async_trait]
impl AdminSettingsStore for MemoryStore {
    async fn find_admin_settings(&self, user_id: u64) -> Result<Option<AdminSettings>, AppError> {
        self.check()?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .admin_settings
            .iter()
            .find(|s| s.user_id == user_id)
            .cloned())
    }

    async fn insert_admin_settings(
        &self,
        user_id: u64,
        new: &NewAdminSettings,
    ) -> Result<AdminSettings, AppError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        if tables.admin_settings.iter().any(|s| s.user_id == user_id) {
            return Err(AppError::Conflict("Resource already exists".to_string()));
        }
        let now = Utc::now();
        let settings = AdminSettings {
            id: tables.admin_settings.len() as u64 + 1,
            user_id,
            notification_email: new.notification_email.clone(),
            auto_approve_vacation: new.auto_approve_vacation,
            auto_approve_work_certificate: new.auto_approve_work_certificate,
            auto_approve_mission_order: new.auto_approve_mission_order,
            signature_url: new.signature_url.clone(),
            created_at: now,
            updated_at: now,
        };
        tables.admin_settings.push(settings.clone());
        Ok(settings)
    }

    async fn update_admin_settings(
        &self,
        user_id: u64,
        patch: &UpdateAdminSettings,
    ) -> Result<Option<AdminSettings>, AppError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        Ok(tables
            .admin_settings
            .iter_mut()
            .find(|s| s.user_id == user_id)
            .map(|settings| {
                patch.apply(settings);
                settings.updated_at = Utc::now();
                settings.clone()
            }))
    }
}

#[async_trait]
impl SystemSettingsStore for MemoryStore {
    async fn list_system_settings(&self) -> Result<Vec<SystemSetting>, AppError> {
        self.check()?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        let tables = self.tables.lock().unwrap();
        let mut settings = tables.system_settings.clone();
        settings.sort_by(|a, b| a.category.cmp(&b.category).then(a.key.cmp(&b.key)));
        Ok(settings)
    }

    async fn insert_system_setting(
        &self,
        new: &NewSystemSetting,
        by: Provenance,
    ) -> Result<SystemSetting, AppError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        if tables.system_settings.iter().any(|s| s.key == new.key) {
            return Err(AppError::Conflict("Resource already exists".to_string()));
        }
        let setting = SystemSetting {
            id: tables.system_settings.len() as u64 + 1,
            key: new.key.clone(),
            value: new.value.clone(),
            category: new.category.clone(),
            description: new.description.clone(),
            updated_by: Some(by.user_id),
            updated_at: by.at,
        };
        tables.system_settings.push(setting.clone());
        Ok(setting)
    }

    async fn update_system_setting(
        &self,
        key: &str,
        patch: &UpdateSystemSetting,
        by: Provenance,
    ) -> Result<Option<SystemSetting>, AppError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        Ok(tables
            .system_settings
            .iter_mut()
            .find(|s| s.key == key)
            .map(|setting| {
                setting.value = patch.value.clone();
                if let Some(category) = &patch.category {
                    setting.category = category.clone();
                }
                if let Some(description) = &patch.description {
                    setting.description = Some(description.clone());
                }
                setting.updated_by = Some(by.user_id);
                setting.updated_at = by.at;
                setting.clone()
            }))
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        self.check()?;
        let tables = self.tables.lock().unwrap();
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn create_account(&self, new: &NewAccount) -> Result<User, AppError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        if tables
            .users
            .iter()
            .any(|u| u.username == new.username || u.email == new.email)
        {
            return Err(AppError::Conflict("Resource already exists".to_string()));
        }
        let user = User {
            id: tables.users.len() as u64 + 1,
            username: new.username.clone(),
            email: new.email.clone(),
            password: new.password_hash.clone(),
            role_id: new.role.id(),
        };
        tables.users.push(user.clone());
        tables.profiles.push(Profile {
            user_id: user.id,
            full_name: new.full_name.clone(),
            employee_number: None,
            grade: None,
            job_function: None,
            hire_date: None,
        });
        Ok(user)
    }

    async fn record_login(&self, _user_id: u64) -> Result<(), AppError> {
        self.check()
    }

    async fn insert_refresh_token(
        &self,
        _user_id: u64,
        jti: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        self.check()?;
        self.tables.lock().unwrap().refresh_tokens.push(RefreshToken {
            jti: jti.to_string(),
            expires_at,
            revoked: false,
        });
        Ok(())
    }

    async fn revoke_refresh_token(&self, jti: &str) -> Result<bool, AppError> {
        self.check()?;
        let mut tables = self.tables.lock().unwrap();
        let now = Utc::now();
        match tables
            .refresh_tokens
            .iter_mut()
            .find(|t| t.jti == jti && !t.revoked && t.expires_at > now)
        {
            Some(token) => {
                token.revoked = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
