use std::str::FromStr;

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{FromRow, MySqlPool};

use super::{AccountStore, AdminSettingsStore, ProfileStore, RequestStore, SystemSettingsStore};
use crate::error::AppError;
use crate::model::admin_settings::{AdminSettings, NewAdminSettings, UpdateAdminSettings};
use crate::model::profile::Profile;
use crate::model::request::{
    NewRequest, Request, RequestFilter, RequestStatus, RequestType, StatusChange,
};
use crate::model::system_setting::{
    NewSystemSetting, Provenance, SystemSetting, UpdateSystemSetting,
};
use crate::model::user::{NewAccount, User};

#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

const REQUEST_COLUMNS: &str = "id, user_id, request_type, data, status, reviewed_by, reviewed_at, review_comment, created_at";

const ADMIN_SETTINGS_COLUMNS: &str = "id, user_id, notification_email, auto_approve_vacation, auto_approve_work_certificate, auto_approve_mission_order, signature_url, created_at, updated_at";

const SYSTEM_SETTING_COLUMNS: &str = "id, setting_key, setting_value, category, description, updated_by, updated_at";

#[derive(FromRow)]
struct RequestRow {
    id: u64,
    user_id: u64,
    request_type: String,
    data: Json<Value>,
    status: String,
    reviewed_by: Option<u64>,
    reviewed_at: Option<DateTime<Utc>>,
    review_comment: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<RequestRow> for Request {
    type Error = AppError;

    // Column values are checked here instead of trusted.
    fn try_from(row: RequestRow) -> Result<Self, Self::Error> {
        let request_type = RequestType::from_str(&row.request_type)
            .map_err(|_| anyhow!("request {} has unknown type {:?}", row.id, row.request_type))?;
        let status = RequestStatus::from_str(&row.status)
            .map_err(|_| anyhow!("request {} has unknown status {:?}", row.id, row.status))?;

        Ok(Request {
            id: row.id,
            user_id: row.user_id,
            request_type,
            data: row.data.0,
            status,
            reviewed_by: row.reviewed_by,
            reviewed_at: row.reviewed_at,
            review_comment: row.review_comment,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct SystemSettingRow {
    id: u64,
    setting_key: String,
    setting_value: Json<Value>,
    category: String,
    description: Option<String>,
    updated_by: Option<u64>,
    updated_at: DateTime<Utc>,
}

impl From<SystemSettingRow> for SystemSetting {
    fn from(row: SystemSettingRow) -> Self {
        SystemSetting {
            id: row.id,
            key: row.setting_key,
            value: row.setting_value.0,
            category: row.category,
            description: row.description,
            updated_by: row.updated_by,
            updated_at: row.updated_at,
        }
    }
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
}

fn into_requests(rows: Vec<RequestRow>) -> Result<Vec<Request>, AppError> {
    rows.into_iter().map(Request::try_from).collect()
}

impl MySqlStore {
    async fn fetch_request(&self, id: u64) -> Result<Option<Request>, AppError> {
        let sql = format!("SELECT {REQUEST_COLUMNS} FROM requests WHERE id = ?");
        sqlx::query_as::<_, RequestRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Request::try_from)
            .transpose()
    }

    async fn fetch_system_setting(&self, key: &str) -> Result<Option<SystemSetting>, AppError> {
        let sql = format!("SELECT {SYSTEM_SETTING_COLUMNS} FROM system_settings WHERE setting_key = ?");
        let row = sqlx::query_as::<_, SystemSettingRow>(&sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(SystemSetting::from))
    }
}

#[async_trait]
impl RequestStore for MySqlStore {
    async fn insert_request(&self, new: NewRequest) -> Result<Request, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO requests (user_id, request_type, data, status)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(new.user_id)
        .bind(new.request_type.as_str())
        .bind(Json(&new.data))
        .bind(RequestStatus::Pending.as_str())
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_id();
        self.fetch_request(id)
            .await?
            .ok_or_else(|| anyhow!("request {id} vanished after insert").into())
    }

    async fn find_request(&self, id: u64) -> Result<Option<Request>, AppError> {
        self.fetch_request(id).await
    }

    async fn list_requests_for_user(&self, user_id: u64) -> Result<Vec<Request>, AppError> {
        let sql = format!(
            "SELECT {REQUEST_COLUMNS} FROM requests WHERE user_id = ? ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, RequestRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        into_requests(rows)
    }

    async fn list_requests(&self, filter: &RequestFilter) -> Result<Vec<Request>, AppError> {
        let mut where_sql = String::from(" WHERE 1=1");
        let mut args: Vec<FilterValue> = Vec::new();

        if let Some(user_id) = filter.user_id {
            where_sql.push_str(" AND user_id = ?");
            args.push(FilterValue::U64(user_id));
        }
        if let Some(status) = &filter.status {
            where_sql.push_str(" AND status = ?");
            args.push(FilterValue::Str(status.as_str()));
        }
        if let Some(request_type) = &filter.request_type {
            where_sql.push_str(" AND request_type = ?");
            args.push(FilterValue::Str(request_type.as_str()));
        }

        let sql = format!(
            "SELECT {REQUEST_COLUMNS} FROM requests{where_sql} ORDER BY created_at DESC, id DESC"
        );
        let mut query = sqlx::query_as::<_, RequestRow>(&sql);
        for arg in args {
            query = match arg {
                FilterValue::U64(v) => query.bind(v),
                FilterValue::Str(s) => query.bind(s),
            };
        }

        let rows = query.fetch_all(&self.pool).await?;
        into_requests(rows)
    }

    async fn apply_decision(&self, change: &StatusChange) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE requests
            SET status = ?, reviewed_by = ?, reviewed_at = ?, review_comment = ?
            WHERE id = ?
            AND status = 'pending'
            "#,
        )
        .bind(change.to.as_str())
        .bind(change.reviewer_id)
        .bind(Utc::now())
        .bind(change.comment.as_deref())
        .bind(change.request_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ProfileStore for MySqlStore {
    async fn find_profile(&self, user_id: u64) -> Result<Option<Profile>, AppError> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT user_id, full_name, employee_number, grade, job_function, hire_date
            FROM profiles
            WHERE user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    async fn upsert_profile(&self, profile: &Profile) -> Result<Profile, AppError> {
        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, full_name, employee_number, grade, job_function, hire_date)
            VALUES (?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                full_name = VALUES(full_name),
                employee_number = VALUES(employee_number),
                grade = VALUES(grade),
                job_function = VALUES(job_function),
                hire_date = VALUES(hire_date)
            "#,
        )
        .bind(profile.user_id)
        .bind(&profile.full_name)
        .bind(&profile.employee_number)
        .bind(&profile.grade)
        .bind(&profile.job_function)
        .bind(profile.hire_date)
        .execute(&self.pool)
        .await?;

        Ok(profile.clone())
    }
}

#[async_trait]
impl AdminSettingsStore for MySqlStore {
    async fn find_admin_settings(&self, user_id: u64) -> Result<Option<AdminSettings>, AppError> {
        let sql = format!("SELECT {ADMIN_SETTINGS_COLUMNS} FROM admin_settings WHERE user_id = ?");
        let settings = sqlx::query_as::<_, AdminSettings>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(settings)
    }

    async fn insert_admin_settings(
        &self,
        user_id: u64,
        new: &NewAdminSettings,
    ) -> Result<AdminSettings, AppError> {
        sqlx::query(
            r#"
            INSERT INTO admin_settings
                (user_id, notification_email, auto_approve_vacation,
                 auto_approve_work_certificate, auto_approve_mission_order, signature_url)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(&new.notification_email)
        .bind(new.auto_approve_vacation)
        .bind(new.auto_approve_work_certificate)
        .bind(new.auto_approve_mission_order)
        .bind(&new.signature_url)
        .execute(&self.pool)
        .await?;

        self.find_admin_settings(user_id)
            .await?
            .ok_or_else(|| anyhow!("admin settings for user {user_id} vanished after insert").into())
    }

    async fn update_admin_settings(
        &self,
        user_id: u64,
        patch: &UpdateAdminSettings,
    ) -> Result<Option<AdminSettings>, AppError> {
        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "SELECT {ADMIN_SETTINGS_COLUMNS} FROM admin_settings WHERE user_id = ? FOR UPDATE"
        );
        let Some(mut settings) = sqlx::query_as::<_, AdminSettings>(&sql)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        patch.apply(&mut settings);
        settings.updated_at = Utc::now();

        sqlx::query(
            r#"
            UPDATE admin_settings
            SET notification_email = ?,
                auto_approve_vacation = ?,
                auto_approve_work_certificate = ?,
                auto_approve_mission_order = ?,
                signature_url = ?,
                updated_at = ?
            WHERE user_id = ?
            "#,
        )
        .bind(&settings.notification_email)
        .bind(settings.auto_approve_vacation)
        .bind(settings.auto_approve_work_certificate)
        .bind(settings.auto_approve_mission_order)
        .bind(&settings.signature_url)
        .bind(settings.updated_at)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(settings))
    }
}

#[async_trait]
impl SystemSettingsStore for MySqlStore {
    async fn list_system_settings(&self) -> Result<Vec<SystemSetting>, AppError> {
        let sql = format!(
            "SELECT {SYSTEM_SETTING_COLUMNS} FROM system_settings ORDER BY category, setting_key"
        );
        let rows = sqlx::query_as::<_, SystemSettingRow>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(SystemSetting::from).collect())
    }

    async fn insert_system_setting(
        &self,
        new: &NewSystemSetting,
        by: Provenance,
    ) -> Result<SystemSetting, AppError> {
        sqlx::query(
            r#"
            INSERT INTO system_settings
                (setting_key, setting_value, category, description, updated_by, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.key)
        .bind(Json(&new.value))
        .bind(&new.category)
        .bind(&new.description)
        .bind(by.user_id)
        .bind(by.at)
        .execute(&self.pool)
        .await?;

        self.fetch_system_setting(&new.key)
            .await?
            .ok_or_else(|| anyhow!("system setting {} vanished after insert", new.key).into())
    }

    async fn update_system_setting(
        &self,
        key: &str,
        patch: &UpdateSystemSetting,
        by: Provenance,
    ) -> Result<Option<SystemSetting>, AppError> {
        // rows_affected is unreliable on MySQL when nothing changed, so re-read instead.
        sqlx::query(
            r#"
            UPDATE system_settings
            SET setting_value = ?,
                category = COALESCE(?, category),
                description = COALESCE(?, description),
                updated_by = ?,
                updated_at = ?
            WHERE setting_key = ?
            "#,
        )
        .bind(Json(&patch.value))
        .bind(&patch.category)
        .bind(&patch.description)
        .bind(by.user_id)
        .bind(by.at)
        .bind(key)
        .execute(&self.pool)
        .await?;

        self.fetch_system_setting(key).await
    }
}

#[async_trait]
impl AccountStore for MySqlStore {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password, role_id
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_account(&self, new: &NewAccount) -> Result<User, AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"INSERT INTO users (username, email, password, role_id) VALUES (?, ?, ?, ?)"#,
        )
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(new.role.id())
        .execute(&mut *tx)
        .await?;
        let id = result.last_insert_id();

        sqlx::query(r#"INSERT INTO profiles (user_id, full_name) VALUES (?, ?)"#)
            .bind(id)
            .bind(&new.full_name)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(User {
            id,
            username: new.username.clone(),
            email: new.email.clone(),
            password: new.password_hash.clone(),
            role_id: new.role.id(),
        })
    }

    async fn record_login(&self, user_id: u64) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_refresh_token(
        &self,
        user_id: u64,
        jti: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (user_id, jti, expires_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(jti)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn revoke_refresh_token(&self, jti: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked = TRUE
            WHERE jti = ?
            AND revoked = FALSE
            AND expires_at > UTC_TIMESTAMP()
            "#,
        )
        .bind(jti)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
