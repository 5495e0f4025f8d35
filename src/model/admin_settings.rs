use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::model::request::RequestType;

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow, ToSchema)]
pub struct AdminSettings {
    pub id: u64,
    pub user_id: u64,
    pub notification_email: String,
    pub auto_approve_vacation: bool,
    pub auto_approve_work_certificate: bool,
    pub auto_approve_mission_order: bool,
    pub signature_url: Option<String>,
    #[schema(format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(format = "date-time", value_type = String)]
    pub updated_at: DateTime<Utc>,
}

impl AdminSettings {
    pub fn auto_approves(&self, request_type: RequestType) -> bool {
        match request_type {
            RequestType::Vacation => self.auto_approve_vacation,
            RequestType::WorkCertificate => self.auto_approve_work_certificate,
            RequestType::MissionOrder => self.auto_approve_mission_order,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewAdminSettings {
    #[validate(email)]
    pub notification_email: String,
    #[serde(default)]
    pub auto_approve_vacation: bool,
    #[serde(default)]
    pub auto_approve_work_certificate: bool,
    #[serde(default)]
    pub auto_approve_mission_order: bool,
    #[validate(url)]
    pub signature_url: Option<String>,
}

impl NewAdminSettings {
    /// Settings provisioned on first read: notify the admin's own address, approve nothing.
    pub fn defaults_for(email: &str) -> Self {
        Self {
            notification_email: email.to_string(),
            auto_approve_vacation: false,
            auto_approve_work_certificate: false,
            auto_approve_mission_order: false,
            signature_url: None,
        }
    }
}

/// Partial update; absent fields keep their stored value. `signature_url: null` clears it.
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAdminSettings {
    #[validate(email)]
    pub notification_email: Option<String>,
    pub auto_approve_vacation: Option<bool>,
    pub auto_approve_work_certificate: Option<bool>,
    pub auto_approve_mission_order: Option<bool>,
    #[validate(url)]
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub signature_url: Option<Option<String>>,
}

impl UpdateAdminSettings {
    pub fn apply(&self, current: &mut AdminSettings) {
        if let Some(email) = &self.notification_email {
            current.notification_email = email.clone();
        }
        if let Some(v) = self.auto_approve_vacation {
            current.auto_approve_vacation = v;
        }
        if let Some(v) = self.auto_approve_work_certificate {
            current.auto_approve_work_certificate = v;
        }
        if let Some(v) = self.auto_approve_mission_order {
            current.auto_approve_mission_order = v;
        }
        if let Some(url) = &self.signature_url {
            current.signature_url = url.clone();
        }
    }
}
