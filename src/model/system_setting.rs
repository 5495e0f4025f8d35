use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[schema(example = json!({
    "id": 3,
    "key": "vacation.max_days_per_request",
    "value": 30,
    "category": "vacation",
    "description": "Upper bound shown on the vacation form",
    "updated_by": 1,
    "updated_at": "2026-02-11T08:00:00Z"
}))]
pub struct SystemSetting {
    pub id: u64,
    pub key: String,
    #[schema(value_type = Object)]
    pub value: Value,
    pub category: String,
    pub description: Option<String>,
    pub updated_by: Option<u64>,
    #[schema(format = "date-time", value_type = String)]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewSystemSetting {
    #[validate(length(min = 1, max = 100))]
    pub key: String,
    #[schema(value_type = Object)]
    pub value: Value,
    #[validate(length(min = 1, max = 50))]
    pub category: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateSystemSetting {
    #[schema(value_type = Object)]
    pub value: Value,
    #[validate(length(min = 1, max = 50))]
    pub category: Option<String>,
    pub description: Option<String>,
}

/// Who changed a setting and when.
#[derive(Debug, Clone, Copy)]
pub struct Provenance {
    pub user_id: u64,
    pub at: DateTime<Utc>,
}

impl Provenance {
    pub fn now(user_id: u64) -> Self {
        Self {
            user_id,
            at: Utc::now(),
        }
    }
}
