use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum RequestType {
    Vacation,
    WorkCertificate,
    MissionOrder,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::Vacation => "vacation",
            RequestType::WorkCertificate => "work-certificate",
            RequestType::MissionOrder => "mission-order",
        }
    }
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }

    /// Only pending requests move, and only to a final decision.
    pub fn can_transition_to(self, next: RequestStatus) -> bool {
        matches!(
            (self, next),
            (RequestStatus::Pending, RequestStatus::Approved)
                | (RequestStatus::Pending, RequestStatus::Rejected)
        )
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[schema(example = json!({
    "id": 12,
    "user_id": 4,
    "request_type": "vacation",
    "data": { "fullName": "Amina Haddad", "numberOfDays": 3 },
    "status": "pending",
    "reviewed_by": null,
    "reviewed_at": null,
    "review_comment": null,
    "created_at": "2026-03-01T09:30:00Z"
}))]
pub struct Request {
    pub id: u64,
    pub user_id: u64,
    pub request_type: RequestType,
    #[schema(value_type = Object)]
    pub data: Value,
    pub status: RequestStatus,
    pub reviewed_by: Option<u64>,
    #[schema(format = "date-time", value_type = Option<String>)]
    pub reviewed_at: Option<DateTime<Utc>>,
    pub review_comment: Option<String>,
    #[schema(format = "date-time", value_type = String)]
    pub created_at: DateTime<Utc>,
}

/// Row about to be inserted; status always starts as pending.
#[derive(Debug, Clone)]
pub struct NewRequest {
    pub user_id: u64,
    pub request_type: RequestType,
    pub data: Value,
}

/// A decision applied by a reviewer.
#[derive(Debug, Clone)]
pub struct StatusChange {
    pub request_id: u64,
    pub to: RequestStatus,
    pub reviewer_id: u64,
    pub comment: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, utoipa::IntoParams)]
pub struct RequestFilter {
    /// Only requests owned by this user
    pub user_id: Option<u64>,
    /// Only requests in this status
    pub status: Option<RequestStatus>,
    /// Only requests of this type
    #[serde(rename = "type")]
    pub request_type: Option<RequestType>,
}

impl RequestFilter {
    pub fn matches(&self, request: &Request) -> bool {
        self.user_id.is_none_or(|id| id == request.user_id)
            && self.status.is_none_or(|s| s == request.status)
            && self.request_type.is_none_or(|t| t == request.request_type)
    }
}
