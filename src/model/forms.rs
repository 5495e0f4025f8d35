//! Form schemas for the three request types.
//!
//! Field names follow the camelCase keys the request forms post, so a submitted `data` object
//! deserializes directly into the matching schema and is validated before anything is stored.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::{AppError, FieldError};
use crate::model::request::RequestType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VacationRequest {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    #[validate(length(min = 1, message = "Employee number is required"))]
    pub employee_number: String,
    #[validate(length(min = 1, message = "Grade is required"))]
    pub grade: String,
    #[schema(example = "2019-09-01", format = "date", value_type = String)]
    pub hire_date: NaiveDate,
    #[validate(length(min = 1, message = "Function is required"))]
    pub function: String,
    #[validate(length(min = 1, message = "Leave type is required"))]
    pub leave_type: String,
    #[schema(example = "2026-07-01", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-07-03", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[validate(range(min = 1, message = "At least one day is required"))]
    pub number_of_days: u32,
    #[validate(length(min = 1, message = "Reason is required"))]
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WorkCertificateRequest {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    #[validate(length(min = 1, message = "Employee number is required"))]
    pub employee_number: String,
    #[validate(length(min = 1, message = "Grade is required"))]
    pub grade: String,
    #[schema(format = "date", value_type = String)]
    pub hire_date: NaiveDate,
    #[validate(length(min = 1, message = "Function is required"))]
    pub function: String,
    #[validate(length(min = 1, message = "Purpose is required"))]
    pub purpose: String,
    /// Language the certificate should be issued in (`ar`, `fr`...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MissionOrderRequest {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    #[validate(length(min = 1, message = "Employee number is required"))]
    pub employee_number: String,
    #[validate(length(min = 1, message = "Grade is required"))]
    pub grade: String,
    #[validate(length(min = 1, message = "Function is required"))]
    pub function: String,
    #[validate(length(min = 1, message = "Destination is required"))]
    pub destination: String,
    #[validate(length(min = 1, message = "Purpose is required"))]
    pub purpose: String,
    #[schema(format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<String>,
}

/// A form payload that matched the schema of its request type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RequestPayload {
    Vacation(VacationRequest),
    WorkCertificate(WorkCertificateRequest),
    MissionOrder(MissionOrderRequest),
}

fn parse_as<T>(data: &Value) -> Result<T, AppError>
where
    T: for<'de> Deserialize<'de> + Validate,
{
    let form: T = serde_json::from_value(data.clone()).map_err(|e| {
        AppError::ValidationFailed(vec![FieldError {
            field: "data".to_string(),
            code: "invalid_shape".to_string(),
            message: Some(e.to_string()),
        }])
    })?;
    form.validate().map_err(|errors| match AppError::from(errors) {
        // report keys the way the form posts them
        AppError::ValidationFailed(fields) => AppError::ValidationFailed(
            fields
                .into_iter()
                .map(|f| FieldError {
                    field: camel_case(&f.field),
                    ..f
                })
                .collect(),
        ),
        other => other,
    })?;
    Ok(form)
}

fn camel_case(field: &str) -> String {
    let mut parts = field.split('_');
    let mut out = parts.next().unwrap_or_default().to_string();
    for part in parts {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

impl RequestPayload {
    pub fn parse(request_type: RequestType, data: &Value) -> Result<Self, AppError> {
        let payload = match request_type {
            RequestType::Vacation => RequestPayload::Vacation(parse_as(data)?),
            RequestType::WorkCertificate => RequestPayload::WorkCertificate(parse_as(data)?),
            RequestType::MissionOrder => RequestPayload::MissionOrder(parse_as(data)?),
        };

        // Date ordering is not part of the schema; keep an eye on it in the logs.
        match &payload {
            RequestPayload::Vacation(v) if v.end_date < v.start_date => {
                tracing::warn!(start = %v.start_date, end = %v.end_date, "Vacation ends before it starts");
            }
            RequestPayload::MissionOrder(m) if m.end_date < m.start_date => {
                tracing::warn!(start = %m.start_date, end = %m.end_date, "Mission ends before it starts");
            }
            _ => {}
        }

        Ok(payload)
    }

    pub fn request_type(&self) -> RequestType {
        match self {
            RequestPayload::Vacation(_) => RequestType::Vacation,
            RequestPayload::WorkCertificate(_) => RequestType::WorkCertificate,
            RequestPayload::MissionOrder(_) => RequestType::MissionOrder,
        }
    }

    /// Normalized JSON form: unknown keys dropped, dates in ISO format.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Body of `POST /requests`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[schema(example = json!({
    "type": "vacation",
    "data": {
        "fullName": "Amina Haddad",
        "employeeNumber": "E-1042",
        "grade": "B2",
        "hireDate": "2019-09-01",
        "function": "Accountant",
        "leaveType": "annual",
        "startDate": "2026-07-01",
        "endDate": "2026-07-03",
        "numberOfDays": 3,
        "reason": "Family visit"
    }
}))]
pub struct RequestSubmission {
    #[serde(rename = "type")]
    pub request_type: RequestType,
    #[schema(value_type = Object)]
    pub data: Value,
    /// Pre-rendered document attached to the notification
    pub pdf_base64: Option<String>,
}

/// A submission whose payload passed its schema; the only input the submission service accepts.
#[derive(Debug, Clone)]
pub struct ValidatedSubmission {
    pub payload: RequestPayload,
    pub pdf_base64: Option<String>,
}

impl RequestSubmission {
    pub fn validate(self) -> Result<ValidatedSubmission, AppError> {
        let payload = RequestPayload::parse(self.request_type, &self.data)?;

        let pdf_base64 = match self.pdf_base64 {
            Some(encoded) if encoded.trim().is_empty() => None,
            Some(encoded) => {
                STANDARD
                    .decode(encoded.trim())
                    .map_err(|_| AppError::validation("pdfBase64", "invalid_base64"))?;
                Some(encoded.trim().to_string())
            }
            None => None,
        };

        Ok(ValidatedSubmission {
            payload,
            pdf_base64,
        })
    }
}

impl ValidatedSubmission {
    pub fn request_type(&self) -> RequestType {
        self.payload.request_type()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    pub(crate) fn vacation_data() -> Value {
        json!({
            "fullName": "Amina Haddad",
            "employeeNumber": "E-1042",
            "grade": "B2",
            "hireDate": "2019-09-01",
            "function": "Accountant",
            "leaveType": "annual",
            "startDate": "2026-07-01",
            "endDate": "2026-07-03",
            "numberOfDays": 3,
            "reason": "Family visit"
        })
    }

    fn field_codes(err: AppError) -> Vec<(String, String)> {
        match err {
            AppError::ValidationFailed(fields) => {
                fields.into_iter().map(|f| (f.field, f.code)).collect()
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    #[test]
    fn minimal_vacation_is_accepted() {
        let payload = RequestPayload::parse(RequestType::Vacation, &vacation_data()).unwrap();
        assert_eq!(payload.request_type(), RequestType::Vacation);
    }

    #[test]
    fn empty_full_name_is_rejected() {
        let mut data = vacation_data();
        data["fullName"] = json!("");
        let err = RequestPayload::parse(RequestType::Vacation, &data).unwrap_err();
        assert_eq!(
            field_codes(err),
            vec![("fullName".to_string(), "length".to_string())]
        );
    }

    #[test]
    fn zero_days_is_rejected() {
        let mut data = vacation_data();
        data["numberOfDays"] = json!(0);
        let err = RequestPayload::parse(RequestType::Vacation, &data).unwrap_err();
        assert_eq!(
            field_codes(err),
            vec![("numberOfDays".to_string(), "range".to_string())]
        );
    }

    #[test]
    fn missing_field_is_a_shape_error() {
        let mut data = vacation_data();
        data.as_object_mut().unwrap().remove("reason");
        let err = RequestPayload::parse(RequestType::Vacation, &data).unwrap_err();
        assert_eq!(
            field_codes(err),
            vec![("data".to_string(), "invalid_shape".to_string())]
        );
    }

    #[test]
    fn field_names_follow_the_posted_keys() {
        assert_eq!(camel_case("employee_number"), "employeeNumber");
        assert_eq!(camel_case("number_of_days"), "numberOfDays");
        assert_eq!(camel_case("purpose"), "purpose");
    }

    #[test]
    fn payload_is_checked_against_its_own_type() {
        let err = RequestPayload::parse(RequestType::MissionOrder, &vacation_data()).unwrap_err();
        assert!(matches!(err, AppError::ValidationFailed(_)));
    }

    #[test]
    fn normalized_value_drops_unknown_keys() {
        let mut data = vacation_data();
        data["isAdmin"] = json!(true);
        let payload = RequestPayload::parse(RequestType::Vacation, &data).unwrap();
        let value = payload.to_value();
        assert!(value.get("isAdmin").is_none());
        assert_eq!(value["numberOfDays"], 3);
        assert_eq!(value["startDate"], "2026-07-01");
    }

    #[test]
    fn work_certificate_requires_purpose() {
        let data = json!({
            "fullName": "Amina Haddad",
            "employeeNumber": "E-1042",
            "grade": "B2",
            "hireDate": "2019-09-01",
            "function": "Accountant",
            "purpose": ""
        });
        let err = RequestPayload::parse(RequestType::WorkCertificate, &data).unwrap_err();
        assert_eq!(
            field_codes(err),
            vec![("purpose".to_string(), "length".to_string())]
        );
    }

    #[test]
    fn invalid_pdf_attachment_is_rejected() {
        let submission = RequestSubmission {
            request_type: RequestType::Vacation,
            data: vacation_data(),
            pdf_base64: Some("not base64 !!".to_string()),
        };
        let err = submission.validate().unwrap_err();
        assert_eq!(
            field_codes(err),
            vec![("pdfBase64".to_string(), "invalid_base64".to_string())]
        );
    }

    #[test]
    fn valid_pdf_attachment_is_kept() {
        let submission = RequestSubmission {
            request_type: RequestType::Vacation,
            data: vacation_data(),
            pdf_base64: Some(STANDARD.encode(b"%PDF-1.3")),
        };
        let validated = submission.validate().unwrap();
        assert_eq!(validated.request_type(), RequestType::Vacation);
        assert!(validated.pdf_base64.is_some());
    }
}
