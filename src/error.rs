use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde::Serialize;
use serde_json::{Value, json};

use crate::model::request::RequestStatus;

/// One rejected field of a submitted form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FieldError {
    pub fn new(field: &str, code: &str) -> Self {
        Self {
            field: field.to_string(),
            code: code.to_string(),
            message: None,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

#[derive(Debug, Display)]
pub enum AppError {
    #[display(fmt = "Not authenticated")]
    NotAuthenticated,
    #[display(fmt = "{}", _0)]
    Forbidden(String),
    #[display(fmt = "{}", _0)]
    NotFound(String),
    #[display(fmt = "{}", _0)]
    Conflict(String),
    #[display(fmt = "Request cannot move from {} to {}", from, to)]
    InvalidTransition {
        from: RequestStatus,
        to: RequestStatus,
    },
    #[display(fmt = "Validation failed")]
    ValidationFailed(Vec<FieldError>),
    /// The notification function (or another remote callable) failed.
    #[display(fmt = "{}", _0)]
    RemoteOperationFailed(String),
    #[display(fmt = "Internal server error")]
    Internal(anyhow::Error),
}

impl std::error::Error for AppError {}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotAuthenticated => "NOT_AUTHENTICATED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::InvalidTransition { .. } => "INVALID_TRANSITION",
            AppError::ValidationFailed(_) => "VALIDATION_FAILED",
            AppError::RemoteOperationFailed(_) => "REMOTE_OPERATION_FAILED",
            AppError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn validation(field: &str, code: &str) -> Self {
        AppError::ValidationFailed(vec![FieldError::new(field, code)])
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) | AppError::InvalidTransition { .. } => StatusCode::CONFLICT,
            AppError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            AppError::RemoteOperationFailed(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Internal(err) = self {
            tracing::error!(error = ?err, "Internal server error");
        }

        let details = match self {
            AppError::ValidationFailed(errors) => Some(json!({ "errors": errors })),
            AppError::InvalidTransition { from, to } => Some(json!({
                "from": from.to_string(),
                "to": to.to_string(),
            })),
            _ => None,
        };

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
            code: self.code(),
            details,
        })
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("Resource not found".to_string()),
            // 23000: integrity constraint violation (duplicate key)
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23000") => {
                AppError::Conflict("Resource already exists".to_string())
            }
            other => AppError::Internal(other.into()),
        }
    }
}

/// Errors shared between coalesced cache readers come back behind an `Arc`.
impl From<std::sync::Arc<AppError>> for AppError {
    fn from(shared: std::sync::Arc<AppError>) -> Self {
        match std::sync::Arc::try_unwrap(shared) {
            Ok(err) => err,
            Err(shared) => match &*shared {
                AppError::NotAuthenticated => AppError::NotAuthenticated,
                AppError::Forbidden(m) => AppError::Forbidden(m.clone()),
                AppError::NotFound(m) => AppError::NotFound(m.clone()),
                AppError::Conflict(m) => AppError::Conflict(m.clone()),
                AppError::InvalidTransition { from, to } => AppError::InvalidTransition {
                    from: *from,
                    to: *to,
                },
                AppError::ValidationFailed(fields) => AppError::ValidationFailed(fields.clone()),
                AppError::RemoteOperationFailed(m) => AppError::RemoteOperationFailed(m.clone()),
                AppError::Internal(e) => AppError::Internal(anyhow::anyhow!("{e:#}")),
            },
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| FieldError {
                    field: field.to_string(),
                    code: e.code.to_string(),
                    message: e.message.as_ref().map(|m| m.to_string()),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        AppError::ValidationFailed(fields)
    }
}
