//! Outbound notification of new requests through the `send-request-email` function.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::AppError;
use crate::model::request::RequestType;

mod http;

pub use http::HttpFunctionDispatcher;

/// JSON body accepted by the remote function.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    #[serde(rename = "type")]
    pub request_type: RequestType,
    pub user_email: String,
    pub user_name: String,
    pub data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_base64: Option<String>,
}

/// What the remote function answered.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FunctionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl FunctionResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Invokes the remote function. `Err` means the call itself did not complete;
    /// a completed call that reports failure comes back as `Ok` with `success == false`.
    async fn dispatch(&self, payload: &NotificationPayload) -> Result<FunctionResponse, AppError>;
}
