use std::time::Duration;

use async_trait::async_trait;

use super::{FunctionResponse, NotificationDispatcher, NotificationPayload};
use crate::error::AppError;

/// Calls the hosted function over HTTPS with a JSON body.
pub struct HttpFunctionDispatcher {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpFunctionDispatcher {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key,
        })
    }
}

/// Maps the raw HTTP outcome onto a function response.
/// An empty or unparsable body counts as a failed call.
fn interpret(status: reqwest::StatusCode, body: &[u8]) -> FunctionResponse {
    let parsed = serde_json::from_slice::<FunctionResponse>(body).ok();
    match parsed {
        Some(response) if status.is_success() => response,
        Some(response) => FunctionResponse {
            success: false,
            error: response
                .error
                .or_else(|| Some(format!("Function returned HTTP {status}"))),
        },
        None if status.is_success() => FunctionResponse::default(),
        None => FunctionResponse::failed(format!("Function returned HTTP {status}")),
    }
}

#[async_trait]
impl NotificationDispatcher for HttpFunctionDispatcher {
    async fn dispatch(&self, payload: &NotificationPayload) -> Result<FunctionResponse, AppError> {
        let mut request = self.client.post(&self.endpoint).json(payload);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!(error = %e, endpoint = %self.endpoint, "Notification function unreachable");
            AppError::RemoteOperationFailed(format!("Notification function unreachable: {e}"))
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            tracing::error!(error = %e, %status, "Failed to read notification function response");
            AppError::RemoteOperationFailed(format!("Failed to read function response: {e}"))
        })?;

        tracing::debug!(%status, bytes = body.len(), "Notification function answered");
        Ok(interpret(status, &body))
    }
}
