use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::forms::ValidatedSubmission;
use crate::model::request::{NewRequest, Request, RequestStatus};
use crate::notify::{NotificationDispatcher, NotificationPayload};
use crate::store::Store;

const GENERIC_FAILURE: &str = "Failed to send the request notification";

/// Result of a submission. Failures carry a message meant for the person who submitted.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SubmissionOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Id of the stored request, when it got that far
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RequestStatus>,
}

impl SubmissionOutcome {
    fn succeeded(request: &Request) -> Self {
        Self {
            success: true,
            error: None,
            request_id: Some(request.id),
            status: Some(request.status),
        }
    }

    fn failed(request: Option<&Request>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            request_id: request.map(|r| r.id),
            status: request.map(|r| r.status),
        }
    }
}

pub struct SubmissionService {
    store: Arc<dyn Store>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    fallback_user_name: String,
}

impl SubmissionService {
    pub fn new(
        store: Arc<dyn Store>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        fallback_user_name: impl Into<String>,
    ) -> Self {
        Self {
            store,
            dispatcher,
            fallback_user_name: fallback_user_name.into(),
        }
    }

    /// Stores the request as pending and notifies through the remote function.
    /// Never returns an error: every failure is folded into the outcome.
    #[instrument(
        name = "submit_request",
        skip(self, user, submission),
        fields(user_id = ?user.map(|u| u.user_id), request_type = %submission.request_type())
    )]
    pub async fn submit(
        &self,
        user: Option<&AuthUser>,
        submission: ValidatedSubmission,
    ) -> SubmissionOutcome {
        // 1️⃣ who is submitting
        let Some(user) = user else {
            warn!("Submission without an authenticated user");
            return SubmissionOutcome::failed(None, AppError::NotAuthenticated.to_string());
        };

        // 2️⃣ display name, tolerating a missing profile
        let user_name = self.resolve_user_name(user.user_id).await;
        debug!(%user_name, "Resolved requester name");

        // 3️⃣ persist as pending
        let data = submission.payload.to_value();
        let request_type = submission.request_type();
        let request = match self
            .store
            .insert_request(NewRequest {
                user_id: user.user_id,
                request_type,
                data: data.clone(),
            })
            .await
        {
            Ok(request) => request,
            Err(e) => {
                error!(error = %e, "Failed to store request");
                return SubmissionOutcome::failed(None, e.to_string());
            }
        };
        info!(request_id = request.id, "Request stored as pending");

        // 4️⃣ notify
        let payload = NotificationPayload {
            request_type,
            user_email: user.email.clone(),
            user_name,
            data,
            pdf_base64: submission.pdf_base64,
        };
        debug!(
            request_id = request.id,
            with_pdf = payload.pdf_base64.is_some(),
            "Dispatching notification"
        );

        // 5️⃣ interpret the function's answer
        match self.dispatcher.dispatch(&payload).await {
            Ok(response) if response.success => {
                info!(request_id = request.id, "Notification sent");
                SubmissionOutcome::succeeded(&request)
            }
            Ok(response) => {
                let message = response
                    .error
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| GENERIC_FAILURE.to_string());
                warn!(request_id = request.id, error = %message, "Notification function reported failure");
                SubmissionOutcome::failed(Some(&request), message)
            }
            Err(e) => {
                error!(request_id = request.id, error = %e, "Notification dispatch failed");
                SubmissionOutcome::failed(Some(&request), e.to_string())
            }
        }
    }

    async fn resolve_user_name(&self, user_id: u64) -> String {
        match self.store.find_profile(user_id).await {
            Ok(Some(profile)) if !profile.full_name.trim().is_empty() => profile.full_name,
            Ok(_) => {
                debug!(user_id, "No profile name, using fallback");
                self.fallback_user_name.clone()
            }
            Err(e) => {
                warn!(user_id, error = %e, "Profile lookup failed, using fallback name");
                self.fallback_user_name.clone()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::admin_settings::NewAdminSettings;
    use crate::model::forms::RequestSubmission;
    use crate::model::forms::tests::vacation_data;
    use crate::model::profile::Profile;
    use crate::model::request::RequestType;
    use crate::notify::{FunctionResponse, MockNotificationDispatcher};
    use crate::service::dashboard::DashboardService;
    use crate::service::test_support::employee;
    use crate::store::memory::MemoryStore;
    use crate::store::{AdminSettingsStore, RequestStore};

    fn vacation() -> ValidatedSubmission {
        RequestSubmission {
            request_type: RequestType::Vacation,
            data: vacation_data(),
            pdf_base64: None,
        }
        .validate()
        .unwrap()
    }

    fn service(store: Arc<MemoryStore>, dispatcher: MockNotificationDispatcher) -> SubmissionService {
        SubmissionService::new(store, Arc::new(dispatcher), "Employee")
    }

    #[actix_web::test]
    async fn anonymous_submission_never_reaches_the_function() {
        let store = Arc::new(MemoryStore::new());
        let mut dispatcher = MockNotificationDispatcher::new();
        dispatcher.expect_dispatch().times(0);

        let outcome = service(store.clone(), dispatcher).submit(None, vacation()).await;

        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("Not authenticated"));
        assert!(store.list_requests_for_user(1).await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn function_error_message_is_propagated() {
        let store = Arc::new(MemoryStore::new());
        let mut dispatcher = MockNotificationDispatcher::new();
        dispatcher
            .expect_dispatch()
            .times(1)
            .returning(|_| Ok(FunctionResponse::failed("X")));

        let user = employee(1);
        let outcome = service(store, dispatcher)
            .submit(Some(&user), vacation())
            .await;

        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("X"));
    }

    #[actix_web::test]
    async fn falsy_response_uses_generic_message() {
        let store = Arc::new(MemoryStore::new());
        let mut dispatcher = MockNotificationDispatcher::new();
        dispatcher
            .expect_dispatch()
            .returning(|_| Ok(FunctionResponse::default()));

        let user = employee(1);
        let outcome = service(store, dispatcher)
            .submit(Some(&user), vacation())
            .await;

        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some(GENERIC_FAILURE));
    }

    #[actix_web::test]
    async fn transport_error_becomes_failure_result() {
        let store = Arc::new(MemoryStore::new());
        let mut dispatcher = MockNotificationDispatcher::new();
        dispatcher.expect_dispatch().returning(|_| {
            Err(AppError::RemoteOperationFailed(
                "Notification function unreachable: timeout".to_string(),
            ))
        });

        let user = employee(1);
        let outcome = service(store, dispatcher)
            .submit(Some(&user), vacation())
            .await;

        assert!(!outcome.success);
        assert_eq!(
            outcome.error.as_deref(),
            Some("Notification function unreachable: timeout")
        );
        assert_eq!(outcome.request_id, Some(1));
    }

    #[actix_web::test]
    async fn success_has_no_error() {
        let store = Arc::new(MemoryStore::new());
        let mut dispatcher = MockNotificationDispatcher::new();
        dispatcher
            .expect_dispatch()
            .returning(|_| Ok(FunctionResponse::ok()));

        let user = employee(1);
        let outcome = service(store, dispatcher)
            .submit(Some(&user), vacation())
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.error, None);
        assert_eq!(outcome.status, Some(RequestStatus::Pending));
    }

    #[actix_web::test]
    async fn payload_carries_profile_name_and_email() {
        let store = Arc::new(MemoryStore::new().with_profile(Profile {
            user_id: 7,
            full_name: "Amina Haddad".to_string(),
            employee_number: None,
            grade: None,
            job_function: None,
            hire_date: None,
        }));
        let mut dispatcher = MockNotificationDispatcher::new();
        dispatcher
            .expect_dispatch()
            .withf(|p| {
                p.user_name == "Amina Haddad"
                    && p.user_email == "user7@example.com"
                    && p.request_type == RequestType::Vacation
                    && p.data["numberOfDays"] == 3
            })
            .returning(|_| Ok(FunctionResponse::ok()));

        let user = employee(7);
        let outcome = service(store, dispatcher)
            .submit(Some(&user), vacation())
            .await;
        assert!(outcome.success);
    }

    #[actix_web::test]
    async fn missing_profile_falls_back_to_placeholder() {
        let store = Arc::new(MemoryStore::new());
        let mut dispatcher = MockNotificationDispatcher::new();
        dispatcher
            .expect_dispatch()
            .withf(|p| p.user_name == "Employee")
            .returning(|_| Ok(FunctionResponse::ok()));

        let user = employee(3);
        let outcome = service(store, dispatcher)
            .submit(Some(&user), vacation())
            .await;
        assert!(outcome.success);
    }

    #[actix_web::test]
    async fn store_failure_skips_notification() {
        let store = Arc::new(MemoryStore::new());
        store.fail_all();
        let mut dispatcher = MockNotificationDispatcher::new();
        dispatcher.expect_dispatch().times(0);

        let user = employee(1);
        let outcome = service(store, dispatcher)
            .submit(Some(&user), vacation())
            .await;

        assert!(!outcome.success);
        assert_eq!(outcome.request_id, None);
    }

    #[actix_web::test]
    async fn auto_approve_settings_leave_submission_pending() {
        let store = Arc::new(MemoryStore::new());
        let mut settings = NewAdminSettings::defaults_for("hr@example.com");
        settings.auto_approve_vacation = true;
        store.insert_admin_settings(99, &settings).await.unwrap();

        let mut dispatcher = MockNotificationDispatcher::new();
        dispatcher
            .expect_dispatch()
            .returning(|_| Ok(FunctionResponse::ok()));

        let user = employee(1);
        let outcome = service(store.clone(), dispatcher)
            .submit(Some(&user), vacation())
            .await;

        assert_eq!(outcome.status, Some(RequestStatus::Pending));
        let stored = store.find_request(1).await.unwrap().unwrap();
        assert_eq!(stored.status, RequestStatus::Pending);
        assert_eq!(stored.reviewed_by, None);
    }

    #[actix_web::test]
    async fn submission_shows_up_on_dashboard() {
        let store = Arc::new(MemoryStore::new());
        let mut dispatcher = MockNotificationDispatcher::new();
        dispatcher
            .expect_dispatch()
            .returning(|_| Ok(FunctionResponse::ok()));
        let submissions = service(store.clone(), dispatcher);
        let dashboard = DashboardService::new(store.clone());
        let user = employee(1);

        let before = dashboard.load(Some(&user)).await.stats;
        let outcome = submissions.submit(Some(&user), vacation()).await;
        assert!(outcome.success);
        let after = dashboard.load(Some(&user)).await.stats;

        assert_eq!(after.total_requests, before.total_requests + 1);
        assert_eq!(after.pending_requests, before.pending_requests + 1);
    }
}
