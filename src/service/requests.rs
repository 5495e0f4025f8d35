use std::sync::Arc;

use tracing::info;

use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::request::{Request, RequestFilter, RequestStatus, StatusChange};
use crate::store::Store;

const AUTO_APPROVAL_COMMENT: &str = "Approved automatically";

/// Reading requests and applying review decisions.
pub struct RequestService {
    store: Arc<dyn Store>,
}

impl RequestService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn list_own(&self, user: &AuthUser) -> Result<Vec<Request>, AppError> {
        self.store.list_requests_for_user(user.user_id).await
    }

    pub async fn list(&self, filter: &RequestFilter) -> Result<Vec<Request>, AppError> {
        self.store.list_requests(filter).await
    }

    /// Owners see their own requests, admins see all of them.
    pub async fn get_visible(&self, user: &AuthUser, id: u64) -> Result<Request, AppError> {
        match self.store.find_request(id).await? {
            Some(request) if request.user_id == user.user_id || user.is_admin() => Ok(request),
            // someone else's request looks the same as a missing one
            _ => Err(AppError::NotFound("Request not found".to_string())),
        }
    }

    pub async fn approve(
        &self,
        reviewer: &AuthUser,
        id: u64,
        comment: Option<String>,
    ) -> Result<Request, AppError> {
        self.decide(reviewer, id, RequestStatus::Approved, comment).await
    }

    pub async fn reject(
        &self,
        reviewer: &AuthUser,
        id: u64,
        comment: Option<String>,
    ) -> Result<Request, AppError> {
        self.decide(reviewer, id, RequestStatus::Rejected, comment).await
    }

    /// Approves every pending request whose type the admin's settings auto-approve.
    /// Requests decided concurrently by someone else are skipped.
    pub async fn auto_approve_pending(&self, admin: &AuthUser) -> Result<Vec<Request>, AppError> {
        let Some(settings) = self.store.find_admin_settings(admin.user_id).await? else {
            return Ok(Vec::new());
        };

        let pending = self
            .store
            .list_requests(&RequestFilter {
                status: Some(RequestStatus::Pending),
                ..Default::default()
            })
            .await?;

        let mut approved = Vec::new();
        for request in pending
            .into_iter()
            .filter(|r| settings.auto_approves(r.request_type))
        {
            let change = StatusChange {
                request_id: request.id,
                to: RequestStatus::Approved,
                reviewer_id: admin.user_id,
                comment: Some(AUTO_APPROVAL_COMMENT.to_string()),
            };
            if !self.store.apply_decision(&change).await? {
                continue;
            }
            if let Some(request) = self.store.find_request(request.id).await? {
                approved.push(request);
            }
        }

        info!(reviewer = admin.user_id, count = approved.len(), "Pending requests auto-approved");
        Ok(approved)
    }

    async fn decide(
        &self,
        reviewer: &AuthUser,
        id: u64,
        to: RequestStatus,
        comment: Option<String>,
    ) -> Result<Request, AppError> {
        if !RequestStatus::Pending.can_transition_to(to) {
            return Err(AppError::InvalidTransition {
                from: RequestStatus::Pending,
                to,
            });
        }

        let change = StatusChange {
            request_id: id,
            to,
            reviewer_id: reviewer.user_id,
            comment: comment.filter(|c| !c.trim().is_empty()),
        };

        if self.store.apply_decision(&change).await? {
            info!(request_id = id, reviewer = reviewer.user_id, status = %to, "Request reviewed");
            return self
                .store
                .find_request(id)
                .await?
                .ok_or_else(|| AppError::NotFound("Request not found".to_string()));
        }

        // nothing moved: either unknown, or already decided
        match self.store.find_request(id).await? {
            None => Err(AppError::NotFound("Request not found".to_string())),
            Some(current) => Err(AppError::InvalidTransition {
                from: current.status,
                to,
            }),
        }
    }
}
