use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::model::dashboard::DashboardStats;
use crate::model::request::Request;
use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DashboardErrorKind {
    NotAuthenticated,
    FetchFailed,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DashboardError {
    pub kind: DashboardErrorKind,
    pub message: String,
}

/// A user's requests plus their status counts. A failed load is reported in `error`
/// with empty data, so "no requests" and "could not load" stay distinguishable.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardView {
    pub requests: Vec<Request>,
    pub stats: DashboardStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<DashboardError>,
}

impl DashboardView {
    fn failed(kind: DashboardErrorKind, message: impl Into<String>) -> Self {
        Self {
            requests: Vec::new(),
            stats: DashboardStats::default(),
            error: Some(DashboardError {
                kind,
                message: message.into(),
            }),
        }
    }
}

pub struct DashboardService {
    store: Arc<dyn Store>,
}

impl DashboardService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Re-fetches everything on each call; nothing is patched incrementally.
    pub async fn load(&self, user: Option<&AuthUser>) -> DashboardView {
        let Some(user) = user else {
            return DashboardView::failed(DashboardErrorKind::NotAuthenticated, "Not authenticated");
        };

        match self.store.list_requests_for_user(user.user_id).await {
            Ok(requests) => {
                let stats = DashboardStats::from_requests(&requests);
                tracing::debug!(user_id = user.user_id, total = stats.total_requests, "Dashboard loaded");
                DashboardView {
                    requests,
                    stats,
                    error: None,
                }
            }
            Err(e) => {
                tracing::error!(user_id = user.user_id, error = %e, "Dashboard fetch failed");
                DashboardView::failed(DashboardErrorKind::FetchFailed, e.to_string())
            }
        }
    }
}
