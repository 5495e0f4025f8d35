use std::sync::Arc;

use crate::config::Config;
use crate::notify::NotificationDispatcher;
use crate::service::dashboard::DashboardService;
use crate::service::profile::ProfileService;
use crate::service::requests::RequestService;
use crate::service::settings::{AdminSettingsService, SystemSettingsService};
use crate::service::submission::SubmissionService;
use crate::store::Store;

/// Services shared by every worker, registered once as `web::Data<AppState>`.
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub submissions: SubmissionService,
    pub dashboard: DashboardService,
    pub requests: RequestService,
    pub profiles: ProfileService,
    pub admin_settings: AdminSettingsService,
    pub system_settings: SystemSettingsService,
    /// TrueType font used for Arabic PDFs; `None` when it could not be loaded at startup.
    pub pdf_font: Option<Arc<[u8]>>,
}

impl AppState {
    pub fn new(
        config: &Config,
        store: Arc<dyn Store>,
        dispatcher: Arc<dyn NotificationDispatcher>,
        pdf_font: Option<Arc<[u8]>>,
    ) -> Self {
        Self {
            submissions: SubmissionService::new(
                store.clone(),
                dispatcher,
                config.fallback_user_name.clone(),
            ),
            dashboard: DashboardService::new(store.clone()),
            requests: RequestService::new(store.clone()),
            profiles: ProfileService::new(store.clone()),
            admin_settings: AdminSettingsService::new(store.clone(), config.settings_cache_ttl),
            system_settings: SystemSettingsService::new(store.clone(), config.settings_cache_ttl),
            store,
            pdf_font,
        }
    }
}
