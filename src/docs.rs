use crate::api::admin::{AutoApproval, ReviewComment};
use crate::model::admin_settings::{AdminSettings, NewAdminSettings, UpdateAdminSettings};
use crate::model::dashboard::DashboardStats;
use crate::model::forms::{
    MissionOrderRequest, RequestSubmission, VacationRequest, WorkCertificateRequest,
};
use crate::model::profile::{Profile, UpdateProfile};
use crate::model::request::{Request, RequestStatus, RequestType};
use crate::model::system_setting::{NewSystemSetting, SystemSetting, UpdateSystemSetting};
use crate::models::{LoginReqDto, RegisterReqDto, TokenPair};
use crate::service::dashboard::{DashboardError, DashboardErrorKind, DashboardView};
use crate::service::submission::SubmissionOutcome;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HR Requests API",
        version = "1.0.0",
        description = r#"
## HR Request Management

Employees submit administrative requests and follow their status; administrators review them.

### 🔹 Key Features
- **Requests**
  - Vacation, work certificate and mission order forms, validated field by field
  - Every submission notifies HR through the `send-request-email` function
- **Dashboard**
  - Own requests with pending / approved / rejected counters
- **Review**
  - Approve or reject pending requests; decisions are final
- **Settings**
  - Per-admin notification and auto-approval settings, shared system settings
- **Arabic PDF**
  - Right-to-left documents rendered with joined letter forms

### 🔐 Security
Endpoints under `/api` require a **JWT Bearer** access token obtained from `/auth/login`.
Review and settings writes are restricted to the **Admin** role.
"#,
    ),
    paths(
        crate::auth::handlers::register,
        crate::auth::handlers::login,
        crate::auth::handlers::refresh_token,
        crate::auth::handlers::logout,

        crate::api::requests::submit_request,
        crate::api::requests::list_own_requests,
        crate::api::requests::get_request,

        crate::api::dashboard::dashboard,

        crate::api::profile::get_profile,
        crate::api::profile::update_profile,

        crate::api::admin::list_requests,
        crate::api::admin::approve_request,
        crate::api::admin::reject_request,
        crate::api::admin::auto_approve_requests,

        crate::api::settings::get_admin_settings,
        crate::api::settings::create_admin_settings,
        crate::api::settings::update_admin_settings,
        crate::api::settings::list_system_settings,
        crate::api::settings::get_system_setting,
        crate::api::settings::create_system_setting,
        crate::api::settings::update_system_setting,

        crate::api::pdf::arabic_pdf
    ),
    components(
        schemas(
            RegisterReqDto,
            LoginReqDto,
            TokenPair,
            RequestType,
            RequestStatus,
            Request,
            RequestSubmission,
            VacationRequest,
            WorkCertificateRequest,
            MissionOrderRequest,
            SubmissionOutcome,
            DashboardStats,
            DashboardView,
            DashboardError,
            DashboardErrorKind,
            Profile,
            UpdateProfile,
            ReviewComment,
            AutoApproval,
            AdminSettings,
            NewAdminSettings,
            UpdateAdminSettings,
            SystemSetting,
            NewSystemSetting,
            UpdateSystemSetting
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registration, login and token rotation"),
        (name = "Requests", description = "Submitting and reading requests"),
        (name = "Dashboard", description = "Own requests with status counters"),
        (name = "Profile", description = "Employee profile"),
        (name = "Review", description = "Approving and rejecting requests"),
        (name = "Settings", description = "Admin and system settings"),
        (name = "PDF", description = "Arabic PDF rendering"),
    )
)]
pub struct ApiDoc;

/// Prefix the path annotations are written against.
const DOCUMENTED_PREFIX: &str = "/api";

/// The generated document with the protected paths moved from `/api` to the configured prefix.
/// `/auth` routes are mounted outside the prefix and stay as they are.
pub fn openapi_for(prefix: &str) -> openapi::OpenApi {
    let prefix = prefix.trim_end_matches('/');
    let mut doc = ApiDoc::openapi();
    doc.paths.paths = std::mem::take(&mut doc.paths.paths)
        .into_iter()
        .map(|(path, item)| match path.strip_prefix(DOCUMENTED_PREFIX) {
            Some(rest) => (format!("{prefix}{rest}"), item),
            None => (path, item),
        })
        .collect();
    doc
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
