use actix_web::{HttpResponse, web};

use crate::auth::auth::AuthUser;
use crate::service::dashboard::{DashboardErrorKind, DashboardView};
use crate::state::AppState;

/// The caller's requests with status counts, always freshly read.
#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Requests and counters", body = DashboardView,
         example = json!({
            "requests": [],
            "stats": {
                "total_requests": 0,
                "pending_requests": 0,
                "approved_requests": 0,
                "rejected_requests": 0
            }
         })),
        (status = 401, description = "Unauthorized", body = DashboardView),
        (status = 500, description = "Requests could not be loaded", body = DashboardView)
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn dashboard(auth: Option<AuthUser>, state: web::Data<AppState>) -> HttpResponse {
    let view = state.dashboard.load(auth.as_ref()).await;

    match view.error.as_ref().map(|e| e.kind) {
        None => HttpResponse::Ok().json(view),
        Some(DashboardErrorKind::NotAuthenticated) => HttpResponse::Unauthorized().json(view),
        Some(DashboardErrorKind::FetchFailed) => HttpResponse::InternalServerError().json(view),
    }
}
