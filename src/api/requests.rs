use actix_web::{HttpResponse, web};

use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::forms::RequestSubmission;
use crate::model::request::Request;
use crate::service::submission::SubmissionOutcome;
use crate::state::AppState;

/* =========================
Submit a request
========================= */
/// Validates the form, stores the request and notifies HR through the remote function.
/// A notification failure is reported in the body with `success: false`.
#[utoipa::path(
    post,
    path = "/api/requests",
    request_body(
        content = RequestSubmission,
        description = "Request type, form data and optional pre-rendered PDF",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Submission outcome", body = SubmissionOutcome,
         example = json!({ "success": true, "request_id": 12, "status": "pending" })),
        (status = 400, description = "Form failed validation",
         example = json!({
            "error": "Validation failed",
            "code": "VALIDATION_FAILED",
            "details": { "errors": [{ "field": "numberOfDays", "code": "range" }] }
         })),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Requests"
)]
pub async fn submit_request(
    auth: Option<AuthUser>,
    state: web::Data<AppState>,
    payload: web::Json<RequestSubmission>,
) -> Result<HttpResponse, AppError> {
    let submission = payload.into_inner().validate()?;
    let outcome = state.submissions.submit(auth.as_ref(), submission).await;
    Ok(HttpResponse::Ok().json(outcome))
}

/// The caller's own requests, newest first.
#[utoipa::path(
    get,
    path = "/api/requests",
    responses(
        (status = 200, description = "Own requests", body = Vec<Request>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Requests"
)]
pub async fn list_own_requests(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let requests = state.requests.list_own(&auth).await?;
    Ok(HttpResponse::Ok().json(requests))
}

#[utoipa::path(
    get,
    path = "/api/requests/{id}",
    params(("id" = u64, Path, description = "Request id")),
    responses(
        (status = 200, description = "Request found", body = Request),
        (status = 404, description = "No such request, or it belongs to someone else")
    ),
    security(("bearer_auth" = [])),
    tag = "Requests"
)]
pub async fn get_request(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
) -> Result<HttpResponse, AppError> {
    let request = state.requests.get_visible(&auth, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(request))
}
