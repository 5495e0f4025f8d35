use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::request::{Request, RequestFilter};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ReviewComment {
    #[schema(example = "Enjoy your leave")]
    pub comment: Option<String>,
}

/// Requests moved to approved by one auto-approval run.
#[derive(Debug, Serialize, ToSchema)]
pub struct AutoApproval {
    pub approved: usize,
    pub requests: Vec<Request>,
}

/// All requests, optionally filtered by owner, status or type.
#[utoipa::path(
    get,
    path = "/api/admin/requests",
    params(RequestFilter),
    responses(
        (status = 200, description = "Matching requests, newest first", body = Vec<Request>),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Review"
)]
pub async fn list_requests(
    auth: AuthUser,
    state: web::Data<AppState>,
    filter: web::Query<RequestFilter>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let requests = state.requests.list(&filter).await?;
    Ok(HttpResponse::Ok().json(requests))
}

#[utoipa::path(
    put,
    path = "/api/admin/requests/{id}/approve",
    params(("id" = u64, Path, description = "Request id")),
    request_body = ReviewComment,
    responses(
        (status = 200, description = "Request approved", body = Request),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is no longer pending")
    ),
    security(("bearer_auth" = [])),
    tag = "Review"
)]
pub async fn approve_request(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
    body: Option<web::Json<ReviewComment>>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let comment = body.and_then(|b| b.into_inner().comment);
    let request = state
        .requests
        .approve(&auth, path.into_inner(), comment)
        .await?;
    Ok(HttpResponse::Ok().json(request))
}

#[utoipa::path(
    put,
    path = "/api/admin/requests/{id}/reject",
    params(("id" = u64, Path, description = "Request id")),
    request_body = ReviewComment,
    responses(
        (status = 200, description = "Request rejected", body = Request),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Request not found"),
        (status = 409, description = "Request is no longer pending")
    ),
    security(("bearer_auth" = [])),
    tag = "Review"
)]
pub async fn reject_request(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<u64>,
    body: Option<web::Json<ReviewComment>>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let comment = body.and_then(|b| b.into_inner().comment);
    let request = state
        .requests
        .reject(&auth, path.into_inner(), comment)
        .await?;
    Ok(HttpResponse::Ok().json(request))
}

/// Applies the caller's auto-approve toggles to every pending request.
#[utoipa::path(
    post,
    path = "/api/admin/requests/auto-approve",
    responses(
        (status = 200, description = "Requests approved by this run", body = AutoApproval),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Review"
)]
pub async fn auto_approve_requests(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let requests = state.requests.auto_approve_pending(&auth).await?;
    Ok(HttpResponse::Ok().json(AutoApproval {
        approved: requests.len(),
        requests,
    }))
}
