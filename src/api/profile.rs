use actix_web::{HttpResponse, web};

use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::profile::{Profile, UpdateProfile};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "Caller's profile", body = Profile),
        (status = 404, description = "No profile yet")
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn get_profile(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let profile = state.profiles.get(&auth).await?;
    Ok(HttpResponse::Ok().json(profile))
}

/// Creates or replaces the caller's profile.
#[utoipa::path(
    put,
    path = "/api/profile",
    request_body = UpdateProfile,
    responses(
        (status = 200, description = "Profile saved", body = Profile),
        (status = 400, description = "Validation failed")
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn update_profile(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<UpdateProfile>,
) -> Result<HttpResponse, AppError> {
    let profile = state.profiles.upsert(&auth, payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(profile))
}
