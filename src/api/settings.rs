use actix_web::{HttpResponse, web};

use crate::auth::auth::AuthUser;
use crate::error::AppError;
use crate::model::admin_settings::{AdminSettings, NewAdminSettings, UpdateAdminSettings};
use crate::model::system_setting::{NewSystemSetting, SystemSetting, UpdateSystemSetting};
use crate::state::AppState;

/* =========================
Admin settings
========================= */
/// The calling admin's settings; a default row is created on first access.
#[utoipa::path(
    get,
    path = "/api/admin/settings",
    responses(
        (status = 200, description = "Admin settings", body = AdminSettings),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn get_admin_settings(
    auth: AuthUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let settings = state.admin_settings.get(&auth).await?;
    Ok(HttpResponse::Ok().json(settings))
}

#[utoipa::path(
    post,
    path = "/api/admin/settings",
    request_body = NewAdminSettings,
    responses(
        (status = 201, description = "Admin settings created", body = AdminSettings),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Settings already exist")
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn create_admin_settings(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<NewAdminSettings>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let settings = state
        .admin_settings
        .create(&auth, payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(settings))
}

#[utoipa::path(
    put,
    path = "/api/admin/settings",
    request_body = UpdateAdminSettings,
    responses(
        (status = 200, description = "Admin settings updated", body = AdminSettings),
        (status = 400, description = "Validation failed"),
        (status = 404, description = "No settings row yet")
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn update_admin_settings(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<UpdateAdminSettings>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let settings = state
        .admin_settings
        .update(&auth, payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(settings))
}

/* =========================
System settings
========================= */
#[utoipa::path(
    get,
    path = "/api/settings/system",
    responses((status = 200, description = "All settings by category then key", body = Vec<SystemSetting>)),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn list_system_settings(
    _auth: AuthUser,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let settings = state.system_settings.list().await?;
    Ok(HttpResponse::Ok().json(settings.as_slice()))
}

#[utoipa::path(
    get,
    path = "/api/settings/system/{key}",
    params(("key" = String, Path, description = "Setting key")),
    responses(
        (status = 200, description = "Setting found", body = SystemSetting),
        (status = 404, description = "Unknown key")
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn get_system_setting(
    _auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let setting = state.system_settings.get(&path).await?;
    Ok(HttpResponse::Ok().json(setting))
}

#[utoipa::path(
    post,
    path = "/api/settings/system",
    request_body = NewSystemSetting,
    responses(
        (status = 201, description = "Setting created", body = SystemSetting),
        (status = 403, description = "Forbidden"),
        (status = 409, description = "Key already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn create_system_setting(
    auth: AuthUser,
    state: web::Data<AppState>,
    payload: web::Json<NewSystemSetting>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let setting = state
        .system_settings
        .create(&auth, payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(setting))
}

#[utoipa::path(
    put,
    path = "/api/settings/system/{key}",
    params(("key" = String, Path, description = "Setting key")),
    request_body = UpdateSystemSetting,
    responses(
        (status = 200, description = "Setting updated", body = SystemSetting),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Unknown key")
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn update_system_setting(
    auth: AuthUser,
    state: web::Data<AppState>,
    path: web::Path<String>,
    payload: web::Json<UpdateSystemSetting>,
) -> Result<HttpResponse, AppError> {
    auth.require_admin()?;
    let setting = state
        .system_settings
        .update(&auth, &path, payload.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(setting))
}
