use actix_web::{HttpRequest, HttpResponse, web};
use anyhow::Context;
use chrono::{TimeZone, Utc};
use serde_json::json;
use tracing::{debug, error, info, instrument};
use validator::Validate;

use crate::{
    auth::{
        auth::AuthUser,
        jwt::{generate_access_token, generate_refresh_token, verify_token},
        password::{hash_password, verify_password},
    },
    config::Config,
    error::AppError,
    model::{role::Role, user::NewAccount},
    models::{LoginReqDto, RegisterReqDto, TokenPair, TokenType},
    state::AppState,
    store::Store,
};

/// Issues an access/refresh pair and records the refresh token's `jti`.
async fn issue_tokens(
    user: &AuthUser,
    store: &dyn Store,
    config: &Config,
) -> Result<TokenPair, AppError> {
    let access_token = generate_access_token(user, &config.jwt_secret, config.access_token_ttl)
        .context("failed to sign access token")?;

    let (refresh_token, refresh_claims) =
        generate_refresh_token(user, &config.jwt_secret, config.refresh_token_ttl)
            .context("failed to sign refresh token")?;

    let expires_at = Utc
        .timestamp_opt(refresh_claims.exp as i64, 0)
        .single()
        .context("refresh token expiry out of range")?;

    debug!(user_id = user.user_id, jti = %refresh_claims.jti, "Storing refresh token");
    store
        .insert_refresh_token(user.user_id, &refresh_claims.jti, expires_at)
        .await?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

fn bearer(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

/// User registration handler. New accounts are always employees.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterReqDto,
    responses(
        (status = 201, description = "Account created"),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Username or email already taken")
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_register", skip(state, body), fields(username = %body.username))]
pub async fn register(
    body: web::Json<RegisterReqDto>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    body.validate()?;

    let username = body.username.trim().to_lowercase();
    let full_name = body
        .full_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(&username)
        .to_string();

    let account = NewAccount {
        password_hash: hash_password(&body.password)?,
        email: body.email.trim().to_lowercase(),
        username,
        role: Role::Employee,
        full_name,
    };

    let user = state.store.create_account(&account).await.map_err(|e| match e {
        AppError::Conflict(_) => AppError::Conflict("Username or email already taken".to_string()),
        other => other,
    })?;

    info!(user_id = user.id, "User registered");

    Ok(HttpResponse::Created().json(json!({
        "message": "User registered successfully",
        "user_id": user.id
    })))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Token pair", body = TokenPair),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(state, config, body),
    fields(username = %body.username)
)]
pub async fn login(
    body: web::Json<LoginReqDto>,
    state: web::Data<AppState>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    info!("Login request received");

    // 1️⃣ Basic validation
    body.validate()?;
    let username = body.username.trim().to_lowercase();

    // 2️⃣ Fetch user
    debug!("Fetching user from database");
    let Some(db_user) = state.store.find_user_by_username(&username).await? else {
        info!("Invalid credentials: user not found");
        return Err(AppError::NotAuthenticated);
    };

    // 3️⃣ Verify password
    if let Err(e) = verify_password(&body.password, &db_user.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return Err(AppError::NotAuthenticated);
    }

    let role = Role::from_id(db_user.role_id)
        .with_context(|| format!("user {} has unknown role {}", db_user.id, db_user.role_id))?;
    let user = AuthUser {
        user_id: db_user.id,
        username: db_user.username,
        email: db_user.email,
        role,
    };

    // 4️⃣ Generate and store tokens
    let tokens = issue_tokens(&user, state.store.as_ref(), &config).await?;

    // 5️⃣ Update last_login_at (non-fatal)
    if let Err(e) = state.store.record_login(user.user_id).await {
        error!(error = %e, "Failed to update last_login_at");
    }

    info!(user_id = user.user_id, "Login successful");
    Ok(HttpResponse::Ok().json(tokens))
}

/// Exchanges a live refresh token for a new pair; the old refresh token is revoked.
#[utoipa::path(
    post,
    path = "/auth/refresh",
    responses(
        (status = 200, description = "New token pair", body = TokenPair),
        (status = 401, description = "Refresh token missing, invalid, expired or already used")
    ),
    tag = "Auth",
    security(("bearer_auth" = []))
)]
#[instrument(name = "auth_refresh", skip_all)]
pub async fn refresh_token(
    req: HttpRequest,
    state: web::Data<AppState>,
    config: web::Data<Config>,
) -> Result<HttpResponse, AppError> {
    let token = bearer(&req).ok_or(AppError::NotAuthenticated)?;

    let claims = verify_token(token, &config.jwt_secret).map_err(|_| AppError::NotAuthenticated)?;
    if claims.token_type != TokenType::Refresh {
        return Err(AppError::NotAuthenticated);
    }

    // 🔥 revoke old refresh token; a second use finds nothing live
    if !state.store.revoke_refresh_token(&claims.jti).await? {
        info!(jti = %claims.jti, "Refresh token not live");
        return Err(AppError::NotAuthenticated);
    }

    // 🔄 issue new pair
    let user = AuthUser::try_from(claims)?;
    let tokens = issue_tokens(&user, state.store.as_ref(), &config).await?;

    Ok(HttpResponse::Ok().json(tokens))
}

/// Revokes the presented refresh token. Always answers 204.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 204, description = "Logged out")),
    tag = "Auth",
    security(("bearer_auth" = []))
)]
pub async fn logout(
    req: HttpRequest,
    state: web::Data<AppState>,
    config: web::Data<Config>,
) -> HttpResponse {
    // only refresh tokens can logout
    let claims = bearer(&req)
        .and_then(|token| verify_token(token, &config.jwt_secret).ok())
        .filter(|claims| claims.token_type == TokenType::Refresh);

    if let Some(claims) = claims {
        // idempotent
        if let Err(e) = state.store.revoke_refresh_token(&claims.jti).await {
            error!(error = %e, "Failed to revoke refresh token");
        }
    }

    HttpResponse::NoContent().finish()
}

#[cfg(test)]
mod tests {
    use actix_web::http::header::AUTHORIZATION;
    use actix_web::{http::StatusCode, test};
    use serde_json::{Value, json};

    use crate::api::test_app::TestApp;
    use crate::store::ProfileStore;

    #[actix_web::test]
    async fn register_login_refresh_logout() {
        let app = TestApp::without_function_calls();
        let service = test::init_service(app.build()).await;

        let req = test::TestRequest::post()
            .uri("/auth/register")
            .peer_addr(app.peer())
            .set_json(json!({
                "username": "Amina",
                "email": "amina@example.com",
                "password": "s3cret-pass",
                "full_name": "Amina Haddad"
            }))
            .to_request();
        let resp = test::call_service(&service, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        let user_id = body["user_id"].as_u64().unwrap();

        // registration also creates the profile row
        let profile = app.store.find_profile(user_id).await.unwrap().unwrap();
        assert_eq!(profile.full_name, "Amina Haddad");

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .peer_addr(app.peer())
            .set_json(json!({ "username": "amina", "password": "s3cret-pass" }))
            .to_request();
        let tokens: Value = test::call_and_read_body_json(&service, req).await;
        let access = tokens["access_token"].as_str().unwrap().to_string();
        let refresh = tokens["refresh_token"].as_str().unwrap().to_string();

        // the access token opens the protected scope
        let req = test::TestRequest::get()
            .uri("/api/profile")
            .peer_addr(app.peer())
            .insert_header((AUTHORIZATION, format!("Bearer {access}")))
            .to_request();
        let resp = test::call_service(&service, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::post()
            .uri("/auth/refresh")
            .peer_addr(app.peer())
            .insert_header((AUTHORIZATION, format!("Bearer {refresh}")))
            .to_request();
        let rotated: Value = test::call_and_read_body_json(&service, req).await;
        let new_refresh = rotated["refresh_token"].as_str().unwrap().to_string();
        assert_ne!(new_refresh, refresh);

        // the old refresh token was consumed
        let req = test::TestRequest::post()
            .uri("/auth/refresh")
            .peer_addr(app.peer())
            .insert_header((AUTHORIZATION, format!("Bearer {refresh}")))
            .to_request();
        let resp = test::call_service(&service, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::post()
            .uri("/auth/logout")
            .peer_addr(app.peer())
            .insert_header((AUTHORIZATION, format!("Bearer {new_refresh}")))
            .to_request();
        let resp = test::call_service(&service, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let req = test::TestRequest::post()
            .uri("/auth/refresh")
            .peer_addr(app.peer())
            .insert_header((AUTHORIZATION, format!("Bearer {new_refresh}")))
            .to_request();
        let resp = test::call_service(&service, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn wrong_password_and_duplicate_username() {
        let app = TestApp::without_function_calls();
        let service = test::init_service(app.build()).await;
        let account = json!({
            "username": "karim",
            "email": "karim@example.com",
            "password": "s3cret-pass"
        });

        let req = test::TestRequest::post()
            .uri("/auth/register")
            .peer_addr(app.peer())
            .set_json(&account)
            .to_request();
        assert_eq!(test::call_service(&service, req).await.status(), StatusCode::CREATED);

        let req = test::TestRequest::post()
            .uri("/auth/register")
            .peer_addr(app.peer())
            .set_json(&account)
            .to_request();
        assert_eq!(test::call_service(&service, req).await.status(), StatusCode::CONFLICT);

        let req = test::TestRequest::post()
            .uri("/auth/login")
            .peer_addr(app.peer())
            .set_json(json!({ "username": "karim", "password": "wrong-pass" }))
            .to_request();
        assert_eq!(
            test::call_service(&service, req).await.status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[actix_web::test]
    async fn short_password_is_rejected() {
        let app = TestApp::without_function_calls();
        let service = test::init_service(app.build()).await;

        let req = test::TestRequest::post()
            .uri("/auth/register")
            .peer_addr(app.peer())
            .set_json(json!({
                "username": "nadia",
                "email": "nadia@example.com",
                "password": "short"
            }))
            .to_request();
        let resp = test::call_service(&service, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
