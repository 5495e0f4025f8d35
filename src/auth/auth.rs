use actix_web::HttpMessage;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web::Data};
use futures::future::{Ready, ready};

use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::error::AppError;
use crate::model::role::Role;
use crate::models::{Claims, TokenType};

/// The signed-in caller.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub email: String,
    pub role: Role,
}

impl TryFrom<Claims> for AuthUser {
    type Error = AppError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let role = Role::from_id(claims.role).ok_or(AppError::NotAuthenticated)?;
        Ok(AuthUser {
            user_id: claims.user_id,
            username: claims.sub,
            email: claims.email,
            role,
        })
    }
}

/// Decodes an `Authorization: Bearer <access token>` header value.
pub fn user_from_bearer(header: Option<&str>, secret: &str) -> Result<AuthUser, AppError> {
    let token = header
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(AppError::NotAuthenticated)?;

    let claims = verify_token(token, secret).map_err(|e| {
        tracing::debug!(error = %e, "Rejected bearer token");
        AppError::NotAuthenticated
    })?;

    if claims.token_type != TokenType::Access {
        return Err(AppError::NotAuthenticated);
    }
    AuthUser::try_from(claims)
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // already resolved by the auth middleware
        if let Some(user) = req.extensions().get::<AuthUser>() {
            return ready(Ok(user.clone()));
        }

        let Some(config) = req.app_data::<Data<Config>>() else {
            return ready(Err(anyhow::anyhow!("Config missing from app data").into()));
        };

        let header = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok());

        ready(user_from_bearer(header, &config.jwt_secret))
    }
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Admin only".to_string()))
        }
    }
}
