use crate::{
    api::{admin, dashboard, pdf, profile, requests, settings},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
    error::AppError,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

// Helper to build per-route limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond((60_000 / requests_per_min as u64).max(1))
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .expect("non-zero period and burst size");
    Governor::new(&cfg)
}

/// Malformed JSON bodies and query strings answer with the usual error body.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        tracing::debug!(error = %err, "Rejected JSON body");
        AppError::validation("body", "invalid_json").into()
    })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        tracing::debug!(error = %err, "Rejected query string");
        AppError::validation("query", "invalid_query").into()
    })
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let refresh_limiter = Arc::new(build_limiter(config.rate_refresh_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    cfg.app_data(json_config()).app_data(query_config());

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(register_limiter.clone())
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/refresh")
                    .wrap(refresh_limiter.clone())
                    .route(web::post().to(handlers::refresh_token)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/requests")
                    // /requests
                    .service(
                        web::resource("")
                            .route(web::post().to(requests::submit_request))
                            .route(web::get().to(requests::list_own_requests)),
                    )
                    // /requests/{id}
                    .service(web::resource("/{id}").route(web::get().to(requests::get_request))),
            )
            .service(web::resource("/dashboard").route(web::get().to(dashboard::dashboard)))
            .service(
                web::resource("/profile")
                    .route(web::get().to(profile::get_profile))
                    .route(web::put().to(profile::update_profile)),
            )
            .service(
                web::scope("/admin")
                    .service(
                        web::resource("/requests").route(web::get().to(admin::list_requests)),
                    )
                    .service(
                        web::resource("/requests/auto-approve")
                            .route(web::post().to(admin::auto_approve_requests)),
                    )
                    // /admin/requests/{id}/approve
                    .service(
                        web::resource("/requests/{id}/approve")
                            .route(web::put().to(admin::approve_request)),
                    )
                    // /admin/requests/{id}/reject
                    .service(
                        web::resource("/requests/{id}/reject")
                            .route(web::put().to(admin::reject_request)),
                    )
                    .service(
                        web::resource("/settings")
                            .route(web::get().to(settings::get_admin_settings))
                            .route(web::post().to(settings::create_admin_settings))
                            .route(web::put().to(settings::update_admin_settings)),
                    ),
            )
            .service(
                web::scope("/settings/system")
                    .service(
                        web::resource("")
                            .route(web::get().to(settings::list_system_settings))
                            .route(web::post().to(settings::create_system_setting)),
                    )
                    .service(
                        web::resource("/{key}")
                            .route(web::get().to(settings::get_system_setting))
                            .route(web::put().to(settings::update_system_setting)),
                    ),
            )
            .service(web::resource("/pdf/arabic").route(web::get().to(pdf::arabic_pdf))),
    );
}

// LOGIN
//  ├─ access_token (15 min)
//  └─ refresh_token (7 days)

// API REQUEST
//  └─ Authorization: Bearer access_token

// ACCESS EXPIRED
//  └─ POST /auth/refresh with refresh_token
//       └─ returns new access_token + rotated refresh_token
