use std::sync::Arc;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer};
use anyhow::Context;
use dotenvy::dotenv;

mod api;
mod auth;
mod config;
mod db;
mod docs;
mod error;
mod model;
mod models;
mod notify;
mod pdf;
mod routes;
mod service;
mod state;
mod store;
mod utils;

use config::Config;
use db::init_db;

use crate::notify::HttpFunctionDispatcher;
use crate::state::AppState;
use crate::store::MySqlStore;
use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa_swagger_ui::SwaggerUi;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(config.log_level)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let pool = init_db(&config.database_url).await?;

    let dispatcher = HttpFunctionDispatcher::new(
        &config.notify_function_url,
        config.notify_function_key.clone(),
        config.notify_timeout,
    )?;

    let pdf_font: Option<Arc<[u8]>> = match std::fs::read(&config.pdf_font_path) {
        Ok(bytes) => Some(bytes.into()),
        Err(e) => {
            warn!(path = %config.pdf_font_path, error = %e, "PDF font not loaded; Arabic PDF endpoint disabled");
            None
        }
    };

    let state = Data::new(AppState::new(
        &config,
        Arc::new(MySqlStore::new(pool)),
        Arc::new(dispatcher),
        pdf_font,
    ));

    // Clone values for the closure (avoid move issues)
    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", docs::openapi_for(&config.api_prefix)),
            )
            .app_data(state.clone())
            .app_data(Data::new(config.clone()))
            // Configure auth + protected routes with rate limiting
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(&server_addr)
    .with_context(|| format!("failed to bind {server_addr}"))?
    .run()
    .await
    .context("HTTP server error")
}
