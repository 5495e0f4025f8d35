use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, anyhow};
use dotenvy::dotenv;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    pub access_token_ttl: usize,
    pub refresh_token_ttl: usize,

    // Rate limiting
    pub rate_login_per_min: u32,
    pub rate_register_per_min: u32,
    pub rate_refresh_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    // send-request-email function
    pub notify_function_url: String,
    pub notify_function_key: Option<String>,
    pub notify_timeout: Duration,

    pub settings_cache_ttl: Duration,
    /// Name put on notifications when the submitter has no profile.
    pub fallback_user_name: String,
    pub pdf_font_path: String,

    pub log_dir: String,
    pub log_level: tracing::Level,
}

fn required(key: &str) -> anyhow::Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parsed<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{key} has invalid value {raw:?}: {e}")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            access_token_ttl: parsed("ACCESS_TOKEN_TTL", 900)?, // 15 min
            refresh_token_ttl: parsed("REFRESH_TOKEN_TTL", 604_800)?, // 7 days

            rate_login_per_min: parsed("RATE_LOGIN_PER_MIN", 60)?,
            rate_register_per_min: parsed("RATE_REGISTER_PER_MIN", 30)?,
            rate_refresh_per_min: parsed("RATE_REFRESH_PER_MIN", 30)?,
            rate_protected_per_min: parsed("RATE_PROTECTED_PER_MIN", 1000)?,

            api_prefix: or_default("API_PREFIX", "/api"),

            notify_function_url: required("NOTIFY_FUNCTION_URL")?,
            notify_function_key: env::var("NOTIFY_FUNCTION_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            notify_timeout: Duration::from_secs(parsed("NOTIFY_TIMEOUT_SECS", 30)?),

            settings_cache_ttl: Duration::from_secs(parsed("SETTINGS_CACHE_TTL_SECS", 300)?),
            fallback_user_name: or_default("FALLBACK_USER_NAME", "Employee"),
            pdf_font_path: or_default("PDF_FONT_PATH", "assets/fonts/DejaVuSans.ttf"),

            log_dir: or_default("LOG_DIR", "logs"),
            log_level: parsed("LOG_LEVEL", tracing::Level::DEBUG)?,
        })
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            database_url: String::new(),
            jwt_secret: "test-secret".to_string(),
            server_addr: "127.0.0.1:0".to_string(),
            access_token_ttl: 900,
            refresh_token_ttl: 3600,
            rate_login_per_min: 1000,
            rate_register_per_min: 1000,
            rate_refresh_per_min: 1000,
            rate_protected_per_min: 1000,
            api_prefix: "/api".to_string(),
            notify_function_url: "http://localhost/functions/v1/send-request-email".to_string(),
            notify_function_key: None,
            notify_timeout: Duration::from_secs(1),
            settings_cache_ttl: Duration::from_secs(300),
            fallback_user_name: "Employee".to_string(),
            pdf_font_path: String::new(),
            log_dir: "logs".to_string(),
            log_level: tracing::Level::DEBUG,
        }
    }
}
