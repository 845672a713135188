use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:15.0) Gecko/20100101 Firefox/15.0.1";

const DEFAULT_BULLETIN_BASE_URL: &str = "https://www.gematsu.com/tag/famitsu-sales";

const DEFAULT_REVIEW_BASE_URL: &str = "https://www.metacritic.com/browse/game/all/all/current-year/metascore/\
     ?platform=ps5&platform=xbox-series-x&platform=nintendo-switch&platform=pc&platform=mobile&platform=3ds";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_num = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_year = |var: &str| -> Result<Option<i32>, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw
                .parse::<i32>()
                .map(Some)
                .map_err(|e| ConfigError::InvalidEnvVar {
                    var: var.to_string(),
                    reason: e.to_string(),
                }),
            Err(_) => Ok(None),
        }
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("GMDB_ENV", "development"));

    let bind_raw = or_default("GMDB_BIND_ADDR", "0.0.0.0:3000");
    let bind_addr = bind_raw
        .parse::<SocketAddr>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: "GMDB_BIND_ADDR".to_string(),
            reason: e.to_string(),
        })?;
    let log_level = or_default("GMDB_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("GMDB_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("GMDB_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_num("GMDB_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let scraper_request_timeout_secs = parse_num("GMDB_SCRAPER_REQUEST_TIMEOUT_SECS", "30")?;
    let scraper_user_agent = or_default("GMDB_SCRAPER_USER_AGENT", DEFAULT_USER_AGENT);
    let scraper_inter_request_delay_ms = parse_num("GMDB_SCRAPER_INTER_REQUEST_DELAY_MS", "1000")?;
    let scraper_max_retries = parse_u32("GMDB_SCRAPER_MAX_RETRIES", "1")?;
    let scraper_retry_delay_secs = parse_num("GMDB_SCRAPER_RETRY_DELAY_SECS", "5")?;

    let bulletin_base_url = or_default("GMDB_BULLETIN_BASE_URL", DEFAULT_BULLETIN_BASE_URL);
    let bulletin_caught_up_backoff_secs =
        parse_num("GMDB_BULLETIN_CAUGHT_UP_BACKOFF_SECS", "3600")?;
    let bulletin_cron = lookup("GMDB_BULLETIN_CRON")
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let review_base_url = or_default("GMDB_REVIEW_BASE_URL", DEFAULT_REVIEW_BASE_URL);
    let review_max_pages = parse_u32("GMDB_REVIEW_MAX_PAGES", "20")?;
    let review_year_min = parse_year("GMDB_REVIEW_YEAR_MIN")?;
    let review_year_max = parse_year("GMDB_REVIEW_YEAR_MAX")?;
    if let (Some(min), Some(max)) = (review_year_min, review_year_max) {
        if min > max {
            return Err(ConfigError::InvalidEnvVar {
                var: "GMDB_REVIEW_YEAR_MIN".to_string(),
                reason: format!("{min} is after GMDB_REVIEW_YEAR_MAX ({max})"),
            });
        }
    }

    let report_window_days = parse_u32("GMDB_REPORT_WINDOW_DAYS", "90")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        scraper_request_timeout_secs,
        scraper_user_agent,
        scraper_inter_request_delay_ms,
        scraper_max_retries,
        scraper_retry_delay_secs,
        bulletin_base_url,
        bulletin_caught_up_backoff_secs,
        bulletin_cron,
        review_base_url,
        review_max_pages,
        review_year_min,
        review_year_max,
        report_window_days,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}
