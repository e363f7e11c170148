use crate::app_config::{AppConfig, Environment};
use crate::types::Platform;
use crate::ConfigError;

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
/// Unlike [`load_app_config`], this does NOT load `.env` files. Useful for
/// testing or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup, no `set_var`/`remove_var` needed.
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

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
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

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_bool = |var: &str, default: bool| -> Result<bool, ConfigError> {
        match lookup(var) {
            Err(_) => Ok(default),
            Ok(raw) => match raw.as_str() {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                other => Err(ConfigError::InvalidEnvVar {
                    var: var.to_string(),
                    reason: format!("expected true/false, got '{other}'"),
                }),
            },
        }
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("CLIPSCOUT_ENV", "development"))?;
    let bind_addr = parse_addr("CLIPSCOUT_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("CLIPSCOUT_LOG_LEVEL", "info");

    let api_keys = parse_key_list(&or_default("CLIPSCOUT_API_KEYS", ""));
    let rate_limit_max_requests = parse_u32("CLIPSCOUT_RATE_LIMIT_MAX_REQUESTS", "120")?;
    if rate_limit_max_requests == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "CLIPSCOUT_RATE_LIMIT_MAX_REQUESTS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let rate_limit_window_secs = parse_u64("CLIPSCOUT_RATE_LIMIT_WINDOW_SECS", "60")?;
    if rate_limit_window_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "CLIPSCOUT_RATE_LIMIT_WINDOW_SECS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let db_max_connections = parse_u32("CLIPSCOUT_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("CLIPSCOUT_DB_MIN_CONNECTIONS", "1")?;
    if db_min_connections > db_max_connections {
        return Err(ConfigError::InvalidEnvVar {
            var: "CLIPSCOUT_DB_MIN_CONNECTIONS".to_string(),
            reason: format!(
                "min connections ({db_min_connections}) exceeds max ({db_max_connections})"
            ),
        });
    }
    let db_acquire_timeout_secs = parse_u64("CLIPSCOUT_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let source_timeout_secs = parse_u64("CLIPSCOUT_SOURCE_TIMEOUT_SECS", "30")?;
    let source_user_agent = or_default(
        "CLIPSCOUT_SOURCE_USER_AGENT",
        "clipscout/0.1 (video-discovery)",
    );
    let per_platform_results = parse_u32("CLIPSCOUT_PER_PLATFORM_RESULTS", "5")?;
    if per_platform_results == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "CLIPSCOUT_PER_PLATFORM_RESULTS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let max_age_days = parse_u32("CLIPSCOUT_MAX_AGE_DAYS", "30")?;
    let use_fixture_sources = parse_bool("CLIPSCOUT_USE_FIXTURE_SOURCES", false)?;
    let disabled_platforms = parse_platform_list(&or_default("CLIPSCOUT_DISABLED_PLATFORMS", ""))?;

    let youtube_api_key = lookup("CLIPSCOUT_YOUTUBE_API_KEY").ok();
    let invidious_base_url = lookup("CLIPSCOUT_INVIDIOUS_BASE_URL").ok();
    let tiktok_access_token = lookup("CLIPSCOUT_TIKTOK_ACCESS_TOKEN").ok();
    let tiktok_scraper_url = lookup("CLIPSCOUT_TIKTOK_SCRAPER_URL").ok();
    let instagram_access_token = lookup("CLIPSCOUT_INSTAGRAM_ACCESS_TOKEN").ok();
    let instagram_user_id = lookup("CLIPSCOUT_INSTAGRAM_USER_ID").ok();

    let generation_api_key = lookup("CLIPSCOUT_GENERATION_API_KEY").ok();
    let generation_model = or_default("CLIPSCOUT_GENERATION_MODEL", "claude-3-5-sonnet-latest");
    let generation_timeout_secs = parse_u64("CLIPSCOUT_GENERATION_TIMEOUT_SECS", "60")?;

    let enrich_interval_ms = parse_u64("CLIPSCOUT_ENRICH_INTERVAL_MS", "3000")?;
    let enrich_top_k = parse_usize("CLIPSCOUT_ENRICH_TOP_K", "5")?;
    if enrich_top_k == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "CLIPSCOUT_ENRICH_TOP_K".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    let enrich_deadline_secs = parse_u64("CLIPSCOUT_ENRICH_DEADLINE_SECS", "0")?;

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        api_keys,
        rate_limit_max_requests,
        rate_limit_window_secs,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        source_timeout_secs,
        source_user_agent,
        per_platform_results,
        max_age_days,
        use_fixture_sources,
        disabled_platforms,
        youtube_api_key,
        invidious_base_url,
        tiktok_access_token,
        tiktok_scraper_url,
        instagram_access_token,
        instagram_user_id,
        generation_api_key,
        generation_model,
        generation_timeout_secs,
        enrich_interval_ms,
        enrich_top_k,
        enrich_deadline_secs,
    })
}

fn parse_key_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

fn parse_platform_list(raw: &str) -> Result<Vec<Platform>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<Platform>().map_err(|e| ConfigError::InvalidEnvVar {
                var: "CLIPSCOUT_DISABLED_PLATFORMS".to_string(),
                reason: e,
            })
        })
        .collect()
}

fn parse_environment(raw: &str) -> Result<Environment, ConfigError> {
    match raw {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "CLIPSCOUT_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
