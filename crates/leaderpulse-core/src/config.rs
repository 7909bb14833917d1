use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;

use crate::app_config::{AppConfig, MentionMatch, NormalizeMode};
use crate::ConfigError;

/// Largest page the user-timeline endpoint will serve.
pub const MAX_PAGE_SIZE: u32 = 200;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a `HashMap`.
pub(crate) fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_num = |var: &str, default: &str| -> Result<u64, ConfigError> {
        parse_value::<u64>(var, &or_default(var, default))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        parse_value::<usize>(var, &or_default(var, default))
    };

    let data_dir = PathBuf::from(or_default("LEADERPULSE_DATA_DIR", "./data"));
    let entities_path = PathBuf::from(or_default(
        "LEADERPULSE_ENTITIES_PATH",
        "./config/entities.yaml",
    ));
    let credentials_path = PathBuf::from(or_default(
        "LEADERPULSE_CREDENTIALS_PATH",
        "./twitter-credentials.json",
    ));
    let log_level = or_default("LEADERPULSE_LOG_LEVEL", "info");
    let twitter_base_url = or_default("LEADERPULSE_TWITTER_BASE_URL", "https://api.twitter.com/");
    let user_agent = or_default("LEADERPULSE_USER_AGENT", "leaderpulse/0.1 (timeline-analytics)");

    let request_timeout_secs = parse_num("LEADERPULSE_REQUEST_TIMEOUT_SECS", "30")?;
    let max_retries = parse_value::<u32>(
        "LEADERPULSE_MAX_RETRIES",
        &or_default("LEADERPULSE_MAX_RETRIES", "3"),
    )?;
    let retry_backoff_base_secs = parse_num("LEADERPULSE_RETRY_BACKOFF_BASE_SECS", "5")?;

    let page_size = parse_value::<u32>(
        "LEADERPULSE_PAGE_SIZE",
        &or_default("LEADERPULSE_PAGE_SIZE", "200"),
    )?;
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(ConfigError::InvalidEnvVar {
            var: "LEADERPULSE_PAGE_SIZE".to_string(),
            reason: format!("must be between 1 and {MAX_PAGE_SIZE}, got {page_size}"),
        });
    }

    let max_iterations = parse_usize("LEADERPULSE_MAX_ITERATIONS", "1000")?;

    let raw_floor = or_default("LEADERPULSE_FLOOR_DATE", "2020-03-20");
    let floor_date = NaiveDate::parse_from_str(&raw_floor, "%Y-%m-%d").map_err(|e| {
        ConfigError::InvalidEnvVar {
            var: "LEADERPULSE_FLOOR_DATE".to_string(),
            reason: e.to_string(),
        }
    })?;

    let include_retweets = parse_bool(
        "LEADERPULSE_INCLUDE_RETWEETS",
        &or_default("LEADERPULSE_INCLUDE_RETWEETS", "false"),
    )?;

    let normalize_mode =
        parse_normalize_mode(&or_default("LEADERPULSE_NORMALIZE_MODE", "lemmatize"))?;
    let mention_match = parse_mention_match(&or_default("LEADERPULSE_MENTION_MATCH", "substring"))?;

    let word_min_df = parse_usize("LEADERPULSE_WORD_MIN_DF", "1")?;
    let phrase_ngram_min = parse_usize("LEADERPULSE_PHRASE_NGRAM_MIN", "2")?;
    let phrase_ngram_max = parse_usize("LEADERPULSE_PHRASE_NGRAM_MAX", "3")?;
    if phrase_ngram_min == 0 || phrase_ngram_min > phrase_ngram_max {
        return Err(ConfigError::InvalidEnvVar {
            var: "LEADERPULSE_PHRASE_NGRAM_MIN".to_string(),
            reason: format!(
                "n-gram range {phrase_ngram_min}..={phrase_ngram_max} is empty or starts at zero"
            ),
        });
    }
    let phrase_min_df = parse_usize("LEADERPULSE_PHRASE_MIN_DF", "2")?;
    let max_frequency_rows = parse_usize("LEADERPULSE_MAX_FREQUENCY_ROWS", "5000")?;

    Ok(AppConfig {
        data_dir,
        entities_path,
        credentials_path,
        log_level,
        twitter_base_url,
        request_timeout_secs,
        user_agent,
        max_retries,
        retry_backoff_base_secs,
        page_size,
        max_iterations,
        floor_date,
        include_retweets,
        normalize_mode,
        mention_match,
        word_min_df,
        phrase_ngram_min,
        phrase_ngram_max,
        phrase_min_df,
        max_frequency_rows,
    })
}

fn parse_value<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected true/false, got '{other}'"),
        }),
    }
}

/// Parse a string into a `NormalizeMode` variant.
fn parse_normalize_mode(s: &str) -> Result<NormalizeMode, ConfigError> {
    match s.trim() {
        "lemmatize" => Ok(NormalizeMode::Lemmatize),
        "strip" => Ok(NormalizeMode::StripOnly),
        other => Err(ConfigError::InvalidEnvVar {
            var: "LEADERPULSE_NORMALIZE_MODE".to_string(),
            reason: format!("expected 'lemmatize' or 'strip', got '{other}'"),
        }),
    }
}

/// Parse a string into a `MentionMatch` variant.
fn parse_mention_match(s: &str) -> Result<MentionMatch, ConfigError> {
    match s.trim() {
        "substring" => Ok(MentionMatch::Substring),
        "word" => Ok(MentionMatch::WordBoundary),
        other => Err(ConfigError::InvalidEnvVar {
            var: "LEADERPULSE_MENTION_MATCH".to_string(),
            reason: format!("expected 'substring' or 'word', got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
