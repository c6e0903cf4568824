// backend/src/config.rs

use std::env;

use anyhow::Context;
use chrono_tz::Tz;

/// Bounds applied to the free-text feedback field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedbackLimits {
    pub max_words: usize,
    pub max_chars: usize,
}

impl Default for FeedbackLimits {
    fn default() -> Self {
        Self { max_words: 200, max_chars: 2000 }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub max_connections: u32,
    pub run_migrations: bool,
    pub cors_allow_origin: String,
    pub business_tz: Tz,
    pub feedback: FeedbackLimits,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = get("DATABASE_URL").context("DATABASE_URL must be set")?;
        let defaults = FeedbackLimits::default();

        Ok(Self {
            database_url,
            port: parse_or(&get, "PORT", 8080)?,
            max_connections: parse_or(&get, "DB_MAX_CONNECTIONS", 10)?,
            run_migrations: parse_or(&get, "RUN_MIGRATIONS", false)?,
            cors_allow_origin: get("CORS_ALLOW_ORIGIN").unwrap_or_else(|| "*".into()),
            business_tz: parse_or(&get, "BUSINESS_TIMEZONE", Tz::UTC)?,
            feedback: FeedbackLimits {
                max_words: parse_or(&get, "FEEDBACK_MAX_WORDS", defaults.max_words)?,
                max_chars: parse_or(&get, "FEEDBACK_MAX_CHARS", defaults.max_chars)?,
            },
        })
    }
}

fn parse_or<F, T>(get: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid {key}='{raw}': {e}")),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let cfg = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://x/y")])).unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.max_connections, 10);
        assert!(!cfg.run_migrations);
        assert_eq!(cfg.feedback, FeedbackLimits::default());
        assert_eq!(cfg.business_tz, Tz::UTC);
    }

    #[test]
    fn missing_database_url_is_an_error() {
        assert!(Config::from_lookup(lookup(&[("PORT", "9000")])).is_err());
    }

    #[test]
    fn malformed_numbers_are_reported() {
        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x/y"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn unknown_time_zone_is_reported() {
        let err = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x/y"),
            ("BUSINESS_TIMEZONE", "Mars/Olympus"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("BUSINESS_TIMEZONE"));
    }

    #[test]
    fn overrides_are_read() {
        let cfg = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x/y"),
            ("RUN_MIGRATIONS", "true"),
            ("FEEDBACK_MAX_WORDS", "50"),
            ("BUSINESS_TIMEZONE", "Asia/Kolkata"),
        ]))
        .unwrap();
        assert!(cfg.run_migrations);
        assert_eq!(cfg.business_tz, chrono_tz::Asia::Kolkata);
        assert_eq!(cfg.feedback.max_words, 50);
    }
}
