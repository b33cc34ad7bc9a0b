use crate::{cache::Category, error::DashboardError};
use log::warn;
use std::{collections::HashMap, env, str::FromStr, time::Duration};

pub const DEFAULT_IEX_BASE_URL: &str = "https://cloud.iexapis.com/stable";
pub const DEFAULT_STOCKTWITS_BASE_URL: &str = "https://api.stocktwits.com/api/2";

#[derive(Clone)]
pub struct Config {
    pub iex_api_token: String,
    pub iex_base_url: String,
    pub stocktwits_base_url: String,
    pub redis_url: String,
    pub redis_timeout_ms: u64,
    pub cache_ttl_overrides: HashMap<Category, u64>,
    pub http_timeout_ms: u64,
    pub http_max_concurrent: usize,
    pub http_min_delay_ms: u64,
    pub news_article_count: usize,
    pub log_level: log::LevelFilter,
}

// Keeps the token out of logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("iex_api_token", &mask(&self.iex_api_token))
            .field("iex_base_url", &self.iex_base_url)
            .field("stocktwits_base_url", &self.stocktwits_base_url)
            .field("redis_url", &self.redis_url)
            .field("redis_timeout_ms", &self.redis_timeout_ms)
            .field("cache_ttl_overrides", &self.cache_ttl_overrides)
            .field("http_timeout_ms", &self.http_timeout_ms)
            .field("http_max_concurrent", &self.http_max_concurrent)
            .field("http_min_delay_ms", &self.http_min_delay_ms)
            .field("news_article_count", &self.news_article_count)
            .field("log_level", &self.log_level)
            .finish()
    }
}

fn mask(secret: &str) -> String {
    if secret.is_empty() {
        "<unset>".to_string()
    } else {
        format!("{}***", secret.chars().take(4).collect::<String>())
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> T {
    match lookup(name) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring unparsable {}='{}'", name, raw);
            default
        }),
        None => default,
    }
}

/// Parses `stats:3600,news:600`. Unknown categories and bad numbers are skipped with a warning.
pub fn parse_ttl_overrides(raw: &str) -> HashMap<Category, u64> {
    raw.split(',')
        .filter(|part| !part.trim().is_empty())
        .filter_map(|part| {
            let mut kv = part.splitn(2, ':');
            let name = kv.next()?.trim();
            let secs = kv.next().map(str::trim);
            match (name.parse::<Category>(), secs.and_then(|s| s.parse::<u64>().ok())) {
                (Ok(category), Some(secs)) => Some((category, secs)),
                _ => {
                    warn!("Ignoring invalid CACHE_TTL_SECS entry '{}'", part.trim());
                    None
                }
            }
        })
        .collect()
}

impl Config {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from any name -> value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let redis_url = lookup("REDIS_URL").unwrap_or_else(|| {
            let host = lookup("REDIS_HOST").unwrap_or_else(|| "localhost".to_string());
            let port: u16 = parse_or(&lookup, "REDIS_PORT", 6379);
            format!("redis://{}:{}/", host, port)
        });

        Config {
            iex_api_token: lookup("IEX_API_TOKEN").unwrap_or_default().trim().to_string(),
            iex_base_url: lookup("IEX_BASE_URL")
                .unwrap_or_else(|| DEFAULT_IEX_BASE_URL.to_string()),
            stocktwits_base_url: lookup("STOCKTWITS_BASE_URL")
                .unwrap_or_else(|| DEFAULT_STOCKTWITS_BASE_URL.to_string()),
            redis_url,
            redis_timeout_ms: parse_or(&lookup, "REDIS_TIMEOUT_MS", 1_000),
            cache_ttl_overrides: lookup("CACHE_TTL_SECS")
                .map(|raw| parse_ttl_overrides(&raw))
                .unwrap_or_default(),
            http_timeout_ms: parse_or(&lookup, "HTTP_TIMEOUT_MS", 10_000),
            http_max_concurrent: parse_or(&lookup, "HTTP_MAX_CONCURRENT", 4),
            http_min_delay_ms: parse_or(&lookup, "HTTP_MIN_DELAY_MS", 10),
            news_article_count: parse_or(&lookup, "NEWS_ARTICLE_COUNT", 10),
            log_level: parse_or(&lookup, "LOG_LEVEL", log::LevelFilter::Info),
        }
    }

    pub fn validate(&self) -> Result<(), DashboardError> {
        if self.iex_api_token.is_empty() {
            return Err(DashboardError::ConfigError(
                "IEX_API_TOKEN must be set".to_string(),
            ));
        }
        if self.http_timeout_ms == 0 {
            return Err(DashboardError::ConfigError(
                "HTTP_TIMEOUT_MS must be greater than zero".to_string(),
            ));
        }
        if self.redis_timeout_ms == 0 {
            return Err(DashboardError::ConfigError(
                "REDIS_TIMEOUT_MS must be greater than zero".to_string(),
            ));
        }
        if self.http_max_concurrent == 0 {
            return Err(DashboardError::ConfigError(
                "HTTP_MAX_CONCURRENT must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn log_settings(&self) {
        log::info!("Application Configuration Loaded: {:?}", self);
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }

    pub fn redis_timeout(&self) -> Duration {
        Duration::from_millis(self.redis_timeout_ms)
    }

    pub fn http_min_delay(&self) -> Duration {
        Duration::from_millis(self.http_min_delay_ms)
    }

    pub fn test_default() -> Self {
        Self::from_lookup(|name| match name {
            "IEX_API_TOKEN" => Some("pk_test_token".to_string()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.iex_base_url, DEFAULT_IEX_BASE_URL);
        assert_eq!(config.stocktwits_base_url, DEFAULT_STOCKTWITS_BASE_URL);
        assert_eq!(config.redis_url, "redis://localhost:6379/");
        assert_eq!(config.http_timeout_ms, 10_000);
        assert_eq!(config.news_article_count, 10);
        assert_eq!(config.log_level, log::LevelFilter::Info);
        assert!(config.cache_ttl_overrides.is_empty());
    }

    #[test]
    fn test_missing_token_fails_validation() {
        let config = Config::from_lookup(|_| None);
        assert!(matches!(config.validate(), Err(DashboardError::ConfigError(_))));
        assert!(Config::test_default().validate().is_ok());
    }

    #[test]
    fn test_zero_timeouts_fail_validation() {
        for name in ["HTTP_TIMEOUT_MS", "REDIS_TIMEOUT_MS"] {
            let config =
                Config::from_lookup(lookup_from(&[("IEX_API_TOKEN", "pk_test"), (name, "0")]));
            match config.validate() {
                Err(DashboardError::ConfigError(msg)) => assert!(msg.contains(name)),
                other => panic!("expected config error for {}, got {:?}", name, other),
            }
        }
    }

    #[test]
    fn test_oversized_ttl_override_is_capped() {
        let config = Config::from_lookup(lookup_from(&[(
            "CACHE_TTL_SECS",
            "stats:18446744073709551615",
        )]));
        assert_eq!(config.cache_ttl_overrides[&Category::Stats], u64::MAX);
        let policy = crate::cache::TtlPolicy::with_overrides(&config.cache_ttl_overrides);
        assert_eq!(policy.ttl_for(Category::Stats), Some(crate::cache::MAX_TTL));
    }

    #[test]
    fn test_redis_host_and_port() {
        let config = Config::from_lookup(lookup_from(&[
            ("REDIS_HOST", "cache.internal"),
            ("REDIS_PORT", "6380"),
        ]));
        assert_eq!(config.redis_url, "redis://cache.internal:6380/");

        let config = Config::from_lookup(lookup_from(&[
            ("REDIS_URL", "redis://:secret@redis:6379/2"),
            ("REDIS_HOST", "ignored"),
        ]));
        assert_eq!(config.redis_url, "redis://:secret@redis:6379/2");
    }

    #[test]
    fn test_ttl_overrides_parsing() {
        let overrides = parse_ttl_overrides("stats:3600, news:600,bogus:5,logo:abc,,dividends:0");
        assert_eq!(overrides.len(), 3);
        assert_eq!(overrides[&Category::Stats], 3600);
        assert_eq!(overrides[&Category::News], 600);
        assert_eq!(overrides[&Category::Dividends], 0);
    }

    #[test]
    fn test_bad_numbers_fall_back_to_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("HTTP_TIMEOUT_MS", "soon"),
            ("LOG_LEVEL", "debug"),
        ]));
        assert_eq!(config.http_timeout_ms, 10_000);
        assert_eq!(config.log_level, log::LevelFilter::Debug);
    }

    #[test]
    fn test_debug_masks_token() {
        let rendered = format!("{:?}", Config::test_default());
        assert!(rendered.contains("pk_t***"));
        assert!(!rendered.contains("pk_test_token"));
    }
}
