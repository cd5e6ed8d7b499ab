use std::env;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Which key-value store backs the cache and the rate limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Redis,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            _ => Err(()),
        }
    }
}

/// What the rate limiter does when the store cannot be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreFailurePolicy {
    /// Let the request through and log the failure.
    Open,
    /// Reject the request with 503.
    Closed,
}

impl FromStr for StoreFailurePolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "closed" => Ok(Self::Closed),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub redis_url: String,
    pub store_backend: StoreBackend,
    pub store_failure_policy: StoreFailurePolicy,
    pub rate_limit_window_secs: u64,
    pub rate_limit_requests: u64,
    pub cache_ttl_secs: u64,
    pub upstream_base_url: String,
    pub upstream_timeout_secs: u64,
    pub trust_proxy_headers: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_host: "0.0.0.0".into(),
            server_port: 3000,
            redis_url: "redis://127.0.0.1/".into(),
            store_backend: StoreBackend::Redis,
            store_failure_policy: StoreFailurePolicy::Closed,
            rate_limit_window_secs: 60,
            rate_limit_requests: 3,
            cache_ttl_secs: 5,
            upstream_base_url: "https://www.fishwatch.gov".into(),
            upstream_timeout_secs: 10,
            trust_proxy_headers: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let defaults = Self::default();
        // PORT wins over SERVER_PORT so the usual PaaS convention works.
        let server_port = match env::var("PORT").ok().or_else(|| env::var("SERVER_PORT").ok()) {
            Some(raw) => parse_value("PORT", &raw)?,
            None => defaults.server_port,
        };

        Ok(Config {
            server_host: env::var("SERVER_HOST").unwrap_or(defaults.server_host),
            server_port,
            redis_url: env::var("REDIS_URL").unwrap_or(defaults.redis_url),
            store_backend: var_or("STORE_BACKEND", defaults.store_backend)?,
            store_failure_policy: var_or("STORE_FAILURE_POLICY", defaults.store_failure_policy)?,
            rate_limit_window_secs: var_or("RATE_LIMIT_WINDOW", defaults.rate_limit_window_secs)?,
            rate_limit_requests: var_or("RATE_LIMIT_REQUESTS", defaults.rate_limit_requests)?,
            cache_ttl_secs: var_or("CACHE_TTL_SECS", defaults.cache_ttl_secs)?,
            upstream_base_url: env::var("UPSTREAM_BASE_URL").unwrap_or(defaults.upstream_base_url),
            upstream_timeout_secs: var_or("UPSTREAM_TIMEOUT_SECS", defaults.upstream_timeout_secs)?,
            trust_proxy_headers: var_or("TRUST_PROXY_HEADERS", defaults.trust_proxy_headers)?,
        })
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }
}

fn var_or<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(raw) => parse_value(var, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T: FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::Invalid {
        var,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_single_fish_rule() {
        let config = Config::default();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.rate_limit_window(), Duration::from_secs(60));
        assert_eq!(config.rate_limit_requests, 3);
        assert_eq!(config.cache_ttl(), Duration::from_secs(5));
        assert_eq!(config.store_failure_policy, StoreFailurePolicy::Closed);
    }

    #[test]
    fn parses_enums_case_insensitively() {
        assert_eq!("Memory".parse::<StoreBackend>(), Ok(StoreBackend::Memory));
        assert_eq!(" OPEN ".parse::<StoreFailurePolicy>(), Ok(StoreFailurePolicy::Open));
        assert!("sqlite".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn rejects_garbage_numbers() {
        let err = parse_value::<u64>("RATE_LIMIT_WINDOW", "sixty").unwrap_err();
        assert!(err.to_string().contains("RATE_LIMIT_WINDOW"));
        assert_eq!(parse_value::<u16>("PORT", " 8080 ").unwrap(), 8080);
    }
}
