use dotenvy::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::duckduckgo::DEFAULT_BASE_URL;
use crate::search::DEFAULT_MAX_CONCURRENT_FETCHES;

pub static CONFIG: Lazy<Config> = Lazy::new(|| {
    dotenv().ok(); // Load .env file if present
    Config::from_env()
});

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub cache_ttl: Duration,
    pub max_concurrent_fetches: usize,
    pub http_timeout: Duration,
    pub search_base_url: String,
    pub static_dir: Option<String>,
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Config {
        Config {
            bind_addr: get_env_or_default("GLEANER_BIND_ADDR", "0.0.0.0:8080"),
            cache_ttl: Duration::from_secs(parse_env_or("GLEANER_CACHE_TTL_SECS", 24 * 60 * 60)),
            max_concurrent_fetches: parse_env_or(
                "GLEANER_MAX_CONCURRENT_FETCHES",
                DEFAULT_MAX_CONCURRENT_FETCHES,
            ),
            http_timeout: Duration::from_secs(parse_env_or("GLEANER_HTTP_TIMEOUT_SECS", 10)),
            search_base_url: get_env_or_default("GLEANER_SEARCH_BASE_URL", DEFAULT_BASE_URL),
            static_dir: env::var("GLEANER_STATIC_DIR").ok().filter(|d| !d.is_empty()),
            log_level: get_env_or_default("GLEANER_LOG_LEVEL", "info"),
        }
    }
}

fn get_env_or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("ignoring unparseable {key}={raw:?}");
            default
        }),
        Err(_) => default,
    }
}
