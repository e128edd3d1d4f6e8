use std::collections::HashMap;
use std::env;
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::rate_limit::{AUTHENTICATED, PREMIUM, PolicyTable, RateLimitPolicy, UNAUTHENTICATED};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub redis_url: String,
    pub redis_timeout_ms: u64,
    pub session_ttl_secs: u64,
    pub jwt_secret: Option<String>,
    pub trusted_proxies: Vec<IpAddr>,
    pub context_path: String,
    pub gemini_api_key: String,
    pub embedding_model: String,
    pub hf_api_token: String,
    pub chat_model: String,
    pub rate_limits: PolicyTable,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        Ok(Config {
            server_host: var_or("SERVER_HOST", "0.0.0.0"),
            server_port: parse_or("SERVER_PORT", 8000),
            redis_url: var_or("REDIS_URL", "redis://redis:6379/0"),
            redis_timeout_ms: parse_positive_or("REDIS_TIMEOUT_MS", 500),
            session_ttl_secs: parse_positive_or("SESSION_TTL_SECS", 3600),
            jwt_secret: env::var("JWT_SECRET").ok().filter(|s| !s.is_empty()),
            trusted_proxies: ip_list("TRUSTED_PROXIES"),
            context_path: var_or("CONTEXT_PATH", "context.txt"),
            gemini_api_key: required("GEMINI_API_KEY")?,
            embedding_model: var_or("EMBEDDING_MODEL", "models/embedding-001"),
            hf_api_token: required("HUGGINGFACEHUB_API_TOKEN")?,
            chat_model: var_or("CHAT_MODEL", "mistralai/Mixtral-8x7B-Instruct-v0.1"),
            rate_limits: rate_limits_from_env(),
        })
    }

    pub fn redis_timeout(&self) -> Duration {
        Duration::from_millis(self.redis_timeout_ms)
    }
}

/// 内置三个等级，limit 与 window 都可以用环境变量覆盖
fn rate_limits_from_env() -> PolicyTable {
    let defaults = PolicyTable::default();

    let policies = [UNAUTHENTICATED, AUTHENTICATED, PREMIUM]
        .into_iter()
        .map(|tier| {
            let fallback = defaults.lookup(tier);
            let prefix = format!("RATE_LIMIT_{}", tier.to_uppercase());
            let limit = parse_positive_or(&format!("{}_REQUESTS", prefix), fallback.limit);
            let window_secs = parse_positive_or(&format!("{}_WINDOW", prefix), fallback.window_secs);
            let policy = RateLimitPolicy::new(limit, window_secs).unwrap_or(fallback);
            (tier.to_string(), policy)
        })
        .collect::<HashMap<_, _>>();

    PolicyTable::new(policies).unwrap_or(defaults)
}

/// 逗号分隔的 IP 列表，无法解析的项跳过
fn ip_list(key: &str) -> Vec<IpAddr> {
    let Ok(raw) = env::var(key) else {
        return Vec::new();
    };

    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .filter_map(|item| {
            item.parse()
                .inspect_err(|_| tracing::warn!("Ignoring invalid IP {:?} in {}", item, key))
                .ok()
        })
        .collect()
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::Missing(key))
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_or<T: FromStr + Copy + std::fmt::Display>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid {}={:?}, using {}", key, raw, default);
            default
        }),
        Err(_) => default,
    }
}

fn parse_positive_or<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display + PartialOrd + Default,
{
    let value = parse_or(key, default);
    if value > T::default() {
        value
    } else {
        tracing::warn!("{} must be positive, using {}", key, default);
        default
    }
}
