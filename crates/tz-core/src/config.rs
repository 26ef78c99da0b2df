use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{CoreError, Result};
use crate::types::DEFAULT_ENCODING;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub session: SessionConfig,
    pub csrf: CsrfConfig,
    pub cache: CacheConfig,
    pub tokenizer: TokenizerConfig,
    pub minify: MinifyConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Largest accepted request body in bytes.
    pub body_limit_bytes: usize,
    pub production: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub ttl_secs: u64,
    pub secure: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CsrfConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    pub default_encoding: String,
    /// Hub revision used when fetching pretrained tokenizers.
    pub hf_revision: String,
    pub hf_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MinifyConfig {
    /// ECMAScript target for TypeScript transpilation, e.g. `es2020`.
    pub target: String,
    pub drop_console: bool,
    pub mangle_top_level: bool,
    /// Drop invalid CSS rules with a warning instead of rejecting the stylesheet.
    pub css_error_recovery: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
    pub json: bool,
    /// Error-level events are also appended here when set.
    pub error_log: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3001,
            body_limit_bytes: 50 * 1024 * 1024,
            production: false,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self { allowed_origins: vec!["https://tokenizors.net".into()] }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "session".into(),
            ttl_secs: 24 * 60 * 60,
            secure: false,
        }
    }
}

impl Default for CsrfConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 60 }
    }
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            default_encoding: DEFAULT_ENCODING.into(),
            hf_revision: "main".into(),
            hf_token: None,
        }
    }
}

impl Default for MinifyConfig {
    fn default() -> Self {
        Self {
            target: "es2020".into(),
            drop_console: true,
            mangle_top_level: true,
            css_error_recovery: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".into(),
            json: false,
            error_log: Some(PathBuf::from("error.log")),
        }
    }
}

impl AppConfig {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values returned by `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(host) = lookup("HOST") {
            config.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            config.server.port = parse_number("PORT", &port)?;
        }
        if let Some(limit) = lookup("BODY_LIMIT_BYTES") {
            config.server.body_limit_bytes = parse_number("BODY_LIMIT_BYTES", &limit)?;
        }
        if let Some(env) = lookup("APP_ENV") {
            config.server.production = env.eq_ignore_ascii_case("production");
        }
        config.session.secure = config.server.production;

        if let Some(origins) = lookup("CORS_ALLOWED_ORIGINS") {
            config.cors.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect();
        }
        if let Some(dev) = lookup("CORS_DEV_FRONTEND_URL_AND_PORT").filter(|o| !o.is_empty()) {
            if !config.cors.allowed_origins.contains(&dev) {
                config.cors.allowed_origins.push(dev);
            }
        }

        if let Some(enabled) = lookup("CSRF_ENABLED") {
            config.csrf.enabled = parse_bool("CSRF_ENABLED", &enabled)?;
        }
        if let Some(ttl) = lookup("CACHE_TTL_SECS") {
            config.cache.ttl_secs = parse_number("CACHE_TTL_SECS", &ttl)?;
        }

        if let Some(token) = lookup("HF_TOKEN").filter(|t| !t.is_empty()) {
            config.tokenizer.hf_token = Some(token);
        }
        if let Some(revision) = lookup("HF_REVISION") {
            config.tokenizer.hf_revision = revision;
        }
        if let Some(target) = lookup("TS_TARGET") {
            config.minify.target = target;
        }
        if let Some(recovery) = lookup("CSS_ERROR_RECOVERY") {
            config.minify.css_error_recovery = parse_bool("CSS_ERROR_RECOVERY", &recovery)?;
        }

        if let Some(filter) = lookup("LOG_FILTER") {
            config.logging.filter = filter;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            config.logging.json = format.eq_ignore_ascii_case("json");
        }
        if let Some(path) = lookup("ERROR_LOG_PATH") {
            config.logging.error_log = if path.is_empty() { None } else { Some(PathBuf::from(path)) };
        }

        Ok(config)
    }

    /// Address the HTTP listener binds to.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.server.port = port;
        self
    }

    pub fn with_csrf(mut self, enabled: bool) -> Self {
        self.csrf.enabled = enabled;
        self
    }

    pub fn with_cache_ttl_secs(mut self, ttl_secs: u64) -> Self {
        self.cache.ttl_secs = ttl_secs;
        self
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| CoreError::InvalidConfig {
        key: key.into(),
        value: value.into(),
        reason: e.to_string(),
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(CoreError::InvalidConfig {
            key: key.into(),
            value: value.into(),
            reason: "expected a boolean".into(),
        }),
    }
}
