//! Application state shared across all handlers.

use axum::http::{header, HeaderMap};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tz_core::AppConfig;
use tz_minifier::Minifier;
use tz_session::{Session, SessionCookie, SessionStore};
use tz_tokenizer::TokenizerAdapter;

use crate::cache::ResponseCache;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokenizer: Arc<TokenizerAdapter>,
    pub minifier: Arc<Minifier>,
    pub sessions: Arc<SessionStore>,
    pub session_cookie: Arc<SessionCookie>,
    pub cache: Arc<ResponseCache>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            tokenizer: Arc::new(TokenizerAdapter::new(&config.tokenizer)),
            minifier: Arc::new(Minifier::new(&config.minify)),
            sessions: Arc::new(SessionStore::new(config.session.ttl_secs)),
            session_cookie: Arc::new(SessionCookie::from(&config.session)),
            cache: Arc::new(ResponseCache::new(Duration::from_secs(config.cache.ttl_secs))),
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Replaces the tokenizer adapter, e.g. with an offline pretrained loader.
    pub fn with_tokenizer(mut self, tokenizer: TokenizerAdapter) -> Self {
        self.tokenizer = Arc::new(tokenizer);
        self
    }

    /// Live session named by the request's session cookie.
    pub fn session_from_headers(&self, headers: &HeaderMap) -> Option<Session> {
        self.session_id_from_headers(headers).and_then(|id| self.sessions.get(id))
    }

    /// Session id carried by the request's `Cookie` headers, live or not.
    pub fn session_id_from_headers<'a>(&self, headers: &'a HeaderMap) -> Option<&'a str> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(|cookies| self.session_cookie.find(cookies))
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}
