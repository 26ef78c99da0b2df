//! Short-lived response cache for idempotent GET routes.
//!
//! Attached with `route_layer` to the cacheable routes only. Only 2xx
//! responses are stored; the key is method, path and the query sorted by
//! parameter name.

use axum::{
    body::{to_bytes, Body, Bytes},
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::state::AppState;

pub const CACHE_STATUS_HEADER: &str = "x-cache";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Pairs are ordered by name; repeated names keep their request order.
    pub fn from_parts(method: &Method, path: &str, query: Option<&str>) -> Self {
        let mut pairs: Vec<&str> = query
            .unwrap_or_default()
            .split('&')
            .filter(|p| !p.is_empty())
            .collect();
        pairs.sort_by_key(|&pair| pair.split_once('=').map_or(pair, |(name, _)| name));
        if pairs.is_empty() {
            Self(format!("{method} {path}"))
        } else {
            Self(format!("{method} {path}?{}", pairs.join("&")))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

impl IntoResponse for CachedResponse {
    fn into_response(self) -> Response {
        let mut response = (self.status, self.body).into_response();
        match self.content_type {
            Some(ct) => {
                response.headers_mut().insert(header::CONTENT_TYPE, ct);
            }
            None => {
                response.headers_mut().remove(header::CONTENT_TYPE);
            }
        }
        response
    }
}

pub struct ResponseCache {
    entries: Mutex<HashMap<CacheKey, (Instant, CachedResponse)>>,
    ttl: Duration,
}

impl ResponseCache {
    /// A zero `ttl` disables caching.
    pub fn new(ttl: Duration) -> Self {
        Self { entries: Mutex::new(HashMap::new()), ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    pub fn get(&self, key: &CacheKey) -> Option<CachedResponse> {
        let mut entries = self.entries.lock();
        let (stored, cached) = entries.get(key)?;
        if stored.elapsed() < self.ttl {
            return Some(cached.clone());
        }
        entries.remove(key);
        None
    }

    pub fn insert(&self, key: CacheKey, response: CachedResponse) {
        if self.is_enabled() {
            self.entries.lock().insert(key, (Instant::now(), response));
        }
    }

    pub fn purge_expired(&self) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, (stored, _)| stored.elapsed() < self.ttl);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Serves GETs from the cache and stores successful responses.
pub async fn cache_responses(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if req.method() != Method::GET || !state.cache.is_enabled() {
        return next.run(req).await;
    }

    let key = CacheKey::from_parts(req.method(), req.uri().path(), req.uri().query());
    if let Some(hit) = state.cache.get(&key) {
        debug!(key = key.as_str(), "Cache hit");
        return tagged(hit.into_response(), "HIT");
    }

    let response = next.run(req).await;
    if !response.status().is_success() {
        return response;
    }

    let (parts, body) = response.into_parts();
    let body = match to_bytes(body, usize::MAX).await {
        Ok(body) => body,
        Err(err) => {
            warn!(key = key.as_str(), error = %err, "Failed to buffer response for caching");
            return ApiError::internal("Internal server error").into_response();
        }
    };
    state.cache.insert(
        key,
        CachedResponse {
            status: parts.status,
            content_type: parts.headers.get(header::CONTENT_TYPE).cloned(),
            body: body.clone(),
        },
    );
    tagged(Response::from_parts(parts, Body::from(body)), "MISS")
}

fn tagged(mut response: Response, status: &'static str) -> Response {
    response.headers_mut().insert(CACHE_STATUS_HEADER, HeaderValue::from_static(status));
    response
}
