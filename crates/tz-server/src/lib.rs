//! Tokenizors HTTP API server (Axum).
//!
//! Token counting and code minification endpoints behind CSRF-protected
//! cookie sessions, with a short-lived cache for idempotent reads.

pub mod cache;
pub mod error;
pub mod extract;
pub mod logging;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;
use tz_core::{config::CorsConfig, AppConfig};

use state::AppState;

/// Build the application router for `config`.
pub fn app(config: AppConfig) -> Router {
    app_with_state(AppState::new(config))
}

/// Build the application router with a custom state.
pub fn app_with_state(state: AppState) -> Router {
    let routes = routes::api_routes(&state);
    with_layers(routes, state)
}

/// Wraps `routes` with the 404 fallback, CSRF guard, body limit, panic
/// handler, CORS and request tracing.
pub fn with_layers(routes: Router<AppState>, state: AppState) -> Router {
    let config = state.config.clone();
    routes
        .fallback(middleware::not_found)
        .layer(axum::middleware::from_fn_with_state(state.clone(), middleware::csrf_guard))
        .layer(DefaultBodyLimit::max(config.server.body_limit_bytes))
        .layer(CatchPanicLayer::custom(middleware::handle_panic))
        .layer(cors_layer(&config.cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-csrf-token"),
            HeaderName::from_static("csrf-token"),
            HeaderName::from_static("x-xsrf-token"),
            HeaderName::from_static("xsrf-token"),
        ])
}
